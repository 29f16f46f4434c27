//! Rendering backend seam.

use super::node::{LocalTransform, ObjectDesc, ObjectHandle};

/// The operations the city core needs from whatever draws it.
///
/// Handles are exclusively owned by the caller that created them; an object
/// stays alive until [`remove_object`](Self::remove_object) is called.
pub trait RenderBackend {
    /// Create an object and return its handle.
    fn create_object(&mut self, desc: ObjectDesc) -> ObjectHandle;

    /// Replace an object's transform. Unknown handles are ignored.
    fn set_transform(&mut self, handle: ObjectHandle, transform: LocalTransform);

    /// Release an object. Unknown handles are ignored.
    fn remove_object(&mut self, handle: ObjectHandle);

    /// Whether `handle` still refers to a live object.
    fn contains(&self, handle: ObjectHandle) -> bool;

    /// Ask for the current state to be presented.
    fn request_redraw(&mut self);
}
