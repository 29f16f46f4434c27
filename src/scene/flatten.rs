//! Flattened scene graph output for GPU upload.
//!
//! `FlatInstance` is the result of walking the scene graph: one entry per
//! visible mesh, ready to be packed into the instance buffer.

use glam::{Mat4, Quat};

use super::node::Layer;

/// One entry in the flattened visible set.
#[derive(Clone, Copy, Debug)]
pub struct FlatInstance {
    /// Unit cube to world.
    pub model: Mat4,
    /// World rotation, used to orient normals.
    pub rotation: Quat,
    /// Linear RGB surface color.
    pub color: [f32; 3],
    /// Which layer this entry belongs to.
    pub layer: Layer,
}
