//! Viewport tracking: keeps the camera aspect and the render targets in
//! step with the window size.

use crate::core::camera::Camera;

/// Something that owns size-dependent GPU resources
pub trait ResizeTarget {
    fn resize(&mut self, width: u32, height: u32);
}

/// Current drawable size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Apply a window resize. Zero-sized resizes (minimized window) are
    /// ignored; returns whether anything changed.
    ///
    /// Only the camera aspect and the target's surface change. Camera
    /// position, travel state and the world are left alone.
    pub fn resize(
        &mut self,
        camera: &mut Camera,
        target: Option<&mut dyn ResizeTarget>,
        width: u32,
        height: u32,
    ) -> bool {
        if width == 0 || height == 0 {
            return false;
        }

        self.width = width;
        self.height = height;
        camera.set_aspect(width as f32, height as f32);
        if let Some(target) = target {
            target.resize(width, height);
        }
        log::info!("Viewport resized to {}x{}", width, height);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[derive(Default)]
    struct RecordingTarget {
        sizes: Vec<(u32, u32)>,
    }

    impl ResizeTarget for RecordingTarget {
        fn resize(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }
    }

    #[test]
    fn test_resize_updates_aspect_and_target() {
        let mut viewport = Viewport::new(1280, 720);
        let mut camera = Camera::default();
        camera.position = Vec3::new(0.0, 8.0, -40.0);
        let mut target = RecordingTarget::default();

        assert!(viewport.resize(&mut camera, Some(&mut target), 800, 800));

        assert_eq!(viewport.size(), (800, 800));
        assert!((camera.aspect - 1.0).abs() < 1e-6);
        assert_eq!(target.sizes, vec![(800, 800)]);
        // Nothing else moves
        assert_eq!(camera.position, Vec3::new(0.0, 8.0, -40.0));
    }

    #[test]
    fn test_zero_size_ignored() {
        let mut viewport = Viewport::new(1280, 720);
        let mut camera = Camera::default();
        let aspect = camera.aspect;
        let mut target = RecordingTarget::default();

        assert!(!viewport.resize(&mut camera, Some(&mut target), 0, 720));
        assert!(!viewport.resize(&mut camera, Some(&mut target), 1280, 0));

        assert_eq!(viewport.size(), (1280, 720));
        assert_eq!(camera.aspect, aspect);
        assert!(target.sizes.is_empty());
    }

    #[test]
    fn test_resize_without_gpu() {
        let mut viewport = Viewport::new(1, 1);
        let mut camera = Camera::default();
        assert!(viewport.resize(&mut camera, None, 1920, 1080));
        assert!((viewport.aspect() - 16.0 / 9.0).abs() < 1e-6);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
