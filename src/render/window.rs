//! Window settings

use winit::{dpi::PhysicalSize, window::WindowAttributes};

/// Window configuration
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Falling City".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

impl WindowConfig {
    /// Attributes for `ActiveEventLoop::create_window`
    pub fn attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.width, self.height))
    }

    /// Initial aspect ratio
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
