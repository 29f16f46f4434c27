//! Rendering system and GPU interfaces

pub mod window;
pub mod context;
pub mod buffer;
pub mod pipeline;
pub mod renderer;
pub mod viewport;

pub use context::GpuContext;
pub use renderer::CityRenderer;
pub use viewport::{ResizeTarget, Viewport};
pub use window::WindowConfig;
