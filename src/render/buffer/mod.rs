//! GPU buffer management

pub mod frame_uniforms;
pub mod instance_buffer;

pub use frame_uniforms::{CameraUniform, FrameUniforms};
pub use instance_buffer::{InstanceBuffer, InstanceRaw};
