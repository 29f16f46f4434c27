//! Frame rendering: scene graph in, presented surface out.

use std::sync::Arc;
use winit::window::Window;

use crate::atmosphere::AtmosphereSystem;
use crate::core::camera::Camera;
use crate::core::error::Error;
use crate::render::buffer::{FrameUniforms, InstanceBuffer};
use crate::render::context::GpuContext;
use crate::render::pipeline::CityPipeline;
use crate::render::viewport::ResizeTarget;
use crate::scene::SceneGraph;

/// Owns the GPU context and everything needed to draw the city
pub struct CityRenderer {
    gpu: GpuContext,
    uniforms: FrameUniforms,
    instances: InstanceBuffer,
    pipeline: CityPipeline,
}

impl CityRenderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, Error> {
        let gpu = GpuContext::new(window).await?;
        let (width, height) = gpu.size();

        let uniforms = FrameUniforms::new(&gpu.device);
        let instances = InstanceBuffer::new(&gpu.device);
        let pipeline = CityPipeline::new(&gpu.device, gpu.format(), &uniforms, width, height);

        log::info!("Renderer ready: {}x{} {:?}", width, height, gpu.format());

        Ok(Self {
            gpu,
            uniforms,
            instances,
            pipeline,
        })
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Flatten the scene, upload it and draw one frame.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render(
        &mut self,
        scene: &mut SceneGraph,
        camera: &Camera,
        atmosphere: &AtmosphereSystem,
    ) -> Result<(), Error> {
        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = self.gpu.size();
                self.gpu.resize(width, height);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(Error::Gpu(e.to_string())),
        };

        let flat = scene.flatten();
        self.instances.upload(&self.gpu.device, &self.gpu.queue, &flat);
        self.uniforms.update(&self.gpu.queue, camera, &atmosphere.uniform());

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("city_frame"),
        });

        self.pipeline.render(
            &mut encoder,
            &view,
            &self.uniforms,
            &self.instances,
            atmosphere.clear_color(),
        );

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl ResizeTarget for CityRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.pipeline.resize(&self.gpu.device, width, height);
    }
}
