use lattice_core::geometry::LatticeUniforms;
use lattice_core::gpu::{self, FrameAcquire, LatticePipeline};
use lattice_core::{DrawTarget, RenderSurfaceError};
use web_sys as web;

/// One canvas with its own WebGPU device. Devices are per layer so a lost
/// context only takes down that layer.
pub struct CanvasTarget {
    canvas: web::HtmlCanvasElement,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: LatticePipeline,
}

impl CanvasTarget {
    pub async fn new(canvas: web::HtmlCanvasElement) -> Result<Self, RenderSurfaceError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| RenderSurfaceError::Unavailable(e.to_string()))?;
        let (adapter, device, queue) = gpu::request_device(&instance, &surface).await?;
        let config = gpu::surface_config(&surface, &adapter, canvas.width(), canvas.height())?;
        surface.configure(&device, &config);
        let pipeline = LatticePipeline::new(&device, config.format).await?;
        log::info!(
            "[gpu] canvas {}x{} ready ({:?})",
            config.width,
            config.height,
            config.format
        );
        Ok(Self {
            canvas,
            surface,
            device,
            queue,
            config,
            pipeline,
        })
    }

    fn resize_if_needed(&mut self) {
        let width = self.canvas.width().max(1);
        let height = self.canvas.height().max(1);
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

impl DrawTarget for CanvasTarget {
    fn resolution(&self) -> [f32; 2] {
        [self.config.width as f32, self.config.height as f32]
    }

    fn draw(&mut self, uniforms: &LatticeUniforms) -> Result<(), RenderSurfaceError> {
        self.resize_if_needed();
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => match gpu::classify_surface_error(err) {
                FrameAcquire::Skip => return Ok(()),
                FrameAcquire::Reconfigure => {
                    log::debug!("[gpu] surface reconfigured");
                    self.surface.configure(&self.device, &self.config);
                    return Ok(());
                }
                FrameAcquire::Fatal(e) => return Err(e),
            },
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lattice_encoder"),
            });
        self.pipeline.encode(
            &self.queue,
            &mut encoder,
            &view,
            uniforms,
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
        );
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release(&mut self) {
        // hide rather than detach: the page owns the element
        let _ = self.canvas.style().set_property("visibility", "hidden");
    }
}
