use lattice_core::geometry::LatticeUniforms;
use lattice_core::gpu::{self, FrameAcquire, LatticePipeline};
use lattice_core::{DrawTarget, RenderSurfaceError};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use winit::window::Window;

struct PendingFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
    cleared: bool,
}

/// All layers share one window surface. Each layer owns a pipeline (and so a
/// uniform buffer) and records its pass into the frame's single encoder,
/// back to front in registration order.
pub struct Compositor {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipelines: Vec<LatticePipeline>,
    pending: Option<PendingFrame>,
    clear_color: wgpu::Color,
}

impl Compositor {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let (adapter, device, queue) = gpu::request_device(&instance, &surface).await?;
        let config = gpu::surface_config(&surface, &adapter, size.width, size.height)?;
        surface.configure(&device, &config);
        log::info!(
            "[gpu] {} {}x{} {:?}",
            adapter.get_info().name,
            config.width,
            config.height,
            config.format
        );
        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipelines: Vec::new(),
            pending: None,
            clear_color: wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.04,
                a: 1.0,
            },
        })
    }

    /// Compile one more layer pipeline and return its slot.
    pub async fn add_layer(&mut self) -> Result<usize, RenderSurfaceError> {
        let pipeline = LatticePipeline::new(&self.device, self.config.format).await?;
        self.pipelines.push(pipeline);
        Ok(self.pipelines.len() - 1)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn resolution(&self) -> [f32; 2] {
        [self.config.width as f32, self.config.height as f32]
    }

    /// Acquire the next surface texture. Lost or outdated surfaces are
    /// reconfigured and the frame is skipped.
    pub fn begin_frame(&mut self) -> Result<bool, RenderSurfaceError> {
        let texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => match gpu::classify_surface_error(err) {
                FrameAcquire::Skip => return Ok(false),
                FrameAcquire::Reconfigure => {
                    self.surface.configure(&self.device, &self.config);
                    return Ok(false);
                }
                FrameAcquire::Fatal(e) => return Err(e),
            },
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lattice_composite"),
            });
        self.pending = Some(PendingFrame {
            texture,
            view,
            encoder,
            cleared: false,
        });
        Ok(true)
    }

    fn encode_layer(&mut self, slot: usize, uniforms: &LatticeUniforms) -> Result<(), RenderSurfaceError> {
        let pipeline = self
            .pipelines
            .get(slot)
            .ok_or_else(|| RenderSurfaceError::Draw(format!("no pipeline in slot {slot}")))?;
        let frame = self
            .pending
            .as_mut()
            .ok_or_else(|| RenderSurfaceError::Draw("no frame in flight".into()))?;
        let load = if frame.cleared {
            wgpu::LoadOp::Load
        } else {
            wgpu::LoadOp::Clear(self.clear_color)
        };
        pipeline.encode(&self.queue, &mut frame.encoder, &frame.view, uniforms, load);
        frame.cleared = true;
        Ok(())
    }

    /// Submit and present. A frame where no layer drew is still cleared.
    pub fn end_frame(&mut self) {
        let Some(mut frame) = self.pending.take() else {
            return;
        };
        if !frame.cleared {
            let _ = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lattice_clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(Some(frame.encoder.finish()));
        frame.texture.present();
    }
}

/// A layer's view of the shared compositor.
pub struct LayerTarget {
    compositor: Rc<RefCell<Compositor>>,
    slot: usize,
}

impl LayerTarget {
    pub fn new(compositor: Rc<RefCell<Compositor>>, slot: usize) -> Self {
        Self { compositor, slot }
    }
}

impl DrawTarget for LayerTarget {
    fn resolution(&self) -> [f32; 2] {
        self.compositor.borrow().resolution()
    }

    fn draw(&mut self, uniforms: &LatticeUniforms) -> Result<(), RenderSurfaceError> {
        self.compositor.borrow_mut().encode_layer(self.slot, uniforms)
    }
}
