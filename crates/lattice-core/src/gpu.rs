//! wgpu plumbing shared by the web and native hosts.

use crate::error::RenderSurfaceError;
use crate::geometry::LatticeUniforms;
use crate::LATTICE_WGSL;

/// Adapter + device for a surface, or `Unavailable` when there is no GPU path.
pub async fn request_device(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), RenderSurfaceError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| RenderSurfaceError::Unavailable("no adapter".into()))?;
    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::Performance,
                label: Some("lattice_device"),
            },
            None,
        )
        .await
        .map_err(|e| RenderSurfaceError::Unavailable(format!("request_device: {e}")))?;
    Ok((adapter, device, queue))
}

/// Surface configuration preferring an sRGB format and a blending-capable alpha mode.
pub fn surface_config(
    surface: &wgpu::Surface<'_>,
    adapter: &wgpu::Adapter,
    width: u32,
    height: u32,
) -> Result<wgpu::SurfaceConfiguration, RenderSurfaceError> {
    let caps = surface.get_capabilities(adapter);
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| {
            matches!(
                f,
                wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
            )
        })
        .or_else(|| caps.formats.first().copied())
        .ok_or_else(|| RenderSurfaceError::Unavailable("surface reports no formats".into()))?;
    let alpha_mode = caps
        .alpha_modes
        .iter()
        .copied()
        .find(|m| *m == wgpu::CompositeAlphaMode::PreMultiplied)
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);
    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    })
}

/// Fullscreen lattice pass with its own uniform buffer.
pub struct LatticePipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl LatticePipeline {
    /// Build the pipeline inside a validation scope so shader errors surface
    /// as `ShaderCompile` instead of an uncaptured device error.
    pub async fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<Self, RenderSurfaceError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lattice_shader"),
            source: wgpu::ShaderSource::Wgsl(LATTICE_WGSL.into()),
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lattice_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lattice_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lattice_pipeline"),
            layout: Some(&pl),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_fullscreen"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lattice_uniforms"),
            size: std::mem::size_of::<LatticeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lattice_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        if let Some(err) = device.pop_error_scope().await {
            return Err(RenderSurfaceError::ShaderCompile(err.to_string()));
        }
        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
        })
    }

    /// Upload `uniforms` and record one fullscreen draw into `view`.
    pub fn encode(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        uniforms: &LatticeUniforms,
        load: wgpu::LoadOp<wgpu::Color>,
    ) {
        queue.write_buffer(&self.uniform_buffer, 0, uniforms.as_bytes());
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lattice_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}

/// What a host does when the next surface texture cannot be acquired.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameAcquire {
    /// Drop this frame and try again next tick.
    Skip,
    /// Configure the surface again, then skip this frame.
    Reconfigure,
    /// The surface cannot recover.
    Fatal(RenderSurfaceError),
}

pub fn classify_surface_error(err: wgpu::SurfaceError) -> FrameAcquire {
    match err {
        wgpu::SurfaceError::Timeout => FrameAcquire::Skip,
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => FrameAcquire::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => FrameAcquire::Fatal(RenderSurfaceError::ContextLost),
        other => FrameAcquire::Fatal(RenderSurfaceError::Draw(other.to_string())),
    }
}
