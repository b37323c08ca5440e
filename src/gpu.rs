//! # GPU Management Module
//!
//! The `gpu` module sets up and owns the `wgpu` objects the sample renders with: the surface,
//! the device and its queue, and the surface configuration.
//!
//! Besides the window-facing utilities (resizing, aspect ratio, depth texture creation), `Gpu`
//! is the `wgpu` implementation of the device-side traits of [`crate::backend`]:
//!
//! - [`BufferAllocator`]: buffers are created with `create_buffer`/`create_buffer_init` and
//!   updated through `Queue::write_buffer`. The queue stages every write in freshly allocated
//!   memory and copies it on the next submission, so a per-frame update never waits for the GPU
//!   to finish reading the previous contents.
//! - [`PipelineFactory`]: the render pipeline, textures and bind groups.
//! - [`ProjectionQueries`]: `wgpu` presents through the platform compositor, which already
//!   handles display rotation, so the pretransform is the identity and the projection only
//!   needs the surface's aspect ratio.
//!
//! ## Example Usage
//!
//! ```ignore
//! async fn create_gpu(window: std::sync::Arc<winit::window::Window>, width: u32, height: u32) {
//!     let gpu = Gpu::new_async(window, width, height).await?;
//!     log::info!("Surface format: {:?}", gpu.surface_format);
//! }
//! ```

// `DeviceExt` provides `create_buffer_init`, used for buffers created with initial contents.
use wgpu::util::DeviceExt;
use wgpu::InstanceDescriptor;

use crate::backend::{
    BufferAllocator, BufferBinding, BufferRequest, BufferUsage, PipelineFactory,
    PipelineRequest, ProjectionQueries, ShaderResource,
};
use crate::error::RenderError;
use crate::texture::WgpuTexture;
use crate::uniform_binding::{self, ResourceKind};

/// The GPU-related resources and configuration required for rendering.
///
/// # Fields
/// - `surface`: the presentation surface tied to the window or canvas.
/// - `device`: creates every GPU resource of the sample.
/// - `queue`: receives command buffers and staged buffer/texture writes.
/// - `surface_config`: current size, format and present mode of the surface.
/// - `surface_format`: the color format of the surface. A non-sRGB format is preferred because
///   `egui` expects one; the sample then converts its output to gamma space in the shader.
pub struct Gpu {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
}

impl Gpu {
    /// The texture format of the depth buffer.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Width divided by height of the surface. The height is clamped to 1 to avoid a division
    /// by zero while the window is minimized.
    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    /// Reconfigures the surface for a new size. Zero-sized requests are ignored since a surface
    /// cannot be configured with an empty extent.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Reapplies the current configuration, used after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Creates a `Depth32Float` depth texture matching the surface size.
    pub fn create_depth_texture(&self, width: u32, height: u32) -> wgpu::TextureView {
        let texture = self.device.create_texture(
            &(wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: Self::DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            }),
        );
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: None,
            format: Some(Self::DEPTH_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: 0,
            base_array_layer: 0,
            array_layer_count: None,
            mip_level_count: None,
            usage: None,
        })
    }

    /// Creates the instance, surface, adapter and device for `window`.
    ///
    /// # Errors
    /// Fails when the surface cannot be created, no adapter can present to it, or the device
    /// request is refused.
    pub async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        log::info!("WGPU Adapter: {:?}", adapter.get_info());
        log::debug!("WGPU Adapter Features: {:#?}", adapter.features());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    memory_hints: wgpu::MemoryHints::default(),
                    required_features: wgpu::Features::default(),
                    #[cfg(not(target_arch = "wasm32"))]
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    #[cfg(all(target_arch = "wasm32", feature = "webgpu"))]
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    #[cfg(all(target_arch = "wasm32", feature = "webgl"))]
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let surface_format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb()) // egui wants a non-srgb surface texture
            .unwrap_or(surface_capabilities.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: surface_capabilities.present_modes[0],
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);
        log::info!("Surface configured: {width}x{height}, {surface_format:?}");

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            surface_format,
        })
    }
}

impl BufferBinding {
    fn usages(self) -> wgpu::BufferUsages {
        match self {
            BufferBinding::Vertex => wgpu::BufferUsages::VERTEX,
            BufferBinding::Index => wgpu::BufferUsages::INDEX,
            BufferBinding::Uniform => wgpu::BufferUsages::UNIFORM,
        }
    }
}

impl BufferAllocator for Gpu {
    type Buffer = wgpu::Buffer;

    fn create_buffer(&self, request: &BufferRequest<'_>) -> Result<wgpu::Buffer, RenderError> {
        let max = self.device.limits().max_buffer_size;
        if request.size == 0 || request.size > max {
            return Err(RenderError::InvalidBufferSize {
                label: request.label.to_owned(),
                size: request.size,
                max,
            });
        }

        // Static buffers are only ever written at creation; everything else receives queue
        // writes and must be a copy destination.
        let usage = match request.usage {
            BufferUsage::Static => request.binding.usages(),
            BufferUsage::Default | BufferUsage::Dynamic => {
                request.binding.usages() | wgpu::BufferUsages::COPY_DST
            }
        };

        log::debug!(
            "Creating buffer '{}' ({} bytes, {:?}, {:?})",
            request.label,
            request.size,
            request.binding,
            request.usage
        );

        match (request.contents, request.usage) {
            (Some(contents), _) => Ok(self.device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some(request.label),
                    contents,
                    usage,
                },
            )),
            (None, BufferUsage::Static) => {
                Err(RenderError::MissingBufferContents(request.label.to_owned()))
            }
            (None, _) => Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(request.label),
                size: request.size,
                usage,
                mapped_at_creation: false,
            })),
        }
    }

    fn update_buffer(&self, buffer: &wgpu::Buffer, offset: u64, bytes: &[u8]) {
        self.queue.write_buffer(buffer, offset, bytes);
    }
}

impl PipelineFactory for Gpu {
    type Pipeline = wgpu::RenderPipeline;
    type Texture = WgpuTexture;
    type Bindings = wgpu::BindGroup;

    fn color_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    fn depth_format(&self) -> wgpu::TextureFormat {
        Self::DEPTH_FORMAT
    }

    fn create_pipeline_state(
        &self,
        request: &PipelineRequest<'_>,
    ) -> Result<wgpu::RenderPipeline, RenderError> {
        let shader_module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(request.label),
                source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(
                    request.shader_source,
                )),
            });

        // The layout is derived from the shader; bind groups are created against
        // `get_bind_group_layout(0)`.
        Ok(self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(request.label),
                layout: None,
                vertex: wgpu::VertexState {
                    module: &shader_module,
                    entry_point: Some(request.vertex_entry),
                    buffers: request.vertex_streams,
                    compilation_options: Default::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                    unclipped_depth: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: request.depth_format,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader_module,
                    entry_point: Some(request.fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: request.color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                multiview: None,
                cache: None,
            }))
    }

    fn create_texture(
        &self,
        label: &str,
        image: &image::RgbaImage,
    ) -> Result<WgpuTexture, RenderError> {
        Ok(WgpuTexture::from_image(
            &self.device,
            &self.queue,
            label,
            image,
        ))
    }

    fn create_resource_binding(
        &self,
        pipeline: &wgpu::RenderPipeline,
        resources: &[(&str, ShaderResource<'_, Self>)],
    ) -> Result<wgpu::BindGroup, RenderError> {
        let mut entries = Vec::with_capacity(resources.len() + 1);
        for (name, resource) in resources {
            match resource {
                ShaderResource::UniformBuffer(buffer) => {
                    let slot = uniform_binding::resolve(name, ResourceKind::UniformBuffer)?;
                    entries.push(wgpu::BindGroupEntry {
                        binding: slot.binding,
                        resource: buffer.as_entire_binding(),
                    });
                }
                ShaderResource::Texture(texture) => {
                    let slot = uniform_binding::resolve(name, ResourceKind::Texture)?;
                    entries.push(wgpu::BindGroupEntry {
                        binding: slot.binding,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    });
                    entries.push(wgpu::BindGroupEntry {
                        binding: slot.binding + 1,
                        resource: wgpu::BindingResource::Sampler(&texture.sampler),
                    });
                }
            }
        }

        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shader Resource Binding"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &entries,
        }))
    }
}

impl ProjectionQueries for Gpu {
    fn surface_pretransform(&self, _camera_view_axis: &nalgebra_glm::Vec3) -> nalgebra_glm::Mat4 {
        nalgebra_glm::Mat4::identity()
    }

    fn adjusted_projection(&self, fov_y: f32, near: f32, far: f32) -> nalgebra_glm::Mat4 {
        nalgebra_glm::perspective_lh_zo(self.aspect_ratio(), fov_y, near, far)
    }
}
