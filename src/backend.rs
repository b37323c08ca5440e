//! # Graphics Backend Seam
//!
//! The instancing sample only needs a handful of things from a graphics API: allocate and
//! update buffers, build one pipeline state and bind its resources, answer projection queries
//! about the presentation surface, and record a draw. Those needs are captured by the four traits
//! of this module so that the scene logic ([`crate::Scene`], [`crate::FrameUpdater`],
//! [`crate::InstanceBuffer`]) never touches `wgpu` handles directly.
//!
//! [`crate::Gpu`] implements the device-side traits on top of `wgpu`, and [`crate::WgpuFrame`]
//! implements [`DrawSubmission`] on a render pass. Tests implement all four with recording fakes.
//!
//! Descriptor data that is plain data in `wgpu` (texture formats, vertex buffer layouts, index
//! formats) is reused as-is rather than mirrored.

use crate::error::RenderError;

/// What a buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferBinding {
    Vertex,
    Index,
    Uniform,
}

/// How often a buffer's contents change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once at creation, never updated.
    Static,
    /// GPU-local storage updated occasionally through copies.
    Default,
    /// Rewritten every frame. Each update targets fresh staging memory, so the CPU never waits
    /// for the GPU to finish reading the previous contents.
    Dynamic,
}

/// Parameters of a buffer allocation.
#[derive(Debug, Clone, Copy)]
pub struct BufferRequest<'a> {
    pub label: &'a str,
    pub binding: BufferBinding,
    pub usage: BufferUsage,
    pub size: u64,
    pub contents: Option<&'a [u8]>,
}

impl<'a> BufferRequest<'a> {
    /// A buffer initialised with `contents`; its size is the length of `contents`.
    pub fn with_contents(
        label: &'a str,
        binding: BufferBinding,
        usage: BufferUsage,
        contents: &'a [u8],
    ) -> Self {
        Self {
            label,
            binding,
            usage,
            size: contents.len() as u64,
            contents: Some(contents),
        }
    }

    /// An uninitialised buffer of `size` bytes.
    pub fn sized(label: &'a str, binding: BufferBinding, usage: BufferUsage, size: u64) -> Self {
        Self {
            label,
            binding,
            usage,
            size,
            contents: None,
        }
    }
}

/// Allocation and CPU-side updates of GPU buffers.
pub trait BufferAllocator {
    type Buffer;

    fn create_buffer(&self, request: &BufferRequest<'_>) -> Result<Self::Buffer, RenderError>;

    /// Replaces `bytes.len()` bytes of `buffer` starting at `offset`. The write becomes visible
    /// to the next submitted GPU work.
    fn update_buffer(&self, buffer: &Self::Buffer, offset: u64, bytes: &[u8]);
}

/// Everything needed to build the sample's pipeline state.
#[derive(Debug, Clone)]
pub struct PipelineRequest<'a> {
    pub label: &'a str,
    /// WGSL source containing both entry points.
    pub shader_source: &'a str,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    /// Input streams, in slot order.
    pub vertex_streams: &'a [wgpu::VertexBufferLayout<'a>],
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
}

/// A resource bound to one of the pipeline's named shader slots.
pub enum ShaderResource<'a, R: PipelineFactory + ?Sized> {
    UniformBuffer(&'a R::Buffer),
    Texture(&'a R::Texture),
}

/// Pipeline state creation and resource binding.
pub trait PipelineFactory: BufferAllocator {
    type Pipeline;
    type Texture;
    type Bindings;

    /// Format of the color target the pipeline renders into.
    fn color_format(&self) -> wgpu::TextureFormat;

    fn depth_format(&self) -> wgpu::TextureFormat;

    fn create_pipeline_state(
        &self,
        request: &PipelineRequest<'_>,
    ) -> Result<Self::Pipeline, RenderError>;

    /// Uploads an sRGB-encoded RGBA image as a sampled texture.
    fn create_texture(
        &self,
        label: &str,
        image: &image::RgbaImage,
    ) -> Result<Self::Texture, RenderError>;

    /// Associates each named shader slot with a resource. Every name must be known to the
    /// pipeline.
    fn create_resource_binding(
        &self,
        pipeline: &Self::Pipeline,
        resources: &[(&str, ShaderResource<'_, Self>)],
    ) -> Result<Self::Bindings, RenderError>;
}

/// Matrices compensating for the way the presentation surface is mounted.
pub trait ProjectionQueries {
    /// Correction for the physical rotation of the display. `camera_view_axis` is the axis
    /// the camera looks along in view space.
    fn surface_pretransform(&self, camera_view_axis: &nalgebra_glm::Vec3) -> nalgebra_glm::Mat4;

    /// Perspective projection for the current surface, taking its rotation and aspect ratio
    /// into account.
    fn adjusted_projection(&self, fov_y: f32, near: f32, far: f32) -> nalgebra_glm::Mat4;
}

/// Commands recorded for one frame.
pub trait DrawSubmission<R: PipelineFactory + ?Sized> {
    /// Clears the color target to `color` and the depth target to `depth`.
    fn clear_targets(&mut self, color: [f32; 4], depth: f32);

    /// Binds `buffers` to consecutive vertex input slots starting at slot 0.
    fn set_vertex_buffers(&mut self, buffers: &[&R::Buffer]);

    fn set_index_buffer(&mut self, buffer: &R::Buffer, format: wgpu::IndexFormat);

    fn set_pipeline_state(&mut self, pipeline: &R::Pipeline);

    fn commit_resources(&mut self, bindings: &R::Bindings);

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32);
}
