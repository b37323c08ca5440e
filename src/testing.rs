//! Recording fakes of the graphics backend traits, used by the unit tests.

use std::cell::RefCell;

use crate::backend::{
    BufferAllocator, BufferBinding, BufferRequest, BufferUsage, DrawSubmission, PipelineFactory,
    PipelineRequest, ProjectionQueries, ShaderResource,
};
use crate::error::RenderError;
use crate::uniform_binding::{self, ResourceKind};

#[derive(Debug, Clone, PartialEq)]
pub struct FakeBuffer {
    pub label: String,
    pub binding: BufferBinding,
    pub usage: BufferUsage,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Upload {
    pub buffer: usize,
    pub offset: u64,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakePipeline {
    pub label: String,
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub step_modes: Vec<wgpu::VertexStepMode>,
    pub color_format: wgpu::TextureFormat,
}

/// Device fake that keeps every buffer in memory and records every upload.
pub struct RecordingDevice {
    pub color_format: wgpu::TextureFormat,
    pub aspect_ratio: f32,
    pub pretransform: nalgebra_glm::Mat4,
    buffers: RefCell<Vec<FakeBuffer>>,
    uploads: RefCell<Vec<Upload>>,
    pipelines: RefCell<Vec<FakePipeline>>,
    textures: RefCell<Vec<(String, u32, u32)>>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self {
            color_format: wgpu::TextureFormat::Bgra8Unorm,
            aspect_ratio: 16.0 / 9.0,
            pretransform: nalgebra_glm::Mat4::identity(),
            buffers: RefCell::default(),
            uploads: RefCell::default(),
            pipelines: RefCell::default(),
            textures: RefCell::default(),
        }
    }
}

impl RecordingDevice {
    pub fn with_color_format(color_format: wgpu::TextureFormat) -> Self {
        Self {
            color_format,
            ..Self::default()
        }
    }

    pub fn buffer(&self, id: usize) -> FakeBuffer {
        self.buffers.borrow()[id].clone()
    }

    pub fn buffer_labelled(&self, label: &str) -> Option<usize> {
        self.buffers.borrow().iter().position(|b| b.label == label)
    }

    pub fn pipeline(&self, id: usize) -> FakePipeline {
        self.pipelines.borrow()[id].clone()
    }

    pub fn texture(&self, id: usize) -> (String, u32, u32) {
        self.textures.borrow()[id].clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.borrow().len()
    }

    pub fn last_upload(&self) -> Option<Upload> {
        self.uploads.borrow().last().copied()
    }

    pub fn uploads_to(&self, buffer: usize) -> Vec<Upload> {
        self.uploads
            .borrow()
            .iter()
            .filter(|upload| upload.buffer == buffer)
            .copied()
            .collect()
    }
}

impl BufferAllocator for RecordingDevice {
    type Buffer = usize;

    fn create_buffer(&self, request: &BufferRequest<'_>) -> Result<usize, RenderError> {
        if request.size == 0 {
            return Err(RenderError::InvalidBufferSize {
                label: request.label.to_owned(),
                size: 0,
                max: u64::MAX,
            });
        }
        let bytes = match (request.contents, request.usage) {
            (Some(contents), _) => contents.to_vec(),
            (None, BufferUsage::Static) => {
                return Err(RenderError::MissingBufferContents(request.label.to_owned()))
            }
            (None, _) => vec![0; request.size as usize],
        };
        let mut buffers = self.buffers.borrow_mut();
        buffers.push(FakeBuffer {
            label: request.label.to_owned(),
            binding: request.binding,
            usage: request.usage,
            bytes,
        });
        Ok(buffers.len() - 1)
    }

    fn update_buffer(&self, buffer: &usize, offset: u64, bytes: &[u8]) {
        let start = offset as usize;
        let mut buffers = self.buffers.borrow_mut();
        let target = &mut buffers[*buffer];
        assert!(
            start + bytes.len() <= target.bytes.len(),
            "write past the end of '{}'",
            target.label
        );
        target.bytes[start..start + bytes.len()].copy_from_slice(bytes);
        self.uploads.borrow_mut().push(Upload {
            buffer: *buffer,
            offset,
            len: bytes.len(),
        });
    }
}

impl PipelineFactory for RecordingDevice {
    type Pipeline = usize;
    type Texture = usize;
    type Bindings = Vec<String>;

    fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    fn depth_format(&self) -> wgpu::TextureFormat {
        wgpu::TextureFormat::Depth32Float
    }

    fn create_pipeline_state(&self, request: &PipelineRequest<'_>) -> Result<usize, RenderError> {
        let mut pipelines = self.pipelines.borrow_mut();
        pipelines.push(FakePipeline {
            label: request.label.to_owned(),
            vertex_entry: request.vertex_entry.to_owned(),
            fragment_entry: request.fragment_entry.to_owned(),
            step_modes: request.vertex_streams.iter().map(|s| s.step_mode).collect(),
            color_format: request.color_format,
        });
        Ok(pipelines.len() - 1)
    }

    fn create_texture(&self, label: &str, image: &image::RgbaImage) -> Result<usize, RenderError> {
        let mut textures = self.textures.borrow_mut();
        textures.push((label.to_owned(), image.width(), image.height()));
        Ok(textures.len() - 1)
    }

    fn create_resource_binding(
        &self,
        _pipeline: &usize,
        resources: &[(&str, ShaderResource<'_, Self>)],
    ) -> Result<Vec<String>, RenderError> {
        resources
            .iter()
            .map(|(name, resource)| {
                let kind = match resource {
                    ShaderResource::UniformBuffer(_) => ResourceKind::UniformBuffer,
                    ShaderResource::Texture(_) => ResourceKind::Texture,
                };
                uniform_binding::resolve(name, kind).map(|slot| slot.name.to_owned())
            })
            .collect()
    }
}

impl ProjectionQueries for RecordingDevice {
    fn surface_pretransform(&self, _camera_view_axis: &nalgebra_glm::Vec3) -> nalgebra_glm::Mat4 {
        self.pretransform
    }

    fn adjusted_projection(&self, fov_y: f32, near: f32, far: f32) -> nalgebra_glm::Mat4 {
        nalgebra_glm::perspective_lh_zo(self.aspect_ratio, fov_y, near, far)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear { color: [f32; 4], depth: f32 },
    SetVertexBuffers(Vec<usize>),
    SetIndexBuffer(usize, wgpu::IndexFormat),
    SetPipeline(usize),
    CommitResources(Vec<String>),
    DrawIndexed { index_count: u32, instance_count: u32 },
}

/// Draw context fake that records the submitted commands in order.
#[derive(Debug, Default)]
pub struct RecordingFrame {
    pub commands: Vec<Command>,
}

impl DrawSubmission<RecordingDevice> for RecordingFrame {
    fn clear_targets(&mut self, color: [f32; 4], depth: f32) {
        self.commands.push(Command::Clear { color, depth });
    }

    fn set_vertex_buffers(&mut self, buffers: &[&usize]) {
        self.commands
            .push(Command::SetVertexBuffers(buffers.iter().map(|b| **b).collect()));
    }

    fn set_index_buffer(&mut self, buffer: &usize, format: wgpu::IndexFormat) {
        self.commands.push(Command::SetIndexBuffer(*buffer, format));
    }

    fn set_pipeline_state(&mut self, pipeline: &usize) {
        self.commands.push(Command::SetPipeline(*pipeline));
    }

    fn commit_resources(&mut self, bindings: &Vec<String>) {
        self.commands.push(Command::CommitResources(bindings.clone()));
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.commands.push(Command::DrawIndexed {
            index_count,
            instance_count,
        });
    }
}
