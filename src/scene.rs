//! # Scene
//!
//! The `scene` module owns every resource of the instanced cube mobile and drives it through a
//! frame:
//!
//! - the pipeline state, with a per-vertex stream (cube geometry) and a per-instance stream
//!   (world transforms),
//! - the static cube vertex and index buffers,
//! - the dynamic `Constants` uniform buffer and the cube texture, bound by name,
//! - the [`InstanceBuffer`] and the [`FrameUpdater`] that refills it on every tick.
//!
//! `Scene` is generic over the graphics backend so the same code runs on `wgpu`
//! ([`crate::Gpu`]) and on the recording fakes used by the tests.
//!
//! ## Example Usage
//! ```ignore
//! let mut scene = Scene::new(&gpu, &SampleConfig::default())?;
//!
//! // Once per frame:
//! scene.update(&gpu, current_time, elapsed_time)?;
//! scene.render(&gpu, &mut frame);
//! ```

use crate::backend::{
    BufferAllocator, BufferBinding, BufferRequest, BufferUsage, DrawSubmission, PipelineFactory,
    PipelineRequest, ProjectionQueries, ShaderResource,
};
use crate::config::SampleConfig;
use crate::error::RenderError;
use crate::frame::{FrameState, FrameUpdater, SceneSettings};
use crate::instance::{InstanceBuffer, InstanceRaw};
use crate::texture;
use crate::uniform_binding;
use crate::uniform_buffer::UniformBuffer;
use crate::vertex::{Vertex, VERTICES};
use crate::{INDICES, SHADER_SOURCE};

/// The instanced cube mobile and everything needed to draw it.
pub struct Scene<R: PipelineFactory + ?Sized> {
    pipeline: R::Pipeline,
    bindings: R::Bindings,
    // Kept alive for as long as the bindings reference it.
    #[allow(unused)]
    texture: R::Texture,
    vertex_buffer: R::Buffer,
    index_buffer: R::Buffer,
    constants: R::Buffer,
    instances: InstanceBuffer<R::Buffer>,
    updater: FrameUpdater,
    clear_color: [f32; 4],
    convert_output_to_gamma: bool,
}

impl<R: PipelineFactory + ProjectionQueries + ?Sized> Scene<R> {
    /// Creates the pipeline state and every buffer, loads the cube texture and uploads the
    /// mobile at its initial angle.
    pub fn new(device: &R, config: &SampleConfig) -> Result<Self, RenderError> {
        let color_format = device.color_format();
        // Non-sRGB targets store what the shader writes verbatim, so the shader has to encode
        // gamma itself.
        let convert_output_to_gamma = !color_format.is_srgb();

        let vertex_attributes = Vertex::vertex_attributes();
        let vertex_streams = [
            Vertex::description(&vertex_attributes),
            InstanceRaw::layout(),
        ];
        let pipeline = device.create_pipeline_state(&PipelineRequest {
            label: "Cube Instancing PSO",
            shader_source: SHADER_SOURCE,
            vertex_entry: "vertex_main",
            fragment_entry: if convert_output_to_gamma {
                "fragment_main_gamma"
            } else {
                "fragment_main"
            },
            vertex_streams: &vertex_streams,
            color_format,
            depth_format: device.depth_format(),
        })?;

        let constants = device.create_buffer(&BufferRequest::with_contents(
            "VS Constants",
            BufferBinding::Uniform,
            BufferUsage::Dynamic,
            bytemuck::bytes_of(&UniformBuffer::default()),
        ))?;
        let vertex_buffer = device.create_buffer(&BufferRequest::with_contents(
            "Cube Vertex Buffer",
            BufferBinding::Vertex,
            BufferUsage::Static,
            bytemuck::cast_slice(&VERTICES),
        ))?;
        let index_buffer = device.create_buffer(&BufferRequest::with_contents(
            "Cube Index Buffer",
            BufferBinding::Index,
            BufferUsage::Static,
            bytemuck::cast_slice(&INDICES),
        ))?;

        let image = texture::load_cube_image(config.texture_path.as_deref())?;
        let texture = device.create_texture("Cube Texture", &image)?;
        let bindings = device.create_resource_binding(
            &pipeline,
            &[
                (
                    uniform_binding::CONSTANTS,
                    ShaderResource::UniformBuffer(&constants),
                ),
                (uniform_binding::TEXTURE, ShaderResource::Texture(&texture)),
            ],
        )?;

        let mut instances = InstanceBuffer::new(device, config.max_instances()?)?;
        let mut updater = FrameUpdater::new(config);
        updater.populate(device, &mut instances)?;
        log::info!(
            "Scene ready: {} instances, capacity {}, gamma conversion {}",
            instances.len(),
            instances.capacity(),
            convert_output_to_gamma
        );

        Ok(Self {
            pipeline,
            bindings,
            texture,
            vertex_buffer,
            index_buffer,
            constants,
            instances,
            updater,
            clear_color: config.clear_color,
            convert_output_to_gamma,
        })
    }

    /// Advances the animation by one tick. Times are in seconds.
    pub fn update(
        &mut self,
        device: &R,
        current_time: f64,
        elapsed_time: f64,
    ) -> Result<(), RenderError> {
        self.updater
            .tick(device, &mut self.instances, current_time, elapsed_time)
    }

    /// Re-uploads the instance array at the current angle, e.g. after the grid size changed.
    pub fn populate_instances(&mut self, device: &R) -> Result<(), RenderError> {
        self.updater.populate(device, &mut self.instances)
    }

    /// Records the frame: clear, constants upload, stream bindings and one indexed instanced
    /// draw.
    pub fn render<C>(&self, device: &R, ctx: &mut C)
    where
        C: DrawSubmission<R> + ?Sized,
    {
        let clear_color = if self.convert_output_to_gamma {
            linear_to_srgb(self.clear_color)
        } else {
            self.clear_color
        };
        ctx.clear_targets(clear_color, 1.0);

        let state = self.updater.state();
        device.update_buffer(
            &self.constants,
            0,
            bytemuck::bytes_of(&UniformBuffer {
                view_proj: state.view_proj,
                rotation: state.rotation,
            }),
        );

        ctx.set_vertex_buffers(&[&self.vertex_buffer, self.instances.buffer()]);
        ctx.set_index_buffer(&self.index_buffer, wgpu::IndexFormat::Uint32);
        ctx.set_pipeline_state(&self.pipeline);
        ctx.commit_resources(&self.bindings);
        ctx.draw_indexed(INDICES.len() as u32, self.instances.len() as u32);
    }
}

impl<R: PipelineFactory + ?Sized> Scene<R> {
    pub fn state(&self) -> &FrameState {
        self.updater.state()
    }

    pub fn settings_mut(&mut self) -> &mut SceneSettings {
        self.updater.settings_mut()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instance_capacity(&self) -> usize {
        self.instances.capacity()
    }
}

/// Encodes a linear RGBA color with the sRGB transfer function. Alpha stays linear.
pub fn linear_to_srgb(color: [f32; 4]) -> [f32; 4] {
    let encode = |c: f32| {
        if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    };
    [encode(color[0]), encode(color[1]), encode(color[2]), color[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraMode;
    use crate::testing::{Command, RecordingDevice, RecordingFrame};
    use approx::assert_relative_eq;

    fn constants_of(device: &RecordingDevice) -> UniformBuffer {
        let id = device.buffer_labelled("VS Constants").unwrap();
        bytemuck::pod_read_unaligned(&device.buffer(id).bytes)
    }

    #[test]
    fn pipeline_declares_vertex_and_instance_streams() {
        let device = RecordingDevice::default();
        Scene::new(&device, &SampleConfig::default()).unwrap();
        let pipeline = device.pipeline(0);
        assert_eq!(
            pipeline.step_modes,
            [wgpu::VertexStepMode::Vertex, wgpu::VertexStepMode::Instance]
        );
        assert_eq!(pipeline.vertex_entry, "vertex_main");
    }

    #[test]
    fn gamma_conversion_follows_color_format() {
        let linear_target = RecordingDevice::with_color_format(wgpu::TextureFormat::Bgra8Unorm);
        Scene::new(&linear_target, &SampleConfig::default()).unwrap();
        assert_eq!(linear_target.pipeline(0).fragment_entry, "fragment_main_gamma");

        let srgb_target = RecordingDevice::with_color_format(wgpu::TextureFormat::Bgra8UnormSrgb);
        Scene::new(&srgb_target, &SampleConfig::default()).unwrap();
        assert_eq!(srgb_target.pipeline(0).fragment_entry, "fragment_main");
    }

    #[test]
    fn creation_uploads_initial_layout_and_texture() {
        let device = RecordingDevice::default();
        let config = SampleConfig::default();
        let scene = Scene::new(&device, &config).unwrap();
        assert_eq!(scene.instance_count(), crate::layout::MOBILE.len());
        assert_eq!(scene.instance_capacity(), config.max_instances().unwrap());
        assert_eq!(scene.state().angle, config.initial_angle);
        assert_eq!(device.texture(0), ("Cube Texture".to_owned(), 256, 256));

        let vertices = device.buffer(device.buffer_labelled("Cube Vertex Buffer").unwrap());
        assert_eq!(vertices.usage, BufferUsage::Static);
        assert_eq!(vertices.bytes.len(), VERTICES.len() * std::mem::size_of::<Vertex>());
    }

    #[test]
    fn render_records_one_instanced_draw() {
        let device = RecordingDevice::default();
        let mut scene = Scene::new(&device, &SampleConfig::default()).unwrap();
        scene.update(&device, 0.0, 0.016).unwrap();

        let mut frame = RecordingFrame::default();
        scene.render(&device, &mut frame);

        let vertex = device.buffer_labelled("Cube Vertex Buffer").unwrap();
        let index = device.buffer_labelled("Cube Index Buffer").unwrap();
        let instance = device.buffer_labelled("Instance Data Buffer").unwrap();
        assert_eq!(
            frame.commands[1..],
            [
                Command::SetVertexBuffers(vec![vertex, instance]),
                Command::SetIndexBuffer(index, wgpu::IndexFormat::Uint32),
                Command::SetPipeline(0),
                Command::CommitResources(vec!["Constants".to_owned(), "g_Texture".to_owned()]),
                Command::DrawIndexed {
                    index_count: 36,
                    instance_count: 20
                },
            ]
        );
    }

    #[test]
    fn clear_color_is_encoded_for_linear_targets() {
        let device = RecordingDevice::with_color_format(wgpu::TextureFormat::Rgba8Unorm);
        let scene = Scene::new(&device, &SampleConfig::default()).unwrap();
        let mut frame = RecordingFrame::default();
        scene.render(&device, &mut frame);
        let Command::Clear { color, depth } = frame.commands[0].clone() else {
            panic!("frame must start with a clear, got {:?}", frame.commands[0]);
        };
        assert_relative_eq!(color[0], 0.626_21, epsilon = 1e-4);
        assert_eq!(color[3], 1.0);
        assert_eq!(depth, 1.0);
    }

    #[test]
    fn clear_color_is_passed_through_for_srgb_targets() {
        let device = RecordingDevice::with_color_format(wgpu::TextureFormat::Rgba8UnormSrgb);
        let scene = Scene::new(&device, &SampleConfig::default()).unwrap();
        let mut frame = RecordingFrame::default();
        scene.render(&device, &mut frame);
        assert_eq!(
            frame.commands[0],
            Command::Clear {
                color: [0.35, 0.35, 0.35, 1.0],
                depth: 1.0
            }
        );
    }

    #[test]
    fn render_uploads_current_matrices() {
        let device = RecordingDevice::default();
        let mut scene = Scene::new(&device, &SampleConfig::default()).unwrap();
        scene.settings_mut().camera_mode = CameraMode::Side;
        scene.update(&device, 3.0, 0.016).unwrap();
        scene.render(&device, &mut RecordingFrame::default());

        let constants = constants_of(&device);
        assert_eq!(constants.view_proj, scene.state().view_proj);
        assert_eq!(constants.rotation, nalgebra_glm::Mat4::identity());
    }

    #[test]
    fn every_render_rewrites_the_constants() {
        let device = RecordingDevice::default();
        let scene = Scene::new(&device, &SampleConfig::default()).unwrap();
        let constants = device.buffer_labelled("VS Constants").unwrap();
        for _ in 0..3 {
            scene.render(&device, &mut RecordingFrame::default());
        }
        assert_eq!(device.uploads_to(constants).len(), 3);
    }

    #[test]
    fn linear_to_srgb_handles_both_segments() {
        let encoded = linear_to_srgb([0.002, 0.35, 1.0, 0.5]);
        assert_relative_eq!(encoded[0], 0.002 * 12.92);
        assert_relative_eq!(encoded[1], 0.626_21, epsilon = 1e-4);
        assert_relative_eq!(encoded[2], 1.0, epsilon = 1e-6);
        assert_eq!(encoded[3], 0.5);
    }
}
