//! # `renderer.rs` - Renderer Module
//!
//! The `Renderer` ties the GPU, the instanced cube [`Scene`] and the `egui` overlay together
//! into one frame:
//!
//! 1. the scene advances one tick (new angle, new instance data, new camera matrices),
//! 2. `egui` textures and buffers are updated,
//! 3. the scene records its draw into a render pass through [`WgpuFrame`],
//! 4. the overlay is drawn on top in the same pass,
//! 5. the frame is submitted and presented.
//!
//! ## Components
//!
//! - **`Renderer`**: owns the [`Gpu`], the depth texture, the `egui` renderer and the scene.
//! - **`WgpuFrame`**: the `wgpu` implementation of [`DrawSubmission`]. Clearing the targets
//!   begins the render pass, so the clear values are the pass's load operations.
//!
//! ## Example
//!
//! ```ignore
//! let mut renderer = Renderer::new(window, width, height, SampleConfig::default()).await?;
//! renderer.render_frame(screen_descriptor, paint_jobs, textures_delta, now, delta)?;
//! ```

use crate::backend::{DrawSubmission, PipelineFactory};
use crate::config::SampleConfig;
use crate::error::RenderError;
use crate::frame::SceneSettings;
use crate::gpu::Gpu;
use crate::scene::Scene;

/// Renders the instanced scene and the GUI overlay.
///
/// # Fields
///
/// - `gpu`: device, queue and surface.
/// - `depth_texture_view`: `Depth32Float` depth buffer, recreated on resize.
/// - `egui_renderer`: turns `egui` paint jobs into draw calls.
/// - `scene`: the instanced cube mobile.
pub struct Renderer {
    gpu: Gpu,
    depth_texture_view: wgpu::TextureView,
    egui_renderer: egui_wgpu::Renderer,
    scene: Scene<Gpu>,
}

impl Renderer {
    /// Initializes the GPU for `window`, the depth buffer, the `egui` renderer and the scene.
    ///
    /// # Errors
    /// Propagates device creation failures and scene resource creation failures.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        config: SampleConfig,
    ) -> Result<Self, RenderError> {
        let gpu = Gpu::new_async(window, width, height).await?;
        let depth_texture_view = gpu.create_depth_texture(width, height);
        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            Some(Gpu::DEPTH_FORMAT),
            1,
            false,
        );
        let scene = Scene::new(&gpu, &config)?;

        Ok(Self {
            gpu,
            depth_texture_view,
            egui_renderer,
            scene,
        })
    }

    /// Resizes the surface and recreates the depth texture.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.depth_texture_view = self.gpu.create_depth_texture(width, height);
    }

    pub fn settings_mut(&mut self) -> &mut SceneSettings {
        self.scene.settings_mut()
    }

    /// Re-uploads the instance data without advancing the animation.
    pub fn repopulate_instances(&mut self) -> Result<(), RenderError> {
        self.scene.populate_instances(&self.gpu)
    }

    /// Updates the scene and renders one frame, with the GUI drawn on top.
    ///
    /// `current_time` is the time since start-up, `delta_time` the time since the previous
    /// frame.
    ///
    /// A lost, outdated or timed-out surface skips the frame; running out of memory is fatal
    /// and returned as an error.
    pub fn render_frame(
        &mut self,
        screen_descriptor: egui_wgpu::ScreenDescriptor,
        paint_jobs: Vec<egui::epaint::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        current_time: crate::Duration,
        delta_time: crate::Duration,
    ) -> Result<(), RenderError> {
        self.scene.update(
            &self.gpu,
            current_time.as_secs_f64(),
            delta_time.as_secs_f64(),
        )?;

        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
        }

        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring the surface texture, skipping frame");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };

        let surface_texture_view =
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    label: wgpu::Label::default(),
                    aspect: wgpu::TextureAspect::default(),
                    format: Some(self.gpu.surface_format),
                    dimension: None,
                    base_mip_level: 0,
                    mip_level_count: None,
                    base_array_layer: 0,
                    array_layer_count: None,
                    usage: None,
                });

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let egui_command_buffers = self.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        encoder.insert_debug_marker("Render scene");

        let mut frame = WgpuFrame::new(
            &mut encoder,
            &surface_texture_view,
            &self.depth_texture_view,
        );
        self.scene.render(&self.gpu, &mut frame);
        let mut render_pass = frame.finish();
        self.egui_renderer
            .render(&mut render_pass, &paint_jobs, &screen_descriptor);
        drop(render_pass);

        self.gpu.queue.submit(
            egui_command_buffers
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        surface_texture.present();

        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
        Ok(())
    }
}

/// A render pass being recorded for one frame.
///
/// The pass is begun by [`DrawSubmission::clear_targets`], which turns the clear values into
/// the pass's load operations. Any other command issued first begins the pass without
/// clearing.
pub struct WgpuFrame<'a> {
    encoder: &'a mut wgpu::CommandEncoder,
    color_target: &'a wgpu::TextureView,
    depth_target: &'a wgpu::TextureView,
    pass: Option<wgpu::RenderPass<'static>>,
}

impl<'a> WgpuFrame<'a> {
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_target: &'a wgpu::TextureView,
        depth_target: &'a wgpu::TextureView,
    ) -> Self {
        Self {
            encoder,
            color_target,
            depth_target,
            pass: None,
        }
    }

    fn begin(
        &mut self,
        color_load: wgpu::LoadOp<wgpu::Color>,
        depth_load: wgpu::LoadOp<f32>,
    ) -> wgpu::RenderPass<'static> {
        self.encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.color_target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth_target,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime()
    }

    fn pass(&mut self) -> &mut wgpu::RenderPass<'static> {
        let pass = match self.pass.take() {
            Some(pass) => pass,
            None => self.begin(wgpu::LoadOp::Load, wgpu::LoadOp::Load),
        };
        self.pass.insert(pass)
    }

    /// Ends command recording through the frame and hands back the render pass so more
    /// content (the GUI) can be drawn into it.
    pub fn finish(mut self) -> wgpu::RenderPass<'static> {
        match self.pass.take() {
            Some(pass) => pass,
            None => self.begin(wgpu::LoadOp::Load, wgpu::LoadOp::Load),
        }
    }
}

impl DrawSubmission<Gpu> for WgpuFrame<'_> {
    fn clear_targets(&mut self, color: [f32; 4], depth: f32) {
        let [r, g, b, a] = color.map(f64::from);
        // The previous pass must end before the encoder can begin another.
        self.pass = None;
        let pass = self.begin(
            wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
            wgpu::LoadOp::Clear(depth),
        );
        self.pass = Some(pass);
    }

    fn set_vertex_buffers(&mut self, buffers: &[&wgpu::Buffer]) {
        let pass = self.pass();
        for (slot, buffer) in buffers.iter().enumerate() {
            pass.set_vertex_buffer(slot as u32, buffer.slice(..));
        }
    }

    fn set_index_buffer(&mut self, buffer: &wgpu::Buffer, format: wgpu::IndexFormat) {
        self.pass().set_index_buffer(buffer.slice(..), format);
    }

    fn set_pipeline_state(&mut self, pipeline: &<Gpu as PipelineFactory>::Pipeline) {
        self.pass().set_pipeline(pipeline);
    }

    fn commit_resources(&mut self, bindings: &wgpu::BindGroup) {
        self.pass().set_bind_group(0, bindings, &[]);
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.pass()
            .draw_indexed(0..index_count, 0, 0..instance_count);
    }
}
