//! # Instanced Cube Mobile
//!
//! This library renders many copies of one textured cube in a single draw call using GPU
//! instancing. The cubes form a hanging mobile (figures on three levels, crossbars and hangers)
//! that slowly revolves about the vertical axis; a small `egui` panel switches between five fixed
//! camera views.
//!
//! Each cube's world transform is supplied through a second vertex stream whose step mode is
//! per-instance, so the vertex shader reads one 4×4 matrix per cube while the cube geometry
//! itself is shared.
//!
//! ## Modules
//!
//! - [`app`]: window creation, event loop integration and the settings overlay.
//! - [`renderer`]: per-frame orchestration of the scene and GUI on `wgpu`.
//! - [`gpu`]: device, queue and surface management; `wgpu` implementation of the backend traits.
//! - [`backend`]: the narrow interface the scene uses to talk to the graphics API.
//! - [`scene`]: pipeline state, buffers, texture and the draw of the mobile.
//! - [`frame`]: per-tick animation state (global angle, camera mode, derived matrices).
//! - [`layout`]: the declarative layout of the mobile.
//! - [`instance`]: the per-instance vertex stream and its fixed-capacity buffer.
//! - [`camera`]: the five fixed camera views.
//! - [`vertex`], [`uniform_buffer`], [`uniform_binding`], [`texture`]: GPU data definitions.
//!
//! ## Usage
//!
//! 1. **Initialize the App**: create an [`App`] and hand it to a `winit` event loop.
//! 2. **Renderer**: on the first `resumed` event the app builds a [`Renderer`], which creates the
//!    [`Gpu`] and the [`Scene`].
//! 3. **Frames**: every redraw runs one [`Scene::update`] followed by one [`Scene::render`].
//!
//! ## Example
//!
//! ```no_run
//! let event_loop = winit::event_loop::EventLoop::new().unwrap();
//! let mut app = instancing_core::App::default();
//! event_loop.run_app(&mut app).unwrap();
//! ```
//!
//! ## Dependencies
//!
//! - `wgpu`: GPU abstraction, pipelines and resource management.
//! - `winit`: window and event management.
//! - `egui`, `egui-wgpu`, `egui-winit`: the settings overlay.
//! - `nalgebra-glm`: matrix and vector math.
//! - `image`: texture decoding and generation.
//! - `log` and `env_logger`: logging.
//! - `thiserror`: error types.

mod app;
mod backend;
mod camera;
mod config;
mod error;
mod frame;
mod gpu;
mod instance;
mod layout;
mod renderer;
mod scene;
mod texture;
mod ui;
mod uniform_binding;
mod uniform_buffer;
mod vertex;

#[cfg(test)]
mod testing;

use web_time::Duration;

pub use crate::app::App;
pub use crate::backend::{
    BufferAllocator, BufferBinding, BufferRequest, BufferUsage, DrawSubmission, PipelineFactory,
    PipelineRequest, ProjectionQueries, ShaderResource,
};
pub use crate::camera::CameraMode;
pub use crate::config::{AngleAdvance, SampleConfig};
pub use crate::error::RenderError;
pub use crate::frame::{FrameState, FrameUpdater, SceneSettings};
pub use crate::gpu::Gpu;
pub use crate::instance::{InstanceBuffer, InstanceRaw};
pub use crate::layout::{mobile_layout, Placement, MOBILE};
pub use crate::renderer::{Renderer, WgpuFrame};
pub use crate::scene::{linear_to_srgb, Scene};
pub use crate::texture::WgpuTexture;
pub use crate::uniform_buffer::UniformBuffer;
pub use crate::vertex::{Vertex, VERTICES};

/// Indices of the cube's twelve triangles, two per face, into [`VERTICES`].
///
/// Each face owns four consecutive vertices `v0..v3` and is split into the triangles
/// `(v0, v1, v2)` and `(v2, v3, v0)`.
#[rustfmt::skip]
pub const INDICES: [u32; 36] = [
     0,  1,  2,   2,  3,  0, // +Z
     4,  5,  6,   6,  7,  4, // -Z
     8,  9, 10,  10, 11,  8, // +X
    12, 13, 14,  14, 15, 12, // -X
    16, 17, 18,  18, 19, 16, // +Y
    20, 21, 22,  22, 23, 20, // -Y
];

/// The WGSL source of the instancing pipeline.
///
/// It declares:
/// - the `Constants` uniform block (`view_proj`, `rotation`) at group 0, binding 0,
/// - the cube texture and its sampler at bindings 1 and 2,
/// - `vertex_main`, reading the per-vertex stream at locations 0..=1 and the per-instance
///   matrix at locations 2..=5,
/// - `fragment_main` for sRGB targets and `fragment_main_gamma` for targets that need the
///   output gamma-encoded by hand.
pub const SHADER_SOURCE: &str = include_str!("shader_source.wgsl");

/// Entry point of the WebAssembly build.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    let event_loop = winit::event_loop::EventLoop::new()
        .map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);
    let app = App::default();
    use winit::platform::web::EventLoopExtWebSys;
    event_loop.spawn_app(app);
    Ok(())
}
