//! # Application Shell (`app.rs`)
//!
//! The `App` struct plugs the sample into the `winit` event loop. It creates the window, the
//! `egui` state and the [`Renderer`], feeds window events to the GUI, and drives one
//! update-then-render cycle per redraw.
//!
//! ## Platform-Specific Notes
//!
//! - **Desktop**:
//!   - The `Renderer` is created synchronously on the first `resumed` event, blocking on
//!     `pollster`.
//!   - Logging goes through `env_logger`.
//!
//! - **WebAssembly**:
//!   - The window wraps the HTML canvas with the id `canvas`.
//!   - The `Renderer` is created asynchronously and handed back through a `oneshot` channel.
//!   - Panics and log records go to the browser console.
//!
//! ## Input
//!
//! - `Escape` exits.
//! - `1` to `5` select the Default, Front, Top, Side and Bottom camera views.
//! - The "Settings" window edits the grid size and the camera view.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use std::sync::Arc;

use web_time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::{Theme, Window},
};

use crate::camera::CameraMode;
use crate::config::SampleConfig;
use crate::renderer::Renderer;
use crate::ui;

/// Main application structure.
///
/// # Fields
///
/// - `config`: settings the renderer is built with.
/// - `window`: the window the sample renders into; on WebAssembly it wraps the canvas.
/// - `renderer`: `None` until initialization has finished.
/// - `gui_state`: `egui` integration with the `winit` window.
/// - `start_time`: when the window was created; the scene's clock counts from here.
/// - `last_render_time`: when the previous frame was rendered.
/// - `renderer_receiver`: _(WebAssembly only)_ delivers the asynchronously created renderer.
/// - `last_size`: window size in physical pixels.
#[derive(Default)]
pub struct App {
    config: SampleConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    gui_state: Option<egui_winit::State>,
    start_time: Option<Instant>,
    last_render_time: Option<Instant>,
    #[cfg(target_arch = "wasm32")]
    renderer_receiver: Option<
        futures::channel::oneshot::Receiver<Result<Renderer, crate::error::RenderError>>,
    >,
    last_size: (u32, u32),
}

impl App {
    /// Creates an application that builds its renderer from `config`.
    pub fn new(config: SampleConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }
}

/// Maps the digit keys `1`..=`5` to camera views, in the order of [`CameraMode::ALL`].
fn camera_mode_for_key(key_code: KeyCode) -> Option<CameraMode> {
    let index = match key_code {
        KeyCode::Digit1 | KeyCode::Numpad1 => 0,
        KeyCode::Digit2 | KeyCode::Numpad2 => 1,
        KeyCode::Digit3 | KeyCode::Numpad3 => 2,
        KeyCode::Digit4 | KeyCode::Numpad4 => 3,
        KeyCode::Digit5 | KeyCode::Numpad5 => 4,
        _ => return None,
    };
    CameraMode::from_index(index)
}

impl ApplicationHandler for App {
    /// Creates the window, the GUI state and the renderer on the first resume.
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let mut attributes = Window::default_attributes();

        #[cfg(not(target_arch = "wasm32"))]
        {
            attributes = attributes.with_title("Tutorial04: Instancing");
        }

        #[allow(unused_assignments)]
        #[cfg(target_arch = "wasm32")]
        let mut canvas_width = 0;

        #[allow(unused_assignments)]
        #[cfg(target_arch = "wasm32")]
        let mut canvas_height = 0;

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;
            let Some(canvas) = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id("canvas"))
                .and_then(|element| {
                    element
                        .dyn_into::<wgpu::web_sys::HtmlCanvasElement>()
                        .ok()
                })
            else {
                log::error!("No canvas element with id `canvas` found");
                event_loop.exit();
                return;
            };
            canvas_width = canvas.width();
            canvas_height = canvas.height();
            self.last_size = (canvas_width, canvas_height);
            attributes = attributes.with_canvas(Some(canvas));
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(error) => {
                log::error!("Failed to create window: {error}");
                event_loop.exit();
                return;
            }
        };

        let first_window_handle = self.window.is_none();
        let window_handle = Arc::new(window);
        self.window = Some(window_handle.clone());
        if !first_window_handle {
            return;
        }

        let gui_context = egui::Context::default();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let inner_size = window_handle.inner_size();
            self.last_size = (inner_size.width, inner_size.height);
        }

        #[cfg(target_arch = "wasm32")]
        {
            gui_context.set_pixels_per_point(window_handle.scale_factor() as f32);
        }

        let viewport_id = gui_context.viewport_id();
        let gui_state = egui_winit::State::new(
            gui_context,
            viewport_id,
            &window_handle,
            Some(window_handle.scale_factor() as _),
            Some(Theme::Dark),
            None,
        );

        #[cfg(not(target_arch = "wasm32"))]
        {
            // A second initialization (e.g. from a test harness) is harmless.
            let _ = env_logger::try_init();
            let (width, height) = self.last_size;
            let config = self.config.clone();
            let renderer = pollster::block_on(async move {
                Renderer::new(window_handle.clone(), width, height, config).await
            });
            match renderer {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(error) => {
                    log::error!("Failed to initialize renderer: {error}");
                    event_loop.exit();
                    return;
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let (sender, receiver) = futures::channel::oneshot::channel();
            self.renderer_receiver = Some(receiver);
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            let _ = console_log::init();
            log::info!("Canvas dimensions: ({canvas_width} x {canvas_height})");
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let renderer =
                    Renderer::new(window_handle.clone(), canvas_width, canvas_height, config)
                        .await;
                if sender.send(renderer).is_err() {
                    log::error!("Failed to send renderer!");
                }
            });
        }

        self.gui_state = Some(gui_state);
        let now = Instant::now();
        self.start_time = Some(now);
        self.last_render_time = Some(now);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(receiver) = self.renderer_receiver.as_mut() {
                if let Ok(Some(renderer)) = receiver.try_recv() {
                    self.renderer_receiver = None;
                    match renderer {
                        Ok(renderer) => self.renderer = Some(renderer),
                        Err(error) => {
                            log::error!("Failed to initialize renderer: {error}");
                            event_loop.exit();
                            return;
                        }
                    }
                }
            }
        }

        let (
            Some(gui_state),
            Some(renderer),
            Some(window),
            Some(start_time),
            Some(last_render_time),
        ) = (
            self.gui_state.as_mut(),
            self.renderer.as_mut(),
            self.window.as_ref(),
            self.start_time.as_ref(),
            self.last_render_time.as_mut(),
        )
        else {
            return;
        };

        // Receive gui window event
        if gui_state.on_window_event(window, &event).consumed {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if matches!(key_code, KeyCode::Escape) {
                    event_loop.exit();
                } else if let Some(mode) = camera_mode_for_key(key_code) {
                    log::info!("Camera view changed to {mode}");
                    renderer.settings_mut().camera_mode = mode;
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                log::info!("Resizing renderer surface to: ({width}, {height})");
                renderer.resize(width, height);
                self.last_size = (width, height);
            }
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting...");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let current_time = now - *start_time;
                let delta_time = now - *last_render_time;
                *last_render_time = now;

                let gui_input = gui_state.take_egui_input(window);
                gui_state.egui_ctx().begin_pass(gui_input);

                let changes = ui::settings_window(
                    gui_state.egui_ctx(),
                    renderer.settings_mut(),
                    self.config.max_grid_size,
                );
                if changes.grid_size {
                    log::info!("Grid size changed, rebuilding instance data");
                    if let Err(error) = renderer.repopulate_instances() {
                        log::error!("Failed to rebuild instance data: {error}");
                        event_loop.exit();
                        return;
                    }
                }

                let egui_winit::egui::FullOutput {
                    textures_delta,
                    shapes,
                    pixels_per_point,
                    platform_output,
                    ..
                } = gui_state.egui_ctx().end_pass();

                gui_state.handle_platform_output(window, platform_output);

                let paint_jobs = gui_state.egui_ctx().tessellate(shapes, pixels_per_point);

                let screen_descriptor = {
                    let (width, height) = self.last_size;
                    egui_wgpu::ScreenDescriptor {
                        size_in_pixels: [width, height],
                        pixels_per_point: window.scale_factor() as f32,
                    }
                };

                if let Err(error) = renderer.render_frame(
                    screen_descriptor,
                    paint_jobs,
                    textures_delta,
                    current_time,
                    delta_time,
                ) {
                    log::error!("Rendering failed, exiting: {error}");
                    event_loop.exit();
                    return;
                }
            }
            _ => (),
        }

        window.request_redraw();
    }
}
