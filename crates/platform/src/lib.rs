//! Platform layer: window, event loop and input capture.
//!
//! Owns the winit event loop and feeds the [`SceneRenderer`] once per redraw:
//! frame timing, held movement keys and the pointer state for mouse look.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use corelib::input::{CameraInput, MoveKeys, PointerState};
use corelib::Vec2;
use renderer::SceneRenderer;

pub use renderer::RendererConfig;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

#[derive(Clone, Debug)]
pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Log frames per second once per second.
    pub show_fps: bool,
    pub renderer: RendererConfig,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Lumen3D".to_owned(),
            width: 1280,
            height: 720,
            show_fps: false,
            renderer: RendererConfig::default(),
        }
    }
}

/// Update the held-key set. Returns `false` for keys that do not move the camera.
pub fn apply_move_key(keys: &mut MoveKeys, code: KeyCode, pressed: bool) -> bool {
    let slot = match code {
        KeyCode::KeyW => &mut keys.forward,
        KeyCode::KeyS => &mut keys.back,
        KeyCode::KeyA => &mut keys.left,
        KeyCode::KeyD => &mut keys.right,
        KeyCode::Space => &mut keys.up,
        KeyCode::KeyX => &mut keys.down,
        _ => return false,
    };
    *slot = pressed;
    true
}

/// Counts frames and reports the rate once per full second.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < 1.0 {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}

struct App {
    config: PlatformConfig,
    window: Option<Arc<Window>>,
    renderer: Option<SceneRenderer>,
    input: CameraInput,
    start: Instant,
    last_frame: Instant,
    fps: FpsCounter,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: PlatformConfig) -> Self {
        let now = Instant::now();
        Self {
            config,
            window: None,
            renderer: None,
            input: CameraInput::default(),
            start: now,
            last_frame: now,
            fps: FpsCounter::default(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let renderer = pollster::block_on(SceneRenderer::new(
            window.clone(),
            self.config.renderer.clone(),
        ))
        .context("Failed to initialise renderer")?;

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.start = Instant::now();
        self.last_frame = self.start;
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{:#}", err);
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        let total = now.duration_since(self.start).as_secs_f64();
        self.last_frame = now;

        renderer.set_input(&self.input);
        if let Err(err) = renderer.update(dt, total) {
            self.fail(event_loop, err.context("Scene update failed"));
            return;
        }

        match renderer.render() {
            Ok(()) => {}
            Err(e) if SceneRenderer::is_surface_lost(&e) => {
                log::warn!("Surface lost/outdated; reconfiguring");
                renderer.recreate_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow::anyhow!("Surface out of memory"));
                return;
            }
            Err(e) => log::warn!("Frame skipped: {e:?}"),
        }

        if self.config.show_fps {
            if let Some(fps) = self.fps.tick(dt) {
                log::info!("FPS: {:.1}", fps);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                apply_move_key(&mut self.input.keys, code, state.is_pressed());
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Right,
                ..
            } => {
                let pointer = self.input.pointer.get_or_insert_with(PointerState::default);
                pointer.look_held = state.is_pressed();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pointer = self.input.pointer.get_or_insert_with(PointerState::default);
                pointer.position = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.input.pointer = None;
            }
            WindowEvent::Focused(false) => {
                self.input = CameraInput::default();
            }
            WindowEvent::Resized(size) => {
                log::info!("Resized: {}x{}", size.width, size.height);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.create_window_size_dependent_resources(size.width, size.height);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::info!("Scale factor changed: {:.3}", scale_factor);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.release_device_dependent_resources();
        }
    }
}

/// Open the window and run until it is closed.
pub fn run(config: PlatformConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .context("Event loop error")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
