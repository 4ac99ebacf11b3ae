//! Window creation and event handling via winit.
//!
//! [`OrreryApp`] implements winit's [`ApplicationHandler`]. Window events are
//! folded into the input state as they arrive; each redraw resolves them into
//! scene commands, advances the simulation and renders one frame.

use std::sync::Arc;

use orrery_config::Config;
use orrery_input::{KeyBindings, KeyboardState, MouseState, resolve_frame};
use orrery_render::{RenderContext, SceneRenderer, SurfaceError, init_render_context_blocking};
use orrery_sim::SimulationContext;
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::error::AppError;
use crate::frame_clock::FrameClock;
use crate::scene;

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

pub struct OrreryApp {
    config: Config,
    bindings: KeyBindings,
    keyboard: KeyboardState,
    mouse: MouseState,
    context: SimulationContext,
    clock: FrameClock,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    renderer: Option<SceneRenderer>,
    /// First fatal error; the event loop exits once it is set.
    error: Option<AppError>,
}

impl OrreryApp {
    /// # Errors
    ///
    /// Returns [`AppError::Scene`] when the configured hierarchy is malformed.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let context = scene::build_context(&config)?;
        let bindings = KeyBindings::default();
        bindings.warn_conflicts();

        Ok(Self {
            clock: FrameClock::new(config.time.max_frame_time),
            config,
            bindings,
            keyboard: KeyboardState::new(),
            mouse: MouseState::default(),
            context,
            window: None,
            gpu: None,
            renderer: None,
            error: None,
        })
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    #[cfg(test)]
    fn keyboard_mut(&mut self) -> &mut KeyboardState {
        &mut self.keyboard
    }

    #[cfg(test)]
    fn mouse_mut(&mut self) -> &mut MouseState {
        &mut self.mouse
    }

    /// Apply this frame's input and advance the simulation by `dt` seconds.
    /// Returns whether quit was requested.
    pub fn step(&mut self, dt: f64) -> bool {
        let input = resolve_frame(&self.bindings, &self.keyboard, &self.mouse);
        for command in input.commands {
            self.context.apply(command);
        }
        self.context.update(dt, &input.movement);

        self.keyboard.clear_transients();
        self.mouse.clear_transients();
        input.quit
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let attrs = window_attributes_from_config(&self.config);
        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();
        info!(
            "Window created: {}x{} (scale: {:.2})",
            size.width,
            size.height,
            window.scale_factor()
        );

        let gpu = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        let renderer = SceneRenderer::new(
            &gpu,
            scene::renderer_settings(&self.config),
            &scene::texture_paths(&self.config.assets),
            scene::body_materials(&self.config.scene),
        )?;

        self.gpu = Some(gpu);
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, width, height);
            }
        }
        info!("Window resized to {}x{}", width, height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();
        if self.step(dt) {
            info!("Quit requested, shutting down");
            event_loop.exit();
            return;
        }

        let (Some(gpu), Some(renderer)) = (&mut self.gpu, &mut self.renderer) else {
            return;
        };
        match renderer.render(gpu, &self.context.frame()) {
            Ok(()) => {}
            Err(SurfaceError::Lost) => {
                let (width, height) = gpu.size();
                gpu.resize(width, height);
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
            }
        }
    }

    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.initialize(event_loop) {
            self.fail(event_loop, err);
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::Focused(false) => self.keyboard.release_all(),
            WindowEvent::KeyboardInput { event, .. } => self.keyboard.process_event(&event),
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => self.mouse.on_button(button, state),
            WindowEvent::MouseWheel { delta, .. } => self.mouse.on_scroll(delta),
            WindowEvent::CursorLeft { .. } => self.mouse.on_cursor_left(),
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Open the window and run until it closes.
///
/// # Errors
///
/// Returns the first fatal error: a malformed scene, event loop or window
/// creation failure, GPU initialization failure or missing texture.
#[instrument(skip_all)]
pub fn run(config: Config) -> Result<(), AppError> {
    let mut app = OrreryApp::new(config)?;
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
