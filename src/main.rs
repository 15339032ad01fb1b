mod app;
mod config;
mod constants;
mod error;
mod frame_stats;
mod hud;
mod input;
mod ppm;
mod renderer;
mod shader;
mod uniforms;
mod viewport;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use config::{ExplorerConfig, ReloadFailurePolicy};
use error::ExplorerError;
use frame_stats::FrameCounter;
use input::{InputResult, InputTranslator};
use renderer::Renderer;
use viewport::ViewportState;

use glutin::prelude::*;
use glutin::surface::WindowSurface;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorIcon, Window, WindowId};

use egui_glow::EguiGlow;

fn main() -> ExitCode {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = ExplorerConfig::load(config_path.as_deref());

    let level = config
        .as_ref()
        .ok()
        .and_then(|c| c.tracing_level().ok())
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    match config.map_err(ExplorerError::from).and_then(run) {
        Ok(()) => {
            tracing::info!("Exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: ExplorerConfig) -> Result<(), ExplorerError> {
    let _profiler = config.profiler_addr.as_deref().and_then(start_profiler);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Serve puffin data on `addr`. Scopes stay disabled unless the server starts.
fn start_profiler(addr: &str) -> Option<puffin_http::Server> {
    match puffin_http::Server::new(addr) {
        Ok(server) => {
            puffin::set_scopes_on(true);
            tracing::info!(%addr, "profiler server listening");
            Some(server)
        }
        Err(e) => {
            tracing::warn!(%addr, "could not start profiler server: {e}");
            None
        }
    }
}

struct App {
    config: ExplorerConfig,
    state: Option<AppState>,
    /// Error that ended the event loop
    fatal: Option<ExplorerError>,
}

struct AppState {
    // GL resources go first so they are released while the context is alive
    renderer: Renderer,
    egui_glow: EguiGlow,
    gl_surface: glutin::surface::Surface<WindowSurface>,
    gl_context: glutin::context::PossiblyCurrentContext,
    window: Window,

    viewport: ViewportState,
    /// View restored by the reset key
    home: ViewportState,
    input: InputTranslator,
    frames: FrameCounter,
    show_hud: bool,
    reload_policy: ReloadFailurePolicy,
}

impl App {
    fn new(config: ExplorerConfig) -> Self {
        Self {
            config,
            state: None,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ExplorerError) {
        self.fatal = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match AppState::new(event_loop, &self.config) {
            Ok(state) => self.state = Some(state),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let state = match &mut self.state {
            Some(s) => s,
            None => return,
        };

        // Let egui handle the event first
        let egui_response = state.egui_glow.on_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                state.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = state.update_and_render() {
                    self.fail(event_loop, e);
                }
            }
            event => {
                // Releases always reach the translator so a drag cannot stick
                let is_release = matches!(
                    event,
                    WindowEvent::MouseInput {
                        state: ElementState::Released,
                        ..
                    }
                );
                if !egui_response.consumed || is_release {
                    let result = state.handle_input(&event);
                    state.apply(result, event_loop);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut state) = self.state.take() {
            state.egui_glow.destroy();
        }
    }
}

impl AppState {
    fn new(event_loop: &ActiveEventLoop, config: &ExplorerConfig) -> Result<Self, ExplorerError> {
        let app::WindowContext {
            window,
            gl_surface,
            gl_context,
            gl,
            egui_glow,
        } = app::create_window(event_loop, &config.window)?;

        let palette = config.palette.as_deref().and_then(ppm::load_ppm);

        let size = window.inner_size();
        let renderer = Renderer::new(
            gl,
            &config.shaders,
            palette.as_ref(),
            size.width,
            size.height,
        )?;

        let home = config.scene.viewport();
        renderer.sync_uniforms(&home);
        tracing::info!(
            zoom = home.zoom,
            center_x = home.center.x,
            center_y = home.center.y,
            max_iterations = home.max_iterations,
            "explorer ready"
        );

        Ok(Self {
            renderer,
            egui_glow,
            gl_surface,
            gl_context,
            window,
            viewport: home,
            home,
            input: InputTranslator::new(size.width, size.height),
            frames: FrameCounter::new(Instant::now()),
            show_hud: true,
            reload_policy: config.shaders.on_reload_failure,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        app::resize_surface(&self.gl_surface, &self.gl_context, width, height);
        self.renderer.resize(width, height);
        self.input.resize(width, height);
    }

    fn handle_input(&mut self, event: &WindowEvent) -> InputResult {
        let viewport = &mut self.viewport;
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.input.on_key(*key, viewport),
            WindowEvent::MouseWheel { delta, .. } => self.input.on_wheel(*delta, viewport),
            WindowEvent::MouseInput { state, button, .. } => {
                self.input
                    .on_mouse_button(*button, *state == ElementState::Pressed);
                self.update_cursor_icon();
                InputResult::default()
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.on_cursor_moved(position.x, position.y, viewport)
            }
            WindowEvent::PinchGesture { delta, .. } => {
                self.input.on_pinch_gesture(*delta, viewport)
            }
            WindowEvent::Touch(touch) => self.input.on_touch(
                touch.id,
                touch.phase,
                touch.location.x,
                touch.location.y,
                viewport,
            ),
            _ => InputResult::default(),
        }
    }

    fn update_cursor_icon(&self) {
        let icon = if self.input.is_dragging() {
            CursorIcon::Grabbing
        } else if self.input.is_pinching() {
            CursorIcon::ZoomIn
        } else {
            CursorIcon::Default
        };
        self.window.set_cursor(icon);
    }

    fn apply(&mut self, result: InputResult, event_loop: &ActiveEventLoop) {
        if result.apply_view(&mut self.viewport, &self.home) {
            self.renderer.sync_uniforms(&self.viewport);
        }
        if result.reload_shaders {
            self.renderer.request_reload();
        }
        if result.toggle_overlay {
            self.show_hud = !self.show_hud;
        }
        if result.toggle_fullscreen {
            app::toggle_fullscreen(&self.window);
        }
        if result.exit {
            event_loop.exit();
        }
    }

    fn update_and_render(&mut self) -> Result<(), ExplorerError> {
        puffin::GlobalProfiler::lock().new_frame();

        if let Err(e) = self.renderer.process_reload(&self.viewport) {
            self.reload_policy.handle(e)?;
        }

        self.renderer.render();

        if self.show_hud {
            puffin::profile_scope!("hud");
            let data =
                hud::HudData::new(&self.viewport, self.input.cursor_ndc(), self.frames.fps());
            self.egui_glow.run(&self.window, |ctx| hud::draw_hud(ctx, &data));
            self.egui_glow.paint(&self.window);
        }

        self.gl_surface.swap_buffers(&self.gl_context)?;
        self.frames.tick_at(Instant::now());
        Ok(())
    }
}
