//! Window and OpenGL context management.
//!
//! Creates the window, a core 3.3 context and the egui integration, and keeps
//! the GL surface in step with the window size.

use std::ffi::CString;
use std::num::NonZeroU32;
use std::sync::Arc;

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window, WindowAttributes};

use egui_glow::EguiGlow;
use glow::HasContext;

use crate::config::WindowConfig;
use crate::error::ExplorerError;

/// Result of window and GL context creation.
pub struct WindowContext {
    pub window: Window,
    pub gl_surface: glutin::surface::Surface<WindowSurface>,
    pub gl_context: glutin::context::PossiblyCurrentContext,
    pub gl: Arc<glow::Context>,
    pub egui_glow: EguiGlow,
}

/// Create a window with an OpenGL context and egui integration.
pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &WindowConfig,
) -> Result<WindowContext, ExplorerError> {
    let window_attrs = WindowAttributes::default()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(true);

    let template = ConfigTemplateBuilder::new().with_alpha_size(8);
    let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attrs));

    // The shader covers every pixel once, so multisampling buys nothing
    let (window, gl_config) = display_builder
        .build(event_loop, template, |configs| {
            configs
                .min_by_key(|config| config.num_samples())
                .expect("glutin offers at least one config")
        })
        .map_err(|e| ExplorerError::Window(e.to_string()))?;

    let window = window.ok_or_else(|| ExplorerError::Window("no window was created".to_string()))?;
    let window_handle = window
        .window_handle()
        .map_err(|e| ExplorerError::Window(e.to_string()))?;
    let gl_display = gl_config.display();

    let context_attrs = ContextAttributesBuilder::new()
        .with_profile(GlProfile::Core)
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .build(Some(window_handle.as_raw()));

    let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attrs)? };

    let size = window.inner_size();
    let (width, height) = surface_size(size.width, size.height)
        .ok_or_else(|| ExplorerError::Window("window has zero size".to_string()))?;
    let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        window_handle.as_raw(),
        width,
        height,
    );

    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attrs)? };
    let gl_context = gl_context.make_current(&gl_surface)?;

    let interval = if config.vsync {
        SwapInterval::Wait(NonZeroU32::MIN)
    } else {
        SwapInterval::DontWait
    };
    if let Err(e) = gl_surface.set_swap_interval(&gl_context, interval) {
        tracing::warn!("could not set swap interval: {e}");
    }

    let gl = Arc::new(unsafe {
        glow::Context::from_loader_function(|s| match CString::new(s) {
            Ok(s) => gl_display.get_proc_address(&s) as *const _,
            Err(_) => std::ptr::null(),
        })
    });

    let gl_version = unsafe { gl.get_parameter_string(glow::VERSION) };
    tracing::info!(%gl_version, "OpenGL context created");

    let egui_glow = EguiGlow::new(event_loop, gl.clone(), None, None, false);
    egui_glow.egui_ctx.set_visuals(egui::Visuals::dark());

    tracing::info!(
        width = size.width,
        height = size.height,
        vsync = config.vsync,
        "window created"
    );

    Ok(WindowContext {
        window,
        gl_surface,
        gl_context,
        gl,
        egui_glow,
    })
}

/// Resize the GL surface to match the window size.
pub fn resize_surface(
    gl_surface: &glutin::surface::Surface<WindowSurface>,
    gl_context: &glutin::context::PossiblyCurrentContext,
    width: u32,
    height: u32,
) {
    if let Some((width, height)) = surface_size(width, height) {
        gl_surface.resize(gl_context, width, height);
    }
}

/// Switch between windowed and borderless fullscreen on the current monitor.
pub fn toggle_fullscreen(window: &Window) {
    if window.fullscreen().is_some() {
        window.set_fullscreen(None);
    } else {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    }
}

/// Minimized windows report a zero size, which surfaces cannot take.
fn surface_size(width: u32, height: u32) -> Option<(NonZeroU32, NonZeroU32)> {
    Some((NonZeroU32::new(width)?, NonZeroU32::new(height)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_rejects_zero() {
        assert!(surface_size(0, 600).is_none());
        assert!(surface_size(800, 0).is_none());
        let (w, h) = surface_size(800, 600).unwrap();
        assert_eq!((w.get(), h.get()), (800, 600));
    }
}
