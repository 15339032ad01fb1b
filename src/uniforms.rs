//! Viewport uniforms.
//!
//! Locations are looked up once per program (at startup and after each reload)
//! and the whole viewport is written after every change.

use crate::constants::*;
use crate::shader::ShaderProgram;
use crate::viewport::ViewportState;
use glow::HasContext;

/// Sink for uniform writes on the currently bound program.
pub trait UniformWriter {
    type Location;

    fn set_f32(&self, location: &Self::Location, value: f32);
    fn set_vec2(&self, location: &Self::Location, x: f32, y: f32);
    fn set_i32(&self, location: &Self::Location, value: i32);
}

impl UniformWriter for glow::Context {
    type Location = glow::UniformLocation;

    fn set_f32(&self, location: &Self::Location, value: f32) {
        unsafe { self.uniform_1_f32(Some(location), value) }
    }

    fn set_vec2(&self, location: &Self::Location, x: f32, y: f32) {
        unsafe { self.uniform_2_f32(Some(location), x, y) }
    }

    fn set_i32(&self, location: &Self::Location, value: i32) {
        unsafe { self.uniform_1_i32(Some(location), value) }
    }
}

/// Uniform slots of the viewport. A slot is `None` when the program does not
/// use that uniform (the GLSL compiler may optimize it away).
#[derive(Debug, Clone)]
pub struct UniformLocations<L> {
    pub zoom: Option<L>,
    pub center: Option<L>,
    pub max_iterations: Option<L>,
    pub palette: Option<L>,
    pub use_palette: Option<L>,
}

impl UniformLocations<glow::UniformLocation> {
    pub fn fetch(shader: &ShaderProgram) -> Self {
        let locations = Self {
            zoom: shader.uniform_location(UNIFORM_ZOOM),
            center: shader.uniform_location(UNIFORM_CENTER),
            max_iterations: shader.uniform_location(UNIFORM_MAX_ITERATIONS),
            palette: shader.uniform_location(UNIFORM_PALETTE),
            use_palette: shader.uniform_location(UNIFORM_USE_PALETTE),
        };
        if locations.zoom.is_none() || locations.center.is_none() {
            tracing::warn!("viewport uniforms not found in shader program");
        }
        locations
    }
}

impl<L> UniformLocations<L> {
    /// Write the viewport to the bound program. GLSL `float` is single
    /// precision, so zoom and center are narrowed here.
    pub fn sync<W>(&self, writer: &W, viewport: &ViewportState)
    where
        W: UniformWriter<Location = L>,
    {
        if let Some(loc) = &self.zoom {
            writer.set_f32(loc, viewport.zoom as f32);
        }
        if let Some(loc) = &self.center {
            writer.set_vec2(loc, viewport.center.x as f32, viewport.center.y as f32);
        }
        if let Some(loc) = &self.max_iterations {
            writer.set_i32(loc, viewport.max_iterations);
        }
    }

    /// Point `u_palette` at `texture_unit` and toggle the lookup.
    pub fn sync_palette<W>(&self, writer: &W, texture_unit: Option<i32>)
    where
        W: UniformWriter<Location = L>,
    {
        if let (Some(loc), Some(unit)) = (&self.palette, texture_unit) {
            writer.set_i32(loc, unit);
        }
        if let Some(loc) = &self.use_palette {
            writer.set_i32(loc, texture_unit.is_some() as i32);
        }
    }
}
