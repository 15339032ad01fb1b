//! Viewport state: which region of the complex plane is visible.
//!
//! A point `ndc` in normalized device coordinates (`[-1, 1]^2`, +y up) maps to
//! the world point `center + ndc / zoom`. All navigation is expressed as edits
//! of `zoom` and `center` that respect that mapping.

use crate::constants::*;
use glam::DVec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Magnification, always > 0
    pub zoom: f64,
    pub center: DVec2,
    /// Passed straight to the shader; not clamped
    pub max_iterations: i32,
}

impl ViewportState {
    pub fn new(zoom: f64, center: DVec2, max_iterations: i32) -> Self {
        Self {
            zoom,
            center,
            max_iterations,
        }
    }

    /// World coordinate under a cursor given in normalized device coordinates.
    pub fn world_at(&self, ndc: DVec2) -> DVec2 {
        self.center + ndc / self.zoom
    }

    /// Scale the zoom by `ratio` while keeping the world point under `ndc` fixed.
    ///
    /// Returns `false` and leaves the state untouched when the ratio would break
    /// `zoom > 0` (zero, negative, NaN or infinite).
    pub fn zoom_at(&mut self, ndc: DVec2, ratio: f64) -> bool {
        let new_zoom = self.zoom * ratio;
        if !(ratio.is_finite() && ratio > 0.0 && new_zoom.is_finite() && new_zoom > 0.0) {
            return false;
        }

        self.center += ndc / self.zoom - ndc / new_zoom;
        self.zoom = new_zoom;
        true
    }

    /// Zoom for a wheel movement of `lines` notches (positive = scroll up).
    pub fn wheel_zoom(&mut self, ndc: DVec2, lines: f64) -> bool {
        self.zoom_at(ndc, WHEEL_ZOOM_BASE.powf(lines))
    }

    /// Move the view opposite to a drag of `delta`, where `delta` is already
    /// normalized by the window size and y-up.
    pub fn pan(&mut self, delta: DVec2) {
        self.center -= delta / self.zoom;
    }

    /// Fixed-step horizontal pan. `direction` is -1.0 for left, 1.0 for right.
    pub fn step_horizontal(&mut self, direction: f64) {
        self.center.x += direction * KEY_PAN_STEP / self.zoom;
    }

    pub fn adjust_iterations(&mut self, delta: i32) {
        self.max_iterations = self.max_iterations.saturating_add(delta);
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(
            DEFAULT_ZOOM,
            DVec2::from_array(DEFAULT_CENTER),
            DEFAULT_MAX_ITERATIONS,
        )
    }
}

/// Convert a pixel position (origin top-left, +y down) to normalized device
/// coordinates (+y up).
pub fn pixel_to_ndc(pixel: DVec2, window_size: DVec2) -> DVec2 {
    let ndc = pixel / window_size * 2.0 - DVec2::ONE;
    DVec2::new(ndc.x, -ndc.y)
}

/// Convert a pixel delta to a y-up delta normalized by the window size.
pub fn normalize_pixel_delta(delta: DVec2, window_size: DVec2) -> DVec2 {
    let d = delta / window_size;
    DVec2::new(d.x, -d.y)
}
