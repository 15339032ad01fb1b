//! Viewport navigation constants.

/// Zoom ratio applied per wheel line (`0.9^lines`)
pub const WHEEL_ZOOM_BASE: f64 = 0.9;
/// Pixel-precise scroll deltas are divided by this to get wheel lines
pub const WHEEL_PIXELS_PER_LINE: f64 = 20.0;
/// Keyboard pan step in normalized device units, divided by zoom
pub const KEY_PAN_STEP: f64 = 0.1;
/// Iteration change per Up/Down key press
pub const ITERATION_STEP: i32 = 1;

/// Default zoom level
pub const DEFAULT_ZOOM: f64 = 0.4;
/// Default view center (real, imaginary)
pub const DEFAULT_CENTER: [f64; 2] = [-0.4, 0.0];
/// Default iteration limit
pub const DEFAULT_MAX_ITERATIONS: i32 = 100;
