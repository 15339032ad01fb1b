//! Window and overlay constants.

/// Default window title
pub const WINDOW_DEFAULT_TITLE: &str = "The Mandelbrot";
/// Default window width
pub const WINDOW_DEFAULT_WIDTH: u32 = 800;
/// Default window height
pub const WINDOW_DEFAULT_HEIGHT: u32 = 600;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "explorer.json";

/// Interval over which frames are counted before FPS is reported (seconds)
pub const FPS_REPORT_INTERVAL_SECS: f64 = 1.0;
