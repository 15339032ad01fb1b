//! Status overlay.
//!
//! Shows the current viewport, the frame rate and the key bindings in a small
//! window in the top-left corner.

use crate::viewport::ViewportState;
use glam::DVec2;

/// Data needed to render the overlay
pub struct HudData {
    pub zoom: f64,
    pub center: [f64; 2],
    pub max_iterations: i32,
    /// World point under the pointer
    pub cursor: [f64; 2],
    pub fps: Option<u32>,
}

impl HudData {
    pub fn new(viewport: &ViewportState, cursor_ndc: DVec2, fps: Option<u32>) -> Self {
        Self {
            zoom: viewport.zoom,
            center: viewport.center.to_array(),
            max_iterations: viewport.max_iterations,
            cursor: viewport.world_at(cursor_ndc).to_array(),
            fps,
        }
    }

    fn lines(&self) -> [String; 5] {
        [
            format!("zoom: {:.6e}", self.zoom),
            format!("center: ({:.12}, {:.12})", self.center[0], self.center[1]),
            format!("cursor: ({:.12}, {:.12})", self.cursor[0], self.cursor[1]),
            format!("iterations: {}", self.max_iterations),
            match self.fps {
                Some(fps) => format!("fps: {fps}"),
                None => "fps: --".to_string(),
            },
        ]
    }
}

const KEY_HELP: [(&str, &str); 8] = [
    ("drag", "pan"),
    ("wheel / pinch", "zoom"),
    ("left / right", "pan"),
    ("up / down", "iterations"),
    ("R", "reload shaders"),
    ("Home", "reset view"),
    ("F11", "fullscreen"),
    ("H", "hide overlay"),
];

pub fn draw_hud(ctx: &egui::Context, data: &HudData) {
    egui::Window::new("Mandelbrot")
        .fixed_pos([10.0, 10.0])
        .title_bar(false)
        .resizable(false)
        .show(ctx, |ui| {
            for line in data.lines() {
                ui.monospace(line);
            }

            ui.separator();

            egui::Grid::new("key_help").num_columns(2).show(ui, |ui| {
                for (key, action) in KEY_HELP {
                    ui.strong(key);
                    ui.label(action);
                    ui.end_row();
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines() {
        let viewport = ViewportState::new(0.4, DVec2::new(-0.4, 0.0), 100);
        let lines = HudData::new(&viewport, DVec2::new(0.4, 0.0), Some(60)).lines();
        assert_eq!(lines[0], "zoom: 4.000000e-1");
        assert_eq!(lines[2], "cursor: (0.600000000000, 0.000000000000)");
        assert_eq!(lines[3], "iterations: 100");
        assert_eq!(lines[4], "fps: 60");
        assert_eq!(HudData::new(&viewport, DVec2::ZERO, None).lines()[4], "fps: --");
    }
}
