//! Input translation.
//!
//! Turns pointer, wheel, touch, pinch and key input into edits of the
//! [`ViewportState`]. Gesture continuity (active drag, pinch anchors, touch
//! points) is tracked on [`InputTranslator`], one per session.

use crate::constants::*;
use crate::viewport::{normalize_pixel_delta, pixel_to_ndc, ViewportState};
use glam::DVec2;
use winit::event::{MouseButton, MouseScrollDelta, TouchPhase};
use winit::keyboard::KeyCode;

/// Right-button pinch emulation: distance from the press point drives zoom.
#[derive(Debug, Clone, Copy)]
struct MousePinch {
    anchor: DVec2,
    /// Distance at the previous motion event; `None` until the first motion
    last_distance: Option<f64>,
}

/// Up to two tracked touch points.
#[derive(Debug, Default, Clone)]
struct TouchPoints {
    first: Option<(u64, DVec2)>,
    second: Option<(u64, DVec2)>,
    /// Finger distance at the previous pinch update
    last_distance: Option<f64>,
}

impl TouchPoints {
    fn pair(&self) -> Option<(DVec2, DVec2)> {
        match (self.first, self.second) {
            (Some((_, a)), Some((_, b))) => Some((a, b)),
            _ => None,
        }
    }

    fn position_mut(&mut self, id: u64) -> Option<&mut DVec2> {
        match (&mut self.first, &mut self.second) {
            (Some((fid, pos)), _) if *fid == id => Some(pos),
            (_, Some((sid, pos))) if *sid == id => Some(pos),
            _ => None,
        }
    }
}

/// What the application should do after an input event
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputResult {
    /// Viewport changed; uniforms must be synced now
    pub viewport_changed: bool,
    pub reload_shaders: bool,
    pub exit: bool,
    pub reset_view: bool,
    pub toggle_overlay: bool,
    pub toggle_fullscreen: bool,
}

impl InputResult {
    fn changed(viewport_changed: bool) -> Self {
        Self {
            viewport_changed,
            ..Self::default()
        }
    }

    /// Apply a view reset to `viewport`. Returns whether the uniforms need a
    /// sync, which is the case after any viewport edit.
    pub fn apply_view(&self, viewport: &mut ViewportState, home: &ViewportState) -> bool {
        if self.reset_view {
            *viewport = *home;
        }
        self.viewport_changed || self.reset_view
    }
}

pub struct InputTranslator {
    window_size: DVec2,
    /// Last known cursor position in pixels
    cursor: DVec2,
    /// Last cursor position while the left button is held
    drag: Option<DVec2>,
    pinch: Option<MousePinch>,
    touches: TouchPoints,
}

impl InputTranslator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            window_size: DVec2::new(width.max(1) as f64, height.max(1) as f64),
            cursor: DVec2::ZERO,
            drag: None,
            pinch: None,
            touches: TouchPoints::default(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        // Minimized windows report 0x0; keep the last usable size.
        if width > 0 && height > 0 {
            self.window_size = DVec2::new(width as f64, height as f64);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some() || self.touches.pair().is_some()
    }

    pub fn cursor_ndc(&self) -> DVec2 {
        pixel_to_ndc(self.cursor, self.window_size)
    }

    pub fn on_key(&mut self, key: KeyCode, viewport: &mut ViewportState) -> InputResult {
        match key {
            KeyCode::KeyR => InputResult {
                reload_shaders: true,
                ..InputResult::default()
            },
            KeyCode::Escape => InputResult {
                exit: true,
                ..InputResult::default()
            },
            KeyCode::Home => InputResult {
                reset_view: true,
                ..InputResult::default()
            },
            KeyCode::KeyH => InputResult {
                toggle_overlay: true,
                ..InputResult::default()
            },
            KeyCode::F11 => InputResult {
                toggle_fullscreen: true,
                ..InputResult::default()
            },
            KeyCode::ArrowUp => {
                viewport.adjust_iterations(ITERATION_STEP);
                InputResult::changed(true)
            }
            KeyCode::ArrowDown => {
                viewport.adjust_iterations(-ITERATION_STEP);
                InputResult::changed(true)
            }
            KeyCode::ArrowLeft => {
                viewport.step_horizontal(-1.0);
                InputResult::changed(true)
            }
            KeyCode::ArrowRight => {
                viewport.step_horizontal(1.0);
                InputResult::changed(true)
            }
            _ => InputResult::default(),
        }
    }

    pub fn on_wheel(
        &mut self,
        delta: MouseScrollDelta,
        viewport: &mut ViewportState,
    ) -> InputResult {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y as f64,
            MouseScrollDelta::PixelDelta(pos) => pos.y / WHEEL_PIXELS_PER_LINE,
        };
        if lines == 0.0 {
            return InputResult::default();
        }
        InputResult::changed(viewport.wheel_zoom(self.cursor_ndc(), lines))
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        match (button, pressed) {
            (MouseButton::Left, true) => self.drag = Some(self.cursor),
            (MouseButton::Left, false) => self.drag = None,
            (MouseButton::Right, true) => {
                self.pinch = Some(MousePinch {
                    anchor: self.cursor,
                    last_distance: None,
                })
            }
            (MouseButton::Right, false) => self.pinch = None,
            _ => {}
        }
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64, viewport: &mut ViewportState) -> InputResult {
        let position = DVec2::new(x, y);
        self.cursor = position;

        if let Some(last) = self.drag {
            self.drag = Some(position);
            viewport.pan(normalize_pixel_delta(position - last, self.window_size));
            return InputResult::changed(true);
        }

        let window_size = self.window_size;
        if let Some(pinch) = self.pinch.as_mut() {
            let distance = normalize_pixel_delta(position - pinch.anchor, window_size).length();
            let previous = pinch.last_distance.replace(distance);
            // Incremental ratio: the total zoom since the press is d / d0. Scaling
            // the current zoom by d / d0 on every event would compound instead.
            if let Some(previous) = previous.filter(|d| *d > 0.0) {
                let ndc = pixel_to_ndc(position, window_size);
                return InputResult::changed(viewport.zoom_at(ndc, distance / previous));
            }
        }

        InputResult::default()
    }

    /// Touchpad magnification gesture; `delta` > 0 magnifies.
    pub fn on_pinch_gesture(&mut self, delta: f64, viewport: &mut ViewportState) -> InputResult {
        InputResult::changed(viewport.zoom_at(self.cursor_ndc(), 1.0 + delta))
    }

    pub fn on_touch(
        &mut self,
        id: u64,
        phase: TouchPhase,
        x: f64,
        y: f64,
        viewport: &mut ViewportState,
    ) -> InputResult {
        let position = DVec2::new(x, y);

        match phase {
            TouchPhase::Started => {
                if self.touches.first.is_none() {
                    self.touches.first = Some((id, position));
                } else if self.touches.second.is_none() {
                    self.touches.second = Some((id, position));
                    self.touches.last_distance = self.touches.pair().map(|(a, b)| a.distance(b));
                }
                InputResult::default()
            }
            TouchPhase::Moved => {
                let Some(tracked) = self.touches.position_mut(id) else {
                    return InputResult::default();
                };
                let previous_position = *tracked;
                *tracked = position;

                match self.touches.pair() {
                    Some((a, b)) => {
                        let distance = a.distance(b);
                        let previous = self.touches.last_distance.replace(distance);
                        match previous.filter(|d| *d > 0.0) {
                            Some(previous) => {
                                let ndc = pixel_to_ndc((a + b) * 0.5, self.window_size);
                                InputResult::changed(viewport.zoom_at(ndc, distance / previous))
                            }
                            None => InputResult::default(),
                        }
                    }
                    None => {
                        viewport.pan(normalize_pixel_delta(
                            position - previous_position,
                            self.window_size,
                        ));
                        InputResult::changed(true)
                    }
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if matches!(self.touches.first, Some((fid, _)) if fid == id) {
                    self.touches.first = self.touches.second.take();
                } else if matches!(self.touches.second, Some((sid, _)) if sid == id) {
                    self.touches.second = None;
                }
                self.touches.last_distance = None;
                InputResult::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    const EPS: f64 = 1e-9;

    fn setup() -> (InputTranslator, ViewportState) {
        (
            InputTranslator::new(800, 600),
            ViewportState::new(1.0, DVec2::ZERO, 100),
        )
    }

    #[test]
    fn test_apply_view_reset_restores_home() {
        let (mut input, mut vp) = setup();
        let home = vp;
        input.on_key(KeyCode::ArrowRight, &mut vp);
        let result = input.on_key(KeyCode::Home, &mut vp);

        assert!(result.apply_view(&mut vp, &home));
        assert_eq!(vp, home);
    }

    #[test]
    fn test_apply_view_needs_sync_only_after_edits() {
        let (mut input, mut vp) = setup();
        let home = ViewportState::default();

        let pan = input.on_key(KeyCode::ArrowLeft, &mut vp);
        let edited = vp;
        assert!(pan.apply_view(&mut vp, &home));
        assert_eq!(vp, edited);

        let overlay = input.on_key(KeyCode::KeyH, &mut vp);
        assert!(!overlay.apply_view(&mut vp, &home));
        assert!(!input.on_key(KeyCode::KeyR, &mut vp).apply_view(&mut vp, &home));
        assert_eq!(vp, edited);
    }

    #[test]
    fn test_drag_pans_by_normalized_delta() {
        let (mut input, mut vp) = setup();
        input.on_cursor_moved(400.0, 300.0, &mut vp);
        input.on_mouse_button(MouseButton::Left, true);
        let result = input.on_cursor_moved(480.0, 360.0, &mut vp);

        assert!(result.viewport_changed);
        // delta = (0.1, -0.1) after y flip, center -= delta / zoom
        assert!((vp.center - DVec2::new(-0.1, 0.1)).length() < EPS);
    }

    #[test]
    fn test_drag_back_restores_center() {
        let (mut input, mut vp) = setup();
        input.on_cursor_moved(100.0, 100.0, &mut vp);
        input.on_mouse_button(MouseButton::Left, true);
        input.on_cursor_moved(250.0, 40.0, &mut vp);
        input.on_cursor_moved(100.0, 100.0, &mut vp);
        assert!(vp.center.length() < EPS);
    }

    #[test]
    fn test_motion_without_button_changes_nothing() {
        let (mut input, mut vp) = setup();
        let result = input.on_cursor_moved(10.0, 20.0, &mut vp);
        assert!(!result.viewport_changed);
        assert_eq!(vp.center, DVec2::ZERO);
    }

    #[test]
    fn test_release_ends_drag() {
        let (mut input, mut vp) = setup();
        input.on_mouse_button(MouseButton::Left, true);
        assert!(input.is_dragging());
        input.on_mouse_button(MouseButton::Left, false);
        assert!(!input.is_dragging());
        input.on_cursor_moved(300.0, 300.0, &mut vp);
        assert_eq!(vp.center, DVec2::ZERO);
    }

    #[test]
    fn test_wheel_zooms_at_cursor() {
        let (mut input, mut vp) = setup();
        input.on_cursor_moved(800.0, 300.0, &mut vp);
        let before = vp.world_at(input.cursor_ndc());

        let result = input.on_wheel(MouseScrollDelta::LineDelta(0.0, 1.0), &mut vp);
        assert!(result.viewport_changed);
        assert!((vp.zoom - 0.9).abs() < EPS);
        assert!((vp.world_at(input.cursor_ndc()) - before).length() < EPS);
    }

    #[test]
    fn test_pixel_wheel_delta_converts_to_lines() {
        let (mut input, mut vp) = setup();
        input.on_cursor_moved(400.0, 300.0, &mut vp);
        input.on_wheel(
            MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -2.0 * WHEEL_PIXELS_PER_LINE)),
            &mut vp,
        );
        assert!((vp.zoom - 0.9f64.powf(-2.0)).abs() < EPS);
    }

    #[test]
    fn test_zero_wheel_is_ignored() {
        let (mut input, mut vp) = setup();
        let result = input.on_wheel(MouseScrollDelta::LineDelta(1.0, 0.0), &mut vp);
        assert!(!result.viewport_changed);
        assert_eq!(vp.zoom, 1.0);
    }

    #[test]
    fn test_right_button_pinch_accumulates_distance_ratio() {
        let (mut input, mut vp) = setup();
        input.on_cursor_moved(400.0, 300.0, &mut vp);
        input.on_mouse_button(MouseButton::Right, true);

        // First motion only records the initial distance
        let first = input.on_cursor_moved(480.0, 300.0, &mut vp);
        assert!(!first.viewport_changed);
        assert_eq!(vp.zoom, 1.0);

        input.on_cursor_moved(520.0, 300.0, &mut vp);
        input.on_cursor_moved(560.0, 300.0, &mut vp);
        // Total ratio = 160 / 80
        assert!((vp.zoom - 2.0).abs() < EPS);
        assert!(input.is_pinching());

        input.on_mouse_button(MouseButton::Right, false);
        assert!(!input.is_pinching());
    }

    #[test]
    fn test_drag_takes_precedence_over_pinch() {
        let (mut input, mut vp) = setup();
        input.on_mouse_button(MouseButton::Left, true);
        input.on_mouse_button(MouseButton::Right, true);
        input.on_cursor_moved(80.0, 0.0, &mut vp);
        input.on_cursor_moved(160.0, 0.0, &mut vp);
        assert_eq!(vp.zoom, 1.0);
        assert!(vp.center.x < 0.0);
    }

    #[test]
    fn test_touchpad_pinch_magnifies() {
        let (mut input, mut vp) = setup();
        input.on_cursor_moved(400.0, 300.0, &mut vp);
        assert!(input.on_pinch_gesture(0.5, &mut vp).viewport_changed);
        assert!((vp.zoom - 1.5).abs() < EPS);
        // A -1.0 magnification would collapse the zoom
        assert!(!input.on_pinch_gesture(-1.0, &mut vp).viewport_changed);
        assert!((vp.zoom - 1.5).abs() < EPS);
    }

    #[test]
    fn test_two_finger_pinch_zooms_at_midpoint() {
        let (mut input, mut vp) = setup();
        input.on_touch(1, TouchPhase::Started, 300.0, 300.0, &mut vp);
        input.on_touch(2, TouchPhase::Started, 500.0, 300.0, &mut vp);
        assert!(input.is_pinching());

        // After the first finger moves, the pair spans 250..500
        let midpoint = pixel_to_ndc(DVec2::new(375.0, 300.0), DVec2::new(800.0, 600.0));
        let before = vp.world_at(midpoint);

        input.on_touch(1, TouchPhase::Moved, 250.0, 300.0, &mut vp);
        assert!((vp.zoom - 1.25).abs() < EPS);
        assert!((vp.world_at(midpoint) - before).length() < EPS);

        input.on_touch(2, TouchPhase::Moved, 550.0, 300.0, &mut vp);
        assert!((vp.zoom - 1.5).abs() < EPS);

        input.on_touch(2, TouchPhase::Ended, 550.0, 300.0, &mut vp);
        assert!(!input.is_pinching());
    }

    #[test]
    fn test_single_touch_pans() {
        let (mut input, mut vp) = setup();
        input.on_touch(7, TouchPhase::Started, 400.0, 300.0, &mut vp);
        let result = input.on_touch(7, TouchPhase::Moved, 320.0, 300.0, &mut vp);
        assert!(result.viewport_changed);
        assert!((vp.center - DVec2::new(0.1, 0.0)).length() < EPS);
    }

    #[test]
    fn test_unknown_touch_is_ignored() {
        let (mut input, mut vp) = setup();
        let result = input.on_touch(3, TouchPhase::Moved, 0.0, 0.0, &mut vp);
        assert!(!result.viewport_changed);
    }

    #[test]
    fn test_arrow_keys() {
        let (mut input, mut vp) = setup();
        for _ in 0..5 {
            assert!(input.on_key(KeyCode::ArrowDown, &mut vp).viewport_changed);
        }
        assert_eq!(vp.max_iterations, 95);
        input.on_key(KeyCode::ArrowUp, &mut vp);
        assert_eq!(vp.max_iterations, 96);

        input.on_key(KeyCode::ArrowRight, &mut vp);
        assert!((vp.center.x - KEY_PAN_STEP).abs() < EPS);
        input.on_key(KeyCode::ArrowLeft, &mut vp);
        assert!(vp.center.x.abs() < EPS);
    }

    #[test]
    fn test_command_keys_leave_viewport_alone() {
        let (mut input, mut vp) = setup();
        let reload = input.on_key(KeyCode::KeyR, &mut vp);
        assert!(reload.reload_shaders && !reload.viewport_changed);
        assert!(input.on_key(KeyCode::Escape, &mut vp).exit);
        assert!(input.on_key(KeyCode::Home, &mut vp).reset_view);
        assert!(input.on_key(KeyCode::KeyH, &mut vp).toggle_overlay);
        assert!(input.on_key(KeyCode::F11, &mut vp).toggle_fullscreen);
        assert_eq!(input.on_key(KeyCode::KeyQ, &mut vp), InputResult::default());
        assert_eq!(vp, ViewportState::new(1.0, DVec2::ZERO, 100));
    }

    #[test]
    fn test_resize_ignores_zero_size() {
        let (mut input, mut vp) = setup();
        input.resize(0, 0);
        input.on_cursor_moved(800.0, 600.0, &mut vp);
        assert!((input.cursor_ndc() - DVec2::new(1.0, -1.0)).length() < EPS);
    }
}
