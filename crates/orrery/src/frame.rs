//! Per-frame input handling: turns the input snapshot into camera motion.

use orrery_engine::core::AppControl;
use orrery_engine::input::{InputFrame, InputState, Key};

use crate::camera::{Camera, Movement};

/// Converts absolute cursor positions into look offsets.
///
/// The first position after start-up (or after the cursor left the window)
/// only primes the tracker, so the camera does not jump.
#[derive(Debug, Default, Clone, Copy)]
pub struct CursorTracker {
    last: Option<(f32, f32)>,
}

impl CursorTracker {
    /// Returns `(dx, dy)` with `dy` positive when the cursor moved up.
    pub fn offset(&mut self, pos: Option<(f32, f32)>) -> Option<(f32, f32)> {
        let Some((x, y)) = pos else {
            self.last = None;
            return None;
        };

        let offset = self.last.map(|(lx, ly)| (x - lx, ly - y));
        self.last = Some((x, y));
        offset
    }
}

const MOVEMENT_KEYS: [(Key, Movement); 4] = [
    (Key::W, Movement::Forward),
    (Key::S, Movement::Backward),
    (Key::A, Movement::Left),
    (Key::D, Movement::Right),
];

/// State carried from frame to frame.
#[derive(Debug, Clone)]
pub struct FrameState {
    pub camera: Camera,
    pub elapsed: f32,
    pub cursor: CursorTracker,
    /// While grabbed the cursor is pinned, so look follows raw mouse motion
    /// instead of cursor positions.
    pub cursor_grabbed: bool,
}

impl FrameState {
    pub fn new(camera: Camera, cursor_grabbed: bool) -> Self {
        Self {
            camera,
            elapsed: 0.0,
            cursor: CursorTracker::default(),
            cursor_grabbed,
        }
    }

    /// Applies one frame of input. Returns `Exit` when Escape was pressed.
    ///
    /// A focus change in `frame` sets the grab state before look is applied.
    pub fn apply_input(
        &mut self,
        input: &InputState,
        frame: &InputFrame,
        dt: f32,
        elapsed: f32,
    ) -> AppControl {
        self.elapsed = elapsed;

        if frame.pressed.contains(&Key::Escape) {
            return AppControl::Exit;
        }

        for (key, movement) in MOVEMENT_KEYS {
            if input.is_held(key) {
                self.camera.process_movement(movement, dt);
            }
        }

        if let Some(focused) = frame.focus {
            self.cursor_grabbed = focused;
        }

        if self.cursor_grabbed {
            self.cursor = CursorTracker::default();
            let (dx, dy) = frame.pointer_delta;
            if dx != 0.0 || dy != 0.0 {
                self.camera.process_look(dx, -dy);
            }
        } else if (frame.pointer_moved || input.pointer.is_none())
            && let Some((dx, dy)) = self.cursor.offset(input.pointer)
        {
            self.camera.process_look(dx, dy);
        }

        if frame.scroll_lines != 0.0 {
            self.camera.process_zoom(frame.scroll_lines);
        }

        AppControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use orrery_engine::input::InputEvent;

    fn feed(state: &mut InputState, frame: &mut InputFrame, ev: InputEvent) {
        state.apply(frame, ev);
    }

    fn press(key: Key) -> InputEvent {
        InputEvent::Key { key, pressed: true }
    }

    fn move_to(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved { x, y }
    }

    // ── cursor ────────────────────────────────────────────────────────────

    #[test]
    fn first_cursor_position_is_suppressed() {
        let mut tracker = CursorTracker::default();
        assert_eq!(tracker.offset(Some((100.0, 100.0))), None);
        assert_eq!(tracker.offset(Some((110.0, 90.0))), Some((10.0, 10.0)));
    }

    #[test]
    fn leaving_the_window_rearms_suppression() {
        let mut tracker = CursorTracker::default();
        tracker.offset(Some((0.0, 0.0)));
        assert_eq!(tracker.offset(None), None);
        assert_eq!(tracker.offset(Some((500.0, 500.0))), None);
    }

    // ── frame ─────────────────────────────────────────────────────────────

    #[test]
    fn escape_requests_exit() {
        let mut fs = FrameState::new(Camera::default(), false);
        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        feed(&mut input, &mut frame, press(Key::Escape));
        assert_eq!(fs.apply_input(&input, &frame, 0.016, 1.0), AppControl::Exit);
    }

    #[test]
    fn held_w_moves_forward_each_frame() {
        let mut fs = FrameState::new(Camera::default(), false);
        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        feed(&mut input, &mut frame, press(Key::W));

        fs.apply_input(&input, &frame, 1.0, 1.0);
        frame.clear();
        fs.apply_input(&input, &frame, 1.0, 2.0);
        assert!(fs.camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 50.0), 1e-4));
        assert_eq!(fs.elapsed, 2.0);
    }

    #[test]
    fn latest_cursor_position_drives_look() {
        let mut fs = FrameState::new(Camera::default(), false);
        let mut input = InputState::default();
        let mut frame = InputFrame::default();

        feed(&mut input, &mut frame, move_to(400.0, 300.0));
        fs.apply_input(&input, &frame, 0.016, 0.0);
        assert_eq!(fs.camera.yaw(), -90.0);

        frame.clear();
        feed(&mut input, &mut frame, move_to(410.0, 300.0));
        feed(&mut input, &mut frame, move_to(450.0, 280.0));
        fs.apply_input(&input, &frame, 0.016, 0.0);
        assert!((fs.camera.yaw() - (-85.0)).abs() < 1e-4);
        assert!((fs.camera.pitch() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn grabbed_cursor_looks_with_raw_motion() {
        let mut fs = FrameState::new(Camera::default(), true);
        let mut input = InputState::default();
        let mut frame = InputFrame::default();

        feed(&mut input, &mut frame, InputEvent::PointerDelta { dx: 30.0, dy: -10.0 });
        feed(&mut input, &mut frame, InputEvent::PointerDelta { dx: 20.0, dy: -10.0 });
        fs.apply_input(&input, &frame, 0.016, 0.0);
        assert!((fs.camera.yaw() - (-85.0)).abs() < 1e-4);
        assert!((fs.camera.pitch() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn grabbed_cursor_ignores_absolute_positions() {
        let mut fs = FrameState::new(Camera::default(), true);
        let mut input = InputState::default();
        let mut frame = InputFrame::default();

        feed(&mut input, &mut frame, move_to(400.0, 300.0));
        fs.apply_input(&input, &frame, 0.016, 0.0);
        frame.clear();
        feed(&mut input, &mut frame, move_to(500.0, 300.0));
        fs.apply_input(&input, &frame, 0.016, 0.0);
        assert_eq!(fs.camera.yaw(), -90.0);
    }

    #[test]
    fn focus_loss_switches_to_cursor_positions() {
        let mut fs = FrameState::new(Camera::default(), true);
        let mut input = InputState::default();
        let mut frame = InputFrame::default();

        feed(&mut input, &mut frame, InputEvent::Focused(false));
        fs.apply_input(&input, &frame, 0.016, 0.0);
        assert!(!fs.cursor_grabbed);

        frame.clear();
        feed(&mut input, &mut frame, InputEvent::Focused(true));
        fs.apply_input(&input, &frame, 0.016, 0.0);
        assert!(fs.cursor_grabbed);
    }

    #[test]
    fn wheel_zooms_in() {
        let mut fs = FrameState::new(Camera::default(), false);
        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        feed(&mut input, &mut frame, InputEvent::Wheel { lines: 3.0 });
        fs.apply_input(&input, &frame, 0.016, 0.0);
        assert_eq!(fs.camera.zoom(), 42.0);
    }
}
