use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key};

#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub focused: bool,
    /// Latest cursor position; `None` while the cursor is outside the window.
    pub pointer: Option<(f32, f32)>,
    held: HashSet<Key>,
}

impl InputState {
    /// Folds one event into the held state and records the change in `frame`.
    pub fn apply(&mut self, frame: &mut InputFrame, event: InputEvent) {
        match event {
            InputEvent::Key { key, pressed: true } => {
                if self.held.insert(key) {
                    frame.pressed.push(key);
                }
            }
            InputEvent::Key { key, pressed: false } => {
                self.held.remove(&key);
            }
            InputEvent::PointerMoved { x, y } => {
                self.pointer = Some((x, y));
                frame.pointer_moved = true;
            }
            InputEvent::PointerDelta { dx, dy } => {
                frame.pointer_delta.0 += dx;
                frame.pointer_delta.1 += dy;
            }
            InputEvent::PointerLeft => self.pointer = None,
            InputEvent::Wheel { lines } => frame.scroll_lines += lines,
            InputEvent::Focused(focused) => {
                self.focused = focused;
                frame.focus = Some(focused);
                // Releases are not delivered while unfocused.
                if !focused {
                    self.held.clear();
                }
            }
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}
