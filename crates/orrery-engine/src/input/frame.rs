use super::types::Key;

/// Changes since the previous frame. Cleared by the runtime after each frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputFrame {
    /// Keys that went down this frame, in order, without repeats.
    pub pressed: Vec<Key>,
    pub scroll_lines: f32,
    pub pointer_moved: bool,
    /// Sum of raw mouse motion this frame, `dy` positive downward.
    pub pointer_delta: (f32, f32),
    /// Last focus change this frame, if any.
    pub focus: Option<bool>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.pressed.clear();
        self.scroll_lines = 0.0;
        self.pointer_moved = false;
        self.pointer_delta = (0.0, 0.0);
        self.focus = None;
    }
}
