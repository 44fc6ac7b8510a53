/// Keys the application reacts to. Everything else maps to `Other`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    W,
    A,
    S,
    D,
    Other,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, pressed: bool },
    /// Cursor position in logical pixels, origin top-left.
    PointerMoved { x: f32, y: f32 },
    /// Raw relative mouse motion, unaffected by cursor grab or window edges.
    /// `dy` is positive downward.
    PointerDelta { dx: f32, dy: f32 },
    PointerLeft,
    /// Vertical wheel motion in lines, positive away from the user.
    Wheel { lines: f32 },
    Focused(bool),
}
