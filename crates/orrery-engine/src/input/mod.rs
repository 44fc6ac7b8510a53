//! Input snapshots.
//!
//! The runtime translates winit events into [`InputEvent`]s and folds them into
//! an [`InputState`] (what is held now) and an [`InputFrame`] (what changed
//! since the last frame). The application reads both once per frame.

mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key};
