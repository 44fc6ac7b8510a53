//! winit event loop, window and per-window session.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
