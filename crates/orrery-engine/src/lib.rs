//! Orrery engine crate.
//!
//! Window loop, input snapshots, frame timing, device/surface management and
//! the instanced mesh rendering building blocks used by the solar system.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
