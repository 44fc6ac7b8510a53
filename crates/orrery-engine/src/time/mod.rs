//! Frame timing.
//!
//! Animation reads [`FrameTime::elapsed`]; camera motion integrates over
//! [`FrameTime::dt`].

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
