//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources (pipelines, buffers, bind groups).
//!
//! Convention:
//! - right-handed world space, +Y up
//! - matrices are `glam::Mat4` (column-major), uploaded as-is
//! - mesh vertex attributes occupy shader locations 0..=2; per-instance
//!   transforms occupy 3..=6

pub mod geometry;
pub mod instance;
pub mod mesh;
pub mod program;
mod target;
pub mod texture;
mod viewport;

pub use target::RenderTarget;
pub use viewport::Viewport;
