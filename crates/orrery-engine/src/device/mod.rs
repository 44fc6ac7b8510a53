//! wgpu device, window surface and depth buffer.

mod context;
mod depth;
mod init;
mod surface;

pub use context::Gpu;
pub use depth::{DEPTH_FORMAT, DepthTarget};
pub use init::GpuInit;
pub use surface::{Frame, SurfaceRecovery};
