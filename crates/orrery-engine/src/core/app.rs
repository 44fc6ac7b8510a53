use anyhow::Result;

use crate::device::Gpu;

use super::ctx::FrameCtx;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

pub trait App {
    /// Runs once the GPU exists, before the first frame. An error aborts startup.
    fn on_start(&mut self, gpu: &Gpu<'_>) -> Result<()>;

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
