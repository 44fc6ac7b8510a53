use winit::window::Window;

use crate::device::{Gpu, SurfaceRecovery};
use crate::input::{InputFrame, InputState};
use crate::render::RenderTarget;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Everything `App::on_frame` may touch. `'a` is the callback, `'w` the window borrow.
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    /// Acquires the next image, clears it, hands it to `draw` and presents it.
    ///
    /// Returns `Exit` only when the surface cannot recover.
    pub fn render<F>(&mut self, clear: wgpu::Color, draw: F) -> AppControl
    where
        F: FnOnce(&mut RenderTarget<'_>),
    {
        if self.gpu.viewport().is_empty() {
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let recovery = self.gpu.recover(&err);
                log::debug!("frame {} not acquired ({err}): {recovery:?}", self.time.frame);
                if recovery == SurfaceRecovery::Fatal {
                    log::error!("surface out of memory; exiting");
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, self.gpu.depth().view());
            target.clear(clear);
            draw(&mut target);
        }

        self.window.pre_present_notify();
        self.gpu.present(frame);
        AppControl::Continue
    }
}
