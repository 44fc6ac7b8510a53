//! Frame orchestration: input → camera → uploads → draw, once per frame.

use anyhow::{Context, Result};
use orrery_engine::core::{App, AppControl, FrameCtx};
use orrery_engine::device::Gpu;

use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::frame::FrameState;
use crate::renderer::SolarRenderer;

pub struct SolarApp {
    scene: SceneConfig,
    state: FrameState,
    renderer: Option<SolarRenderer>,
}

impl SolarApp {
    /// `cursor_grabbed` must match the runtime's initial cursor grab.
    pub fn new(scene: SceneConfig, cursor_grabbed: bool) -> Self {
        let state = FrameState::new(Camera::new(scene.camera), cursor_grabbed);
        Self {
            scene,
            state,
            renderer: None,
        }
    }
}

impl App for SolarApp {
    fn on_start(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let viewport = gpu.viewport();
        log::info!(
            "building scene for {}x{} surface ({:?})",
            viewport.width,
            viewport.height,
            gpu.surface_format()
        );

        let renderer = SolarRenderer::new(gpu.device(), gpu.queue(), gpu.surface_format(), &self.scene)
            .context("failed to build scene")?;
        self.renderer = Some(renderer);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let time = ctx.time;
        if self.state.apply_input(ctx.input, ctx.input_frame, time.dt, time.elapsed) == AppControl::Exit {
            log::info!("escape pressed; exiting");
            return AppControl::Exit;
        }

        // Platforms drop the cursor grab on focus loss; take it back on return.
        if let Some(focused) = ctx.input_frame.focus {
            ctx.runtime.set_cursor_grab(focused);
        }

        let Some(renderer) = self.renderer.as_mut() else {
            return AppControl::Continue;
        };

        let aspect = ctx.gpu.viewport().aspect();
        let prepared = renderer.prepare(
            ctx.gpu.device(),
            ctx.gpu.queue(),
            &self.state.camera,
            aspect,
            self.state.elapsed,
        );
        if let Err(e) = prepared {
            log::error!("frame {} skipped: {e:#}", time.frame);
            return AppControl::Continue;
        }

        let renderer = &*renderer;
        ctx.render(self.scene.clear_color, |target| renderer.draw(target))
    }
}
