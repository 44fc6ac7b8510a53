use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::{translate_device_event, translate_window_event};
use crate::input::{InputFrame, InputState};
use crate::time::FrameClock;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub size: LogicalSize<f64>,
    /// Hide and confine the cursor for free-look.
    pub grab_cursor: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "orrery".to_string(),
            size: LogicalSize::new(800.0, 600.0),
            grab_cursor: true,
        }
    }
}

/// Requests an app makes during a frame; applied once the frame returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    cursor_grab: Option<bool>,
    exit: bool,
}

impl RuntimeCtx {
    pub fn set_cursor_grab(&mut self, grab: bool) {
        self.cursor_grab = Some(grab);
    }

    pub fn exit(&mut self) {
        self.exit = true;
    }
}

pub struct Runtime;

impl Runtime {
    /// Blocks until the window closes or the app exits. Startup failures
    /// (window, GPU, `App::on_start`) are returned.
    pub fn run<A: App + 'static>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let mut host = Host {
            config,
            gpu_init,
            app,
            session: None,
            exiting: false,
            startup_error: None,
        };
        event_loop.run_app(&mut host).context("event loop failed")?;

        host.startup_error.map_or(Ok(()), Err)
    }
}

#[self_referencing]
struct Session {
    input: InputState,
    input_frame: InputFrame,
    clock: FrameClock,
    window: Window,
    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct Host<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    session: Option<Session>,
    exiting: bool,
    startup_error: Option<anyhow::Error>,
}

impl<A: App> Host<A> {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.size);
        let window = event_loop.create_window(attrs).context("failed to create window")?;
        if self.config.grab_cursor {
            grab_cursor(&window, true);
        }

        let gpu_init = self.gpu_init.clone();
        let session = SessionTryBuilder {
            input: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::new(),
            window,
            gpu_builder: |window| pollster::block_on(Gpu::new(window, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        self.app
            .on_start(session.borrow_gpu())
            .context("application startup failed")?;

        session.borrow_window().request_redraw();
        self.session = Some(session);
        Ok(())
    }

    fn redraw(&mut self) -> RuntimeCtx {
        let mut runtime = RuntimeCtx::default();
        let Some(session) = self.session.as_mut() else {
            return runtime;
        };

        let app = &mut self.app;
        session.with_mut(|s| {
            let mut ctx = FrameCtx {
                window: s.window,
                gpu: s.gpu,
                input: s.input,
                input_frame: s.input_frame,
                time: s.clock.tick(),
                runtime: &mut runtime,
            };
            if app.on_frame(&mut ctx) == AppControl::Exit {
                ctx.runtime.exit();
            }
            s.input_frame.clear();
        });
        runtime
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, runtime: RuntimeCtx) {
        if let (Some(grab), Some(session)) = (runtime.cursor_grab, self.session.as_ref()) {
            grab_cursor(session.borrow_window(), grab);
        }
        if runtime.exit {
            self.exit(event_loop);
        }
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exiting = true;
        event_loop.exit();
    }
}

impl<A: App> ApplicationHandler for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() || self.exiting {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            log::error!("startup failed: {e:#}");
            self.startup_error = Some(e);
            self.exit(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.with_mut(|s| {
            if let Some(input) = translate_window_event(s.window.scale_factor(), &event) {
                s.input.apply(s.input_frame, input);
            }
        });

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.session = None;
                self.exit(event_loop);
            }
            WindowEvent::Resized(size) => {
                session.with_gpu_mut(|gpu| gpu.resize(size));
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = session.borrow_window().inner_size();
                session.with_gpu_mut(|gpu| gpu.resize(size));
            }
            WindowEvent::RedrawRequested => {
                let runtime = self.redraw();
                self.apply(event_loop, runtime);
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device: DeviceId, event: DeviceEvent) {
        let (Some(session), Some(input)) = (self.session.as_mut(), translate_device_event(&event)) else {
            return;
        };
        session.with_mut(|s| s.input.apply(s.input_frame, input));
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exiting {
            return;
        }
        // Redraw continuously; FIFO presentation paces the loop.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(session) = self.session.as_ref() {
            session.borrow_window().request_redraw();
        }
    }
}

fn grab_cursor(window: &Window, grab: bool) {
    if !grab {
        if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("failed to release cursor: {e}");
        }
        window.set_cursor_visible(true);
        return;
    }

    // macOS has no Confined mode.
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
    match grabbed {
        Ok(()) => window.set_cursor_visible(false),
        Err(e) => log::warn!("cursor grab unavailable: {e}"),
    }
}
