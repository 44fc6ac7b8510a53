use anyhow::{Context, Result};
use winit::window::Window;

use super::surface::SurfaceState;
use super::{DepthTarget, Frame, GpuInit, SurfaceRecovery};
use crate::render::Viewport;

/// Device, queue, window surface and the depth buffer that goes with it.
///
/// Borrows the window for `'w`; the runtime keeps both in one self-referencing
/// entry.
pub struct Gpu<'w> {
    _instance: wgpu::Instance,
    surface: SurfaceState<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    depth: DepthTarget,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;

        let info = adapter.get_info();
        log::info!("adapter '{}' ({:?}, {:?})", info.name, info.backend, info.device_type);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("orrery device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device")?;
        log::debug!("max buffer size {} bytes", device.limits().max_buffer_size);

        let surface = SurfaceState::configure(surface, &adapter, &device, size, &init)?;
        let depth = DepthTarget::new(&device, size);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            depth,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface.format()
    }

    pub fn viewport(&self) -> Viewport {
        self.surface.size().into()
    }

    pub fn depth(&self) -> &DepthTarget {
        &self.depth
    }

    /// Follows a window resize with the surface and the depth buffer.
    pub fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if self.surface.resize(&self.device, size) {
            self.depth.resize(&self.device, size);
        }
    }

    pub fn begin_frame(&self) -> Result<Frame, wgpu::SurfaceError> {
        self.surface.acquire(&self.device)
    }

    pub fn present(&self, frame: Frame) {
        frame.present(&self.queue);
    }

    pub fn recover(&self, err: &wgpu::SurfaceError) -> SurfaceRecovery {
        self.surface.recover(&self.device, err)
    }
}
