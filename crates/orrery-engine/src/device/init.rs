/// Device and surface preferences.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB swapchain format when one exists. Diffuse textures are
    /// uploaded as sRGB, so a linear target would wash them out.
    pub prefer_srgb: bool,
    pub present_mode: wgpu::PresentMode,
    pub power_preference: wgpu::PowerPreference,
    /// `max_buffer_size` caps every instance buffer.
    pub limits: wgpu::Limits,
    /// Frames the CPU may queue ahead of presentation. A hint only.
    pub frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            power_preference: wgpu::PowerPreference::HighPerformance,
            limits: wgpu::Limits::default(),
            frame_latency: 2,
        }
    }
}
