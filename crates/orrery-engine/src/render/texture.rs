//! Diffuse textures: CPU decoding plus the GPU texture/view/sampler triple.

use std::path::Path;

use anyhow::{Context, Result};

/// Tightly packed RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRgba {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageRgba {
    /// 1x1 image of a single color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    /// Decodes an image file with the `image` crate.
    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to decode image {}", path.display()))?;
        let rgba = img.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Converts glTF image data to RGBA8.
    ///
    /// Returns `None` for 16-bit and float formats.
    pub fn from_gltf(data: &gltf::image::Data) -> Option<Self> {
        use gltf::image::Format;

        let pixels = match data.format {
            Format::R8G8B8A8 => data.pixels.clone(),
            Format::R8G8B8 => data
                .pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            Format::R8G8 => data
                .pixels
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            Format::R8 => data.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
            other => {
                log::debug!("unsupported glTF image format {other:?}");
                return None;
            }
        };

        let image = Self {
            width: data.width,
            height: data.height,
            pixels,
        };
        image.is_consistent().then_some(image)
    }

    fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() as u64 == self.width as u64 * self.height as u64 * 4
    }

    fn fits(&self, max_dimension: u32) -> bool {
        self.width <= max_dimension && self.height <= max_dimension
    }
}

const PLACEHOLDER: [u8; 4] = [255, 0, 255, 255];

/// GPU diffuse texture with its view and sampler.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Uploads `image`; an inconsistent image, or one larger than the device's
    /// 2D texture limit, is replaced by a 1x1 magenta texel.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &ImageRgba,
    ) -> Self {
        let fallback;
        let max_dimension = device.limits().max_texture_dimension_2d;
        let image = if !image.is_consistent() {
            log::warn!("texture '{label}' has mismatched dimensions; using placeholder");
            fallback = ImageRgba::solid(PLACEHOLDER);
            &fallback
        } else if !image.fits(max_dimension) {
            log::warn!(
                "texture '{label}' is {}x{}, device limit is {max_dimension}; using placeholder",
                image.width,
                image.height
            );
            fallback = ImageRgba::solid(PLACEHOLDER);
            &fallback
        } else {
            image
        };

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}
