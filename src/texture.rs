//! # Cube Texture
//!
//! Source image of the cube texture and its `wgpu` counterpart.
//!
//! The image is either a PNG picked through [`crate::SampleConfig::texture_path`] or a procedural
//! 256×256 emblem (a framed checkerboard with a diagonal band) generated with `image`, so the
//! sample runs without shipping binary assets.

use std::path::Path;

use crate::error::RenderError;

/// Side length of the generated texture, in pixels.
pub const PROCEDURAL_SIZE: u32 = 256;

/// Loads the image at `path`, or generates the procedural texture when `path` is `None`.
pub fn load_cube_image(path: Option<&Path>) -> Result<image::RgbaImage, RenderError> {
    match path {
        Some(path) => {
            log::info!("Loading cube texture from {}", path.display());
            Ok(image::open(path)?.to_rgba8())
        }
        None => Ok(procedural_image(PROCEDURAL_SIZE)),
    }
}

/// Framed 8×8 checkerboard with a diagonal band, `size`×`size` pixels.
pub fn procedural_image(size: u32) -> image::RgbaImage {
    let cell = (size / 8).max(1);
    let border = (size / 32).max(1);
    image::RgbaImage::from_fn(size, size, |x, y| {
        let on_border = x < border || y < border || x >= size - border || y >= size - border;
        let on_band = x.abs_diff(y) < cell / 2;
        if on_border {
            image::Rgba([240, 240, 240, 255])
        } else if on_band {
            image::Rgba([230, 120, 30, 255])
        } else if (x / cell + y / cell) % 2 == 0 {
            image::Rgba([40, 90, 170, 255])
        } else {
            image::Rgba([20, 40, 80, 255])
        }
    })
}

/// A sampled texture and the sampler it is read with.
pub struct WgpuTexture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl WgpuTexture {
    /// Uploads `image` as an `Rgba8UnormSrgb` texture.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &image::RgbaImage,
    ) -> Self {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Cube Texture Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
        }
    }
}
