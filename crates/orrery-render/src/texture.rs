//! Texture decode, upload, and caching.
//!
//! Asset names from the scene graph are resolved against an assets
//! directory. A missing or undecodable image is not an error surface: the
//! failure is logged and the material falls back to a flat placeholder, so
//! a body with no texture still renders.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use orrery_scene::TextureRef;

/// Flat mid-gray used when an asset cannot be resolved.
pub const PLACEHOLDER_COLOR: [u8; 4] = [128, 128, 128, 255];

/// Errors from texture decode and upload.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Failed to read the image file.
    #[error("failed to read texture file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to decode the image bytes.
    #[error("failed to decode texture: {0}")]
    Decode(#[from] image::ImageError),
}

/// A GPU texture with its view and a ready-to-bind bind group.
pub struct BoundTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
}

/// Decode image bytes into tightly packed RGBA8 pixels.
pub fn decode_rgba(bytes: &[u8]) -> Result<(Vec<u8>, u32, u32), TextureError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((rgba.into_raw(), width, height))
}

/// Owns the texture bind group layout, sampler, and a name-keyed cache.
pub struct TextureLibrary {
    cache: HashMap<String, Arc<BoundTexture>>,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl TextureLibrary {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture-bind-group-layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        Self {
            cache: HashMap::new(),
            bind_group_layout,
            sampler,
        }
    }

    /// The bind group layout every [`BoundTexture`] bind group uses (group 1
    /// in the scene pipeline).
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Resolve an asset name to a bound texture, loading it from
    /// `assets_dir` on first use.
    ///
    /// Failure to read or decode logs a warning and caches a flat
    /// placeholder under the same name, so the lookup is not retried every
    /// frame.
    pub fn resolve(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        assets_dir: &Path,
        texture: &TextureRef,
    ) -> Arc<BoundTexture> {
        if let Some(found) = self.cache.get(texture.name()) {
            return found.clone();
        }

        let loaded = std::fs::read(assets_dir.join(texture.name()))
            .map_err(TextureError::from)
            .and_then(|bytes| decode_rgba(&bytes));

        let bound = match loaded {
            Ok((pixels, width, height)) => {
                log::debug!("Loaded texture {} ({width}x{height})", texture.name());
                Arc::new(self.upload(device, queue, texture.name(), &pixels, width, height))
            }
            Err(e) => {
                log::warn!(
                    "Texture {} unavailable, using placeholder: {e}",
                    texture.name()
                );
                Arc::new(self.upload(
                    device,
                    queue,
                    texture.name(),
                    &PLACEHOLDER_COLOR,
                    1,
                    1,
                ))
            }
        };

        self.cache.insert(texture.name().to_string(), bound.clone());
        bound
    }

    /// Upload RGBA8 pixels as an sRGB texture so sampling is gamma-correct.
    fn upload(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> BoundTexture {
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
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        BoundTexture {
            texture,
            view,
            bind_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_valid_png() {
        let (pixels, width, height) = decode_rgba(&tiny_png()).unwrap();
        assert_eq!((width, height), (2, 2));
        assert_eq!(pixels.len(), 16);
        assert_eq!(&pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_rgba(b"definitely not an image");
        assert!(matches!(result, Err(TextureError::Decode(_))));
    }

    #[test]
    fn test_decode_empty_fails() {
        assert!(decode_rgba(&[]).is_err());
    }
}
