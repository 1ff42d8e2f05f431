//! Pixel buffer → texture cache.
//!
//! Textures are kept per (width, height, format) and reused across frames, so
//! a steady camera feed uploads into the same texture every frame. Uploads go
//! through the queue, which orders them after any draw already submitted.

use std::collections::HashMap;

use thiserror::Error;

use crate::pixel_buffer::PixelBuffer;

/// Maximum number of distinct texture shapes kept alive.
const MAX_CACHED_TEXTURES: usize = 4;

/// Reasons a pixel buffer could not be turned into a texture.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureCacheError {
    #[error("pixel buffer has zero size ({0}x{1})")]
    ZeroSize(u32, u32),

    #[error("pixel buffer {width}x{height} exceeds device limit {max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("pixel buffer is {actual:?}, texture requested as {requested:?}")]
    FormatMismatch {
        actual: wgpu::TextureFormat,
        requested: wgpu::TextureFormat,
    },
}

/// Device-bound cache mapping pixel buffers to sampled textures.
pub struct TextureCache {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: HashMap<(u32, u32, wgpu::TextureFormat), wgpu::Texture>,
}

impl TextureCache {
    /// Creates an empty cache bound to `device`.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            textures: HashMap::new(),
        }
    }

    /// Uploads `buffer` into a cached texture of the requested format.
    pub fn texture_from_pixel_buffer(
        &mut self,
        buffer: &PixelBuffer,
        format: wgpu::TextureFormat,
    ) -> Result<wgpu::Texture, TextureCacheError> {
        let (width, height) = buffer.size();
        if width == 0 || height == 0 {
            return Err(TextureCacheError::ZeroSize(width, height));
        }

        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(TextureCacheError::TooLarge { width, height, max });
        }

        let actual = buffer.format().texture_format();
        if actual != format {
            return Err(TextureCacheError::FormatMismatch {
                actual,
                requested: format,
            });
        }

        let key = (width, height, format);
        if !self.textures.contains_key(&key) && self.textures.len() >= MAX_CACHED_TEXTURES {
            log::debug!("texture cache full; flushing {} entries", self.textures.len());
            self.flush();
        }

        let device = &self.device;
        let texture = self
            .textures
            .entry(key)
            .or_insert_with(|| create_texture(device, width, height, format))
            .clone();

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            buffer.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(buffer.bytes_per_row()),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        Ok(texture)
    }

    /// Drops every cached texture.
    pub fn flush(&mut self) {
        self.textures.clear();
    }

    /// Returns the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

fn create_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Pixel Buffer Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}
