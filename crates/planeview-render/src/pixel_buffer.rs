//! Camera pixel buffers.

use std::sync::Arc;

use crate::error::{RenderError, RenderResult};

/// Memory layout of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit blue, green, red, alpha.
    Bgra8,
    /// 8-bit red, green, blue, alpha.
    Rgba8,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> u32 {
        4
    }

    /// Texture format that samples this layout unchanged.
    pub const fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            PixelFormat::Bgra8 => wgpu::TextureFormat::Bgra8Unorm,
            PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// An immutable frame of pixels. Cloning shares the underlying bytes.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes_per_row: u32,
    format: PixelFormat,
    data: Arc<[u8]>,
}

impl PixelBuffer {
    /// Wraps tightly packed BGRA8 pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> RenderResult<Self> {
        let bytes_per_row = row_bytes(width, PixelFormat::Bgra8)?;
        Self::with_layout(width, height, bytes_per_row, PixelFormat::Bgra8, data)
    }

    /// Wraps pixels with an explicit row pitch and format.
    pub fn with_layout(
        width: u32,
        height: u32,
        bytes_per_row: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> RenderResult<Self> {
        let min_pitch = row_bytes(width, format)?;
        if bytes_per_row < min_pitch {
            return Err(RenderError::InvalidPixelBuffer(format!(
                "row pitch {bytes_per_row} shorter than {min_pitch} bytes of pixels"
            )));
        }
        let required = u64::from(bytes_per_row) * u64::from(height);
        if (data.len() as u64) < required {
            return Err(RenderError::InvalidPixelBuffer(format!(
                "{} bytes supplied, {width}x{height} needs {required}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bytes_per_row,
            format,
            data: data.into(),
        })
    }

    /// Fills a BGRA8 buffer with one color.
    pub fn solid(width: u32, height: u32, bgra: [u8; 4]) -> RenderResult<Self> {
        let bytes_per_row = row_bytes(width, PixelFormat::Bgra8)?;
        let pixels = u64::from(width) * u64::from(height);
        let pixels = usize::try_from(pixels).map_err(|_| {
            RenderError::InvalidPixelBuffer(format!("{width}x{height} does not fit in memory"))
        })?;
        Self::with_layout(
            width,
            height,
            bytes_per_row,
            PixelFormat::Bgra8,
            bgra.repeat(pixels),
        )
    }

    /// Converts an RGBA image to a BGRA8 buffer.
    pub fn from_rgba_image(image: &image::RgbaImage) -> Self {
        let mut data = image.as_raw().clone();
        for chunk in data.chunks_exact_mut(4) {
            chunk.swap(0, 2);
        }
        Self {
            width: image.width(),
            height: image.height(),
            bytes_per_row: image.width() * 4,
            format: PixelFormat::Bgra8,
            data: data.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.bytes_per_row
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

fn row_bytes(width: u32, format: PixelFormat) -> RenderResult<u32> {
    width
        .checked_mul(format.bytes_per_pixel())
        .ok_or_else(|| RenderError::InvalidPixelBuffer(format!("width {width} overflows")))
}
