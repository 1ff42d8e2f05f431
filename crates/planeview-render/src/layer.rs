//! Presentation layers and their drawables.
//!
//! A layer hands out drawables from a bounded pool. The renderer acquires one
//! drawable per frame, renders into its texture, and presents it; if the pool
//! is exhausted the frame is dropped rather than waited for.

use std::sync::{Arc, Mutex};

use crate::buffer::{aligned_bytes_per_row, create_readback_buffer};
use crate::error::{RenderError, RenderResult};
use crate::gpu::GpuContext;
use crate::COLOR_FORMAT;

/// A render target acquired from a layer for a single frame.
pub trait Drawable {
    /// The texture to render into; always [`COLOR_FORMAT`].
    fn texture(&self) -> &wgpu::Texture;

    /// Returns (width, height) of the drawable in pixels.
    fn size(&self) -> (u32, u32) {
        let texture = self.texture();
        (texture.width(), texture.height())
    }

    /// Hands the rendered frame to the layer for display.
    fn present(self);
}

/// A GPU-backed surface that frames are presented to.
pub trait PresentationLayer: Send {
    type Drawable: Drawable;

    /// Returns true once the layer has been bound to a device.
    fn is_device_bound(&self) -> bool;

    /// Binds the layer to the renderer's device.
    fn bind_device(&mut self, gpu: &GpuContext) -> RenderResult<()>;

    /// Returns the requested drawable (width, height).
    fn drawable_size(&self) -> (u32, u32);

    /// Sets the size of drawables handed out from now on.
    fn set_drawable_size(&mut self, width: u32, height: u32);

    /// Acquires the next drawable, or `None` if none is available right now.
    fn next_drawable(&mut self) -> Option<Self::Drawable>;
}

#[derive(Default)]
struct DrawablePool {
    /// Acquired but never presented.
    returned: Vec<wgpu::Texture>,
    /// Presented and not yet recycled, oldest first.
    presented: Vec<wgpu::Texture>,
    presented_total: u64,
}

/// Headless layer rendering into a fixed pool of textures.
///
/// Presented drawables stay in flight until [`OffscreenLayer::recycle`] is
/// called, the way a compositor holds on to frames it is displaying.
pub struct OffscreenLayer {
    capacity: usize,
    drawable_size: (u32, u32),
    gpu: Option<(wgpu::Device, wgpu::Queue)>,
    max_dimension: u32,
    free: Vec<wgpu::Texture>,
    allocated: usize,
    pool: Arc<Mutex<DrawablePool>>,
}

impl OffscreenLayer {
    /// Creates a layer with room for `capacity` drawables in flight.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            drawable_size: (0, 0),
            gpu: None,
            max_dimension: 0,
            free: Vec::new(),
            allocated: 0,
            pool: Arc::new(Mutex::new(DrawablePool::default())),
        }
    }

    /// Returns the total number of frames presented.
    pub fn presented_count(&self) -> u64 {
        self.lock_pool().presented_total
    }

    /// Returns the number of presented frames still held.
    pub fn in_flight_count(&self) -> usize {
        self.lock_pool().presented.len()
    }

    /// Returns every presented drawable to the pool.
    pub fn recycle(&mut self) {
        let presented = std::mem::take(&mut self.lock_pool().presented);
        self.free.extend(presented);
    }

    /// Copies the most recently presented frame into tightly packed BGRA8 rows.
    ///
    /// Returns `None` when nothing has been presented since the last recycle.
    pub fn read_back_latest(&self) -> RenderResult<Option<Vec<u8>>> {
        let Some(texture) = self.lock_pool().presented.last().cloned() else {
            return Ok(None);
        };
        let Some((device, queue)) = &self.gpu else {
            return Ok(None);
        };

        let (width, height) = (texture.width(), texture.height());
        let bytes_per_row = aligned_bytes_per_row(width);
        let buffer = create_readback_buffer(device, width, height);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offscreen readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|_| RenderError::BufferMapFailed)?;
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        // Copy data, removing row padding
        let data = buffer_slice.get_mapped_range();
        let row_bytes = (width * 4) as usize;
        let mut result = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height {
            let start = (row * bytes_per_row) as usize;
            result.extend_from_slice(&data[start..start + row_bytes]);
        }
        drop(data);
        buffer.unmap();

        Ok(Some(result))
    }

    fn lock_pool(&self) -> std::sync::MutexGuard<'_, DrawablePool> {
        self.pool.lock().expect("drawable pool lock poisoned")
    }

    fn create_drawable_texture(&self, device: &wgpu::Device) -> wgpu::Texture {
        let (width, height) = self.drawable_size;
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Drawable"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }
}

impl PresentationLayer for OffscreenLayer {
    type Drawable = OffscreenDrawable;

    fn is_device_bound(&self) -> bool {
        self.gpu.is_some()
    }

    fn bind_device(&mut self, gpu: &GpuContext) -> RenderResult<()> {
        self.gpu = Some((gpu.device.clone(), gpu.queue.clone()));
        self.max_dimension = gpu.max_texture_dimension();
        self.free.clear();
        self.allocated = 0;
        Ok(())
    }

    fn drawable_size(&self) -> (u32, u32) {
        self.drawable_size
    }

    fn set_drawable_size(&mut self, width: u32, height: u32) {
        self.drawable_size = (width, height);
    }

    fn next_drawable(&mut self) -> Option<OffscreenDrawable> {
        let (width, height) = self.drawable_size;
        if width == 0 || height == 0 {
            return None;
        }
        let device = self.gpu.as_ref().map(|(device, _)| device.clone())?;
        if width > self.max_dimension || height > self.max_dimension {
            return None;
        }

        let returned = std::mem::take(&mut self.lock_pool().returned);
        self.free.extend(returned);

        // Drawables of a stale size are retired instead of reused.
        let before = self.free.len();
        self.free
            .retain(|t| t.width() == width && t.height() == height);
        self.allocated -= before - self.free.len();

        let texture = if let Some(texture) = self.free.pop() {
            texture
        } else if self.allocated < self.capacity {
            self.allocated += 1;
            self.create_drawable_texture(&device)
        } else {
            return None;
        };

        Some(OffscreenDrawable {
            texture: Some(texture),
            pool: Arc::clone(&self.pool),
        })
    }
}

/// A drawable from an [`OffscreenLayer`]. Dropping it unpresented returns it
/// to the pool.
pub struct OffscreenDrawable {
    texture: Option<wgpu::Texture>,
    pool: Arc<Mutex<DrawablePool>>,
}

impl Drawable for OffscreenDrawable {
    fn texture(&self) -> &wgpu::Texture {
        self.texture
            .as_ref()
            .expect("offscreen drawable used after present")
    }

    fn present(mut self) {
        if let Some(texture) = self.texture.take() {
            let mut pool = self.pool.lock().expect("drawable pool lock poisoned");
            pool.presented.push(texture);
            pool.presented_total += 1;
        }
    }
}

impl Drop for OffscreenDrawable {
    fn drop(&mut self) {
        if let Some(texture) = self.texture.take() {
            if let Ok(mut pool) = self.pool.lock() {
                pool.returned.push(texture);
            }
        }
    }
}
