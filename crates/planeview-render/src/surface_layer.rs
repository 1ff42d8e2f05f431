//! Window-backed presentation layer.

use crate::error::{RenderError, RenderResult};
use crate::gpu::GpuContext;
use crate::layer::{Drawable, PresentationLayer};
use crate::COLOR_FORMAT;

/// Presents frames to a window surface.
///
/// The surface is created from the renderer's own GPU instance when the layer
/// is first bound, so the window handle is held until then.
pub struct SurfaceLayer {
    target: Option<wgpu::SurfaceTarget<'static>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    config: Option<wgpu::SurfaceConfiguration>,
    max_dimension: u32,
    drawable_size: (u32, u32),
}

impl SurfaceLayer {
    /// Creates an unbound layer for a window (or any other surface target).
    pub fn new(target: impl Into<wgpu::SurfaceTarget<'static>>) -> Self {
        Self {
            target: Some(target.into()),
            surface: None,
            device: None,
            config: None,
            max_dimension: 0,
            drawable_size: (0, 0),
        }
    }

    /// Returns true if the device can create drawables of the requested size.
    fn size_supported(&self) -> bool {
        let (width, height) = self.drawable_size;
        width > 0 && height > 0 && width <= self.max_dimension && height <= self.max_dimension
    }

    fn reconfigure(&mut self) {
        if !self.size_supported() {
            return;
        }
        let (width, height) = self.drawable_size;
        if let (Some(surface), Some(device), Some(config)) =
            (&self.surface, &self.device, &mut self.config)
        {
            config.width = width;
            config.height = height;
            surface.configure(device, config);
        }
    }
}

impl PresentationLayer for SurfaceLayer {
    type Drawable = SurfaceDrawable;

    fn is_device_bound(&self) -> bool {
        self.device.is_some()
    }

    fn bind_device(&mut self, gpu: &GpuContext) -> RenderResult<()> {
        let target = self.target.take().ok_or_else(|| {
            RenderError::SurfaceConfigurationFailed("surface target already consumed".into())
        })?;
        let surface = gpu.instance.create_surface(target)?;

        let caps = surface.get_capabilities(&gpu.adapter);
        if !caps.formats.contains(&COLOR_FORMAT) {
            return Err(RenderError::SurfaceConfigurationFailed(format!(
                "{COLOR_FORMAT:?} not supported, surface offers {:?}",
                caps.formats
            )));
        }

        let max_dimension = gpu.max_texture_dimension();
        let (width, height) = self.drawable_size;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: COLOR_FORMAT,
            width: width.clamp(1, max_dimension),
            height: height.clamp(1, max_dimension),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);

        self.surface = Some(surface);
        self.device = Some(gpu.device.clone());
        self.config = Some(config);
        self.max_dimension = max_dimension;
        Ok(())
    }

    fn drawable_size(&self) -> (u32, u32) {
        self.drawable_size
    }

    fn set_drawable_size(&mut self, width: u32, height: u32) {
        self.drawable_size = (width, height);
    }

    fn next_drawable(&mut self) -> Option<SurfaceDrawable> {
        if self.surface.is_none() || !self.size_supported() {
            return None;
        }
        let (width, height) = self.drawable_size;
        if self
            .config
            .as_ref()
            .is_some_and(|c| (c.width, c.height) != (width, height))
        {
            self.reconfigure();
        }

        match self.surface.as_ref()?.get_current_texture() {
            Ok(frame) => Some(SurfaceDrawable { frame }),
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                self.reconfigure();
                None
            }
            Err(e) => {
                log::debug!("surface texture unavailable: {e}");
                None
            }
        }
    }
}

/// A frame of a window surface.
pub struct SurfaceDrawable {
    frame: wgpu::SurfaceTexture,
}

impl Drawable for SurfaceDrawable {
    fn texture(&self) -> &wgpu::Texture {
        &self.frame.texture
    }

    fn present(self) {
        self.frame.present();
    }
}
