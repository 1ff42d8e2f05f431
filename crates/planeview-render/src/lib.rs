//! Pixel-buffer present pipeline for planeview.
//!
//! This crate draws camera pixel buffers onto presentation layers with wgpu:
//! - [`FrameRenderer`], a serialized renderer running on its own thread
//! - [`TextureCache`] turning pixel buffers into sampled textures
//! - [`PresentationLayer`] implementations for windows and offscreen targets
//! - the aspect-fill quad math in [`aspect`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod aspect;
pub mod buffer;
pub mod error;
pub mod gpu;
pub mod layer;
pub mod pixel_buffer;
pub mod renderer;
pub mod shader;
pub mod surface_layer;
pub mod texture_cache;

pub use aspect::{aspect_fill_scales, quad_positions, QUAD_TEX_COORDS};
pub use error::{RenderError, RenderResult};
pub use gpu::{GpuContext, PowerPreference};
pub use layer::{Drawable, OffscreenDrawable, OffscreenLayer, PresentationLayer};
pub use pixel_buffer::{PixelBuffer, PixelFormat};
pub use renderer::{DropReason, FrameOutcome, FrameRenderer, FrameStats, RendererOptions};
pub use shader::{ShaderFunction, ShaderLibrary, FRAGMENT_FUNCTION, VERTEX_FUNCTION};
pub use surface_layer::{SurfaceDrawable, SurfaceLayer};
pub use texture_cache::{TextureCache, TextureCacheError};

/// Color format of drawables and pixel-buffer textures.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;
