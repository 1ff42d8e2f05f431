//! The serialized pixel-buffer renderer.
//!
//! [`FrameRenderer`] owns a worker thread that holds every GPU object. Draw
//! requests are queued over a channel and processed one at a time in
//! submission order. GPU state is configured on the first draw; a failure
//! there, or a panic on the worker, is fatal and stops the worker, after which
//! every submission reports [`RenderError::RendererTerminated`].

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use pollster::FutureExt;
use serde::{Deserialize, Serialize};

use crate::aspect::{aspect_fill_scales, quad_positions, QUAD_TEX_COORDS};
use crate::buffer::create_vertex_buffer;
use crate::error::{RenderError, RenderResult};
use crate::gpu::{GpuContext, PowerPreference};
use crate::layer::{Drawable, PresentationLayer};
use crate::pixel_buffer::PixelBuffer;
use crate::shader::{ShaderLibrary, FRAGMENT_FUNCTION, VERTEX_FUNCTION};
use crate::texture_cache::TextureCache;
use crate::COLOR_FORMAT;

/// Options for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererOptions {
    /// Color the drawable is cleared to before the image is drawn.
    pub clear_color: [f64; 4],
    pub power_preference: PowerPreference,
    /// Force a software adapter.
    pub force_fallback_adapter: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            clear_color: [1.0, 1.0, 1.0, 1.0],
            power_preference: PowerPreference::Default,
            force_fallback_adapter: false,
        }
    }
}

/// Why a frame was not presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The layer could not be bound to the device.
    LayerUnbound,
    /// The layer's drawable pool was exhausted.
    DrawableUnavailable,
    /// The pixel buffer could not be turned into a texture.
    TextureUnavailable,
}

/// Result of processing one draw request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    Dropped(DropReason),
}

/// Counters shared between the renderer handle and its worker.
#[derive(Debug, Default)]
pub struct FrameStats {
    submitted: AtomicU64,
    presented: AtomicU64,
    dropped: AtomicU64,
    cached_textures: AtomicUsize,
    terminated: AtomicBool,
}

impl FrameStats {
    /// Draw requests accepted into the queue.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Acquire)
    }

    /// Frames presented.
    pub fn presented(&self) -> u64 {
        self.presented.load(Ordering::Acquire)
    }

    /// Frames dropped for any [`DropReason`].
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Acquire)
    }

    /// Pixel-buffer textures the renderer's cache held after the last draw.
    pub fn cached_textures(&self) -> usize {
        self.cached_textures.load(Ordering::Acquire)
    }

    /// Returns true once the worker has stopped after a fatal error.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    fn record(&self, outcome: FrameOutcome) {
        let counter = match outcome {
            FrameOutcome::Presented => &self.presented,
            FrameOutcome::Dropped(_) => &self.dropped,
        };
        counter.fetch_add(1, Ordering::AcqRel);
    }
}

type DrawJob = Box<dyn FnOnce(&mut RenderCore) -> FrameOutcome + Send>;

enum Job {
    Draw(DrawJob),
    Flush(mpsc::Sender<()>),
}

/// Handle to the renderer thread.
pub struct FrameRenderer {
    sender: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    stats: Arc<FrameStats>,
}

impl FrameRenderer {
    /// Starts the renderer thread. GPU setup happens on the first draw.
    pub fn new(options: RendererOptions) -> RenderResult<Self> {
        let (sender, receiver) = mpsc::channel();
        let stats = Arc::new(FrameStats::default());

        let worker_stats = Arc::clone(&stats);
        let worker = std::thread::Builder::new()
            .name("planeview-renderer".into())
            .spawn(move || run_worker(&receiver, &options, &worker_stats))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            stats,
        })
    }

    /// Queues `pixel_buffer` to be drawn onto the next drawable of `layer`.
    ///
    /// Returns as soon as the request is queued. The layer's current drawable
    /// size is used.
    pub fn draw<L>(&self, pixel_buffer: PixelBuffer, layer: &Arc<Mutex<L>>) -> RenderResult<()>
    where
        L: PresentationLayer + 'static,
    {
        self.submit(pixel_buffer, layer, None)
    }

    /// Like [`draw`](Self::draw), but resizes the layer's drawables to
    /// `drawable_size` first.
    ///
    /// The resize happens on the renderer thread, so the caller never waits
    /// on the layer while a drawable is being acquired.
    pub fn draw_sized<L>(
        &self,
        pixel_buffer: PixelBuffer,
        layer: &Arc<Mutex<L>>,
        drawable_size: (u32, u32),
    ) -> RenderResult<()>
    where
        L: PresentationLayer + 'static,
    {
        self.submit(pixel_buffer, layer, Some(drawable_size))
    }

    fn submit<L>(
        &self,
        pixel_buffer: PixelBuffer,
        layer: &Arc<Mutex<L>>,
        drawable_size: Option<(u32, u32)>,
    ) -> RenderResult<()>
    where
        L: PresentationLayer + 'static,
    {
        let layer = Arc::clone(layer);
        let job: DrawJob = Box::new(move |core: &mut RenderCore| {
            core.draw(&pixel_buffer, &layer, drawable_size)
        });

        // Counted before sending so presented + dropped never exceeds submitted.
        self.stats.submitted.fetch_add(1, Ordering::AcqRel);
        self.send(Job::Draw(job)).inspect_err(|_| {
            self.stats.submitted.fetch_sub(1, Ordering::AcqRel);
        })
    }

    /// Blocks until every draw queued before this call has been processed.
    pub fn flush(&self) -> RenderResult<()> {
        let (ack, done) = mpsc::channel();
        self.send(Job::Flush(ack))?;
        done.recv().map_err(|_| RenderError::RendererTerminated)
    }

    /// Returns the frame counters.
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    fn send(&self, job: Job) -> RenderResult<()> {
        self.sender
            .as_ref()
            .ok_or(RenderError::RendererTerminated)?
            .send(job)
            .map_err(|_| RenderError::RendererTerminated)
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish queued draws and exit.
        self.sender = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("renderer thread panicked");
            }
        }
    }
}

/// Marks the renderer terminated if the worker unwinds.
struct PanicGuard<'a>(&'a FrameStats);

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.terminated.store(true, Ordering::Release);
        }
    }
}

fn run_worker(receiver: &mpsc::Receiver<Job>, options: &RendererOptions, stats: &FrameStats) {
    let _guard = PanicGuard(stats);
    let mut core: Option<RenderCore> = None;

    for job in receiver {
        match job {
            Job::Draw(draw) => {
                if core.is_none() {
                    match RenderCore::configure(options) {
                        Ok(configured) => core = Some(configured),
                        Err(e) => {
                            log::error!("renderer configuration failed: {e}");
                            stats.terminated.store(true, Ordering::Release);
                            return;
                        }
                    }
                }
                if let Some(core) = core.as_mut() {
                    stats.record(draw(core));
                    stats
                        .cached_textures
                        .store(core.texture_cache.len(), Ordering::Release);
                }
            }
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// GPU objects owned by the renderer thread.
struct RenderCore {
    gpu: GpuContext,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    texture_cache: TextureCache,
    clear_color: wgpu::Color,
}

impl RenderCore {
    /// One-shot setup: device, pipeline, sampler, and texture cache.
    fn configure(options: &RendererOptions) -> RenderResult<Self> {
        let gpu = GpuContext::new(options.power_preference, options.force_fallback_adapter)?;
        let device = &gpu.device;

        let library = ShaderLibrary::bundled(device)?;
        let vertex = library.make_function(VERTEX_FUNCTION)?;
        let fragment = library.make_function(FRAGMENT_FUNCTION)?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pixel Buffer Bind Group Layout"),
            entries: &[
                // Pixel buffer texture
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
                // Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pixel Buffer Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Pixel Buffer Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: vertex.module,
                entry_point: Some(vertex.entry_point),
                buffers: &[
                    // Slot 0: clip-space positions
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x4],
                    },
                    // Slot 1: texture coordinates
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![1 => Float32x2],
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment.module,
                entry_point: Some(fragment.entry_point),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        if let Some(error) = device.pop_error_scope().block_on() {
            return Err(RenderError::PipelineCreationFailed(error.to_string()));
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Pixel Buffer Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let texture_cache = TextureCache::new(device, &gpu.queue);
        let [r, g, b, a] = options.clear_color;

        Ok(Self {
            pipeline,
            bind_group_layout,
            sampler,
            texture_cache,
            clear_color: wgpu::Color { r, g, b, a },
            gpu,
        })
    }

    fn draw<L: PresentationLayer>(
        &mut self,
        pixel_buffer: &PixelBuffer,
        layer: &Mutex<L>,
        drawable_size: Option<(u32, u32)>,
    ) -> FrameOutcome {
        let drawable = {
            let mut layer = layer.lock().expect("presentation layer lock poisoned");
            if let Some((width, height)) = drawable_size {
                layer.set_drawable_size(width, height);
            }
            if !layer.is_device_bound() {
                if let Err(e) = layer.bind_device(&self.gpu) {
                    log::error!("failed to bind presentation layer: {e}");
                    return FrameOutcome::Dropped(DropReason::LayerUnbound);
                }
            }
            match layer.next_drawable() {
                Some(drawable) => drawable,
                None => {
                    let (width, height) = layer.drawable_size();
                    log::warn!("no drawable available, dropping frame ({width}x{height})");
                    return FrameOutcome::Dropped(DropReason::DrawableUnavailable);
                }
            }
        };

        let texture = match self
            .texture_cache
            .texture_from_pixel_buffer(pixel_buffer, pixel_buffer.format().texture_format())
        {
            Ok(texture) => texture,
            Err(e) => {
                log::debug!("pixel buffer texture unavailable: {e}");
                self.texture_cache.flush();
                return FrameOutcome::Dropped(DropReason::TextureUnavailable);
            }
        };

        let device = &self.gpu.device;
        let scale = aspect_fill_scales(pixel_buffer.size(), drawable.size());
        let position_buffer =
            create_vertex_buffer(device, &quad_positions(scale), Some("Pixel Buffer Positions"));
        let tex_coord_buffer =
            create_vertex_buffer(device, &QUAD_TEX_COORDS, Some("Pixel Buffer Tex Coords"));

        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Pixel Buffer Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let target_view = drawable
            .texture()
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Pixel Buffer Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Pixel Buffer Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_vertex_buffer(0, position_buffer.slice(..));
            render_pass.set_vertex_buffer(1, tex_coord_buffer.slice(..));
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.draw(0..4, 0..1);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        drawable.present();
        FrameOutcome::Presented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_clear_to_white() {
        let options = RendererOptions::default();
        assert_eq!(options.clear_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(options.power_preference, PowerPreference::Default);
        assert!(!options.force_fallback_adapter);
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: RendererOptions =
            serde_json::from_str(r#"{ "force_fallback_adapter": true }"#).unwrap();
        assert!(options.force_fallback_adapter);
        assert_eq!(options.clear_color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_stats_record_outcomes() {
        let stats = FrameStats::default();
        stats.record(FrameOutcome::Presented);
        stats.record(FrameOutcome::Dropped(DropReason::DrawableUnavailable));
        stats.record(FrameOutcome::Dropped(DropReason::TextureUnavailable));
        assert_eq!(stats.presented(), 1);
        assert_eq!(stats.dropped(), 2);
        assert_eq!(stats.submitted(), 0);
        assert!(!stats.is_terminated());
    }

    #[test]
    fn test_dropping_idle_renderer_joins_worker() {
        let renderer = FrameRenderer::new(RendererOptions::default()).unwrap();
        renderer.flush().unwrap();
        drop(renderer);
    }
}
