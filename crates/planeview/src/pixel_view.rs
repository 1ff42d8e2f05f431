//! A view that presents every pixel buffer assigned to it.

use std::sync::{Arc, Mutex};

use planeview_render::{
    FrameRenderer, PixelBuffer, PresentationLayer, RenderResult, RendererOptions,
};

/// Presents camera frames onto a layer sized to the view's bounds.
///
/// Each [`set_pixel_buffer`](Self::set_pixel_buffer) submits exactly one draw.
/// Submission never blocks on the GPU; frames that find no drawable are
/// dropped by the renderer.
pub struct PixelBufferView<L: PresentationLayer + 'static> {
    renderer: FrameRenderer,
    layer: Arc<Mutex<L>>,
    bounds: (u32, u32),
    pixel_buffer: Option<PixelBuffer>,
}

impl<L: PresentationLayer + 'static> PixelBufferView<L> {
    pub fn new(layer: L, options: RendererOptions) -> RenderResult<Self> {
        let bounds = layer.drawable_size();
        Ok(Self {
            renderer: FrameRenderer::new(options)?,
            layer: Arc::new(Mutex::new(layer)),
            bounds,
            pixel_buffer: None,
        })
    }

    /// Sets the view size in pixels, applied from the next frame.
    pub fn set_bounds(&mut self, width: u32, height: u32) {
        self.bounds = (width, height);
    }

    pub fn bounds(&self) -> (u32, u32) {
        self.bounds
    }

    /// Assigns a new frame and submits it for presentation.
    ///
    /// The layer is resized to the current bounds on the render thread, so
    /// this never waits on the layer lock.
    pub fn set_pixel_buffer(&mut self, pixel_buffer: PixelBuffer) -> RenderResult<()> {
        self.pixel_buffer = Some(pixel_buffer.clone());
        self.renderer
            .draw_sized(pixel_buffer, &self.layer, self.bounds)
    }

    /// The most recently assigned frame.
    pub fn pixel_buffer(&self) -> Option<&PixelBuffer> {
        self.pixel_buffer.as_ref()
    }

    pub fn layer(&self) -> &Arc<Mutex<L>> {
        &self.layer
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planeview_render::OffscreenLayer;

    #[test]
    fn test_bounds_start_from_layer_size() {
        let mut layer = OffscreenLayer::new(1);
        layer.set_drawable_size(40, 30);
        let view = PixelBufferView::new(layer, RendererOptions::default()).unwrap();
        assert_eq!(view.bounds(), (40, 30));
        assert!(view.pixel_buffer().is_none());
    }

    #[test]
    fn test_assignment_submits_one_draw() {
        let mut view =
            PixelBufferView::new(OffscreenLayer::new(1), RendererOptions::default()).unwrap();
        view.set_bounds(16, 9);
        view.set_pixel_buffer(PixelBuffer::solid(4, 4, [0, 0, 0, 255]).unwrap())
            .unwrap();

        assert_eq!(view.pixel_buffer().map(PixelBuffer::size), Some((4, 4)));
        assert_eq!(view.renderer().stats().submitted(), 1);

        // With an adapter the worker applies the bounds before drawing.
        if view.renderer().flush().is_ok() {
            assert_eq!(view.layer().lock().unwrap().drawable_size(), (16, 9));
        }
    }

    #[test]
    fn test_assignment_does_not_wait_for_layer_lock() {
        let mut view =
            PixelBufferView::new(OffscreenLayer::new(1), RendererOptions::default()).unwrap();
        view.set_bounds(8, 8);

        let layer = Arc::clone(view.layer());
        let held = layer.lock().unwrap();
        view.set_pixel_buffer(PixelBuffer::solid(2, 2, [0, 0, 255, 255]).unwrap())
            .unwrap();
        assert_eq!(view.renderer().stats().submitted(), 1);
        drop(held);

        let _ = view.renderer().flush();
    }
}
