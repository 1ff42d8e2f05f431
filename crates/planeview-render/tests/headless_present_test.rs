//! Headless present tests.
//!
//! These need a GPU adapter (real or software fallback). Without one the
//! renderer stops on its first draw and the tests return early.

use std::sync::{Arc, Mutex};

use planeview_render::*;

const RED: [u8; 4] = [0, 0, 255, 255];
const BLUE: [u8; 4] = [255, 0, 0, 255];

fn offscreen(capacity: usize, width: u32, height: u32) -> Arc<Mutex<OffscreenLayer>> {
    let mut layer = OffscreenLayer::new(capacity);
    layer.set_drawable_size(width, height);
    Arc::new(Mutex::new(layer))
}

/// Flushes the renderer, returning false when no adapter is available.
fn settle(renderer: &FrameRenderer) -> bool {
    match renderer.flush() {
        Ok(()) => true,
        Err(e) => {
            assert!(renderer.stats().is_terminated());
            eprintln!("Skipping headless present tests: no GPU adapter available ({e})");
            false
        }
    }
}

fn assert_counts_consistent(stats: &FrameStats) {
    assert!(stats.presented() + stats.dropped() <= stats.submitted());
}

fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]
}

#[test]
fn headless_present_tests() {
    let renderer = FrameRenderer::new(RendererOptions::default()).unwrap();

    // --- Exhausted drawable pool drops frames ---
    let layer = offscreen(1, 64, 32);
    renderer.draw(PixelBuffer::solid(8, 8, RED).unwrap(), &layer).unwrap();
    if !settle(&renderer) {
        return;
    }
    for _ in 0..2 {
        renderer.draw(PixelBuffer::solid(8, 8, RED).unwrap(), &layer).unwrap();
    }
    assert!(settle(&renderer));
    assert_eq!(renderer.stats().submitted(), 3);
    assert_eq!(renderer.stats().presented(), 1);
    assert_eq!(renderer.stats().dropped(), 2);
    assert_eq!(layer.lock().unwrap().presented_count(), 1);

    // --- Solid image covers the whole drawable ---
    {
        let layer = layer.lock().unwrap();
        let frame = layer.read_back_latest().unwrap().expect("a presented frame");
        assert_eq!(frame.len(), 64 * 32 * 4);
        assert!(frame.chunks_exact(4).all(|px| px == RED));
    }

    // --- Recycling frees the pool ---
    layer.lock().unwrap().recycle();
    renderer.draw(PixelBuffer::solid(8, 8, BLUE).unwrap(), &layer).unwrap();
    assert!(settle(&renderer));
    assert_eq!(renderer.stats().presented(), 2);
    assert_eq!(layer.lock().unwrap().presented_count(), 2);

    // --- Zero-size drawable drops the frame ---
    let empty = offscreen(2, 0, 0);
    renderer.draw(PixelBuffer::solid(4, 4, RED).unwrap(), &empty).unwrap();
    assert!(settle(&renderer));
    assert_eq!(renderer.stats().dropped(), 3);
    assert_eq!(empty.lock().unwrap().presented_count(), 0);

    // --- Top image row lands at the top of the drawable ---
    let tall = offscreen(1, 32, 32);
    let data = [RED, BLUE].concat();
    renderer
        .draw(PixelBuffer::new(1, 2, data).unwrap(), &tall)
        .unwrap();
    assert!(settle(&renderer));
    {
        let layer = tall.lock().unwrap();
        let frame = layer.read_back_latest().unwrap().expect("a presented frame");
        let top = pixel(&frame, 32, 16, 0);
        let bottom = pixel(&frame, 32, 16, 31);
        assert!(top[2] > top[0], "top should be red, got {top:?}");
        assert!(bottom[0] > bottom[2], "bottom should be blue, got {bottom:?}");
    }

    // --- Wide image is center-cropped on a square drawable ---
    let square = offscreen(1, 32, 32);
    let data = [RED, BLUE].concat();
    renderer
        .draw(PixelBuffer::new(2, 1, data).unwrap(), &square)
        .unwrap();
    assert!(settle(&renderer));
    {
        let layer = square.lock().unwrap();
        let frame = layer.read_back_latest().unwrap().expect("a presented frame");
        let left = pixel(&frame, 32, 0, 16);
        let right = pixel(&frame, 32, 31, 16);
        assert!(left[2] > left[0], "left should be red, got {left:?}");
        assert!(right[0] > right[2], "right should be blue, got {right:?}");
    }

    // --- RGBA buffers are sampled in their own channel order ---
    let rgba = offscreen(1, 8, 8);
    let red_rgba = [255, 0, 0, 255].repeat(4);
    renderer
        .draw(
            PixelBuffer::with_layout(2, 2, 8, PixelFormat::Rgba8, red_rgba).unwrap(),
            &rgba,
        )
        .unwrap();
    assert!(settle(&renderer));
    {
        let layer = rgba.lock().unwrap();
        let frame = layer.read_back_latest().unwrap().expect("a presented frame");
        assert!(frame.chunks_exact(4).all(|px| px == RED));
    }

    // --- Sized draws resize the layer on the render thread ---
    let unsized_layer = offscreen(1, 0, 0);
    renderer
        .draw_sized(PixelBuffer::solid(4, 4, BLUE).unwrap(), &unsized_layer, (24, 12))
        .unwrap();
    assert!(settle(&renderer));
    {
        let layer = unsized_layer.lock().unwrap();
        assert_eq!(layer.drawable_size(), (24, 12));
        assert_eq!(layer.presented_count(), 1);
        let frame = layer.read_back_latest().unwrap().expect("a presented frame");
        assert_eq!(frame.len(), 24 * 12 * 4);
    }

    // --- Drawable larger than the device supports is dropped, not fatal ---
    let dropped = renderer.stats().dropped();
    let presented = renderer.stats().presented();
    let huge = offscreen(1, 100_000, 8);
    renderer.draw(PixelBuffer::solid(4, 4, RED).unwrap(), &huge).unwrap();
    assert!(settle(&renderer));
    assert!(!renderer.stats().is_terminated());
    assert_eq!(renderer.stats().dropped(), dropped + 1);
    assert_eq!(huge.lock().unwrap().presented_count(), 0);

    huge.lock().unwrap().set_drawable_size(16, 8);
    renderer.draw(PixelBuffer::solid(4, 4, RED).unwrap(), &huge).unwrap();
    assert!(settle(&renderer));
    assert_eq!(renderer.stats().presented(), presented + 1);
    assert_counts_consistent(renderer.stats());
}

#[test]
fn unusable_pixel_buffer_leaves_cache_empty() {
    let renderer = FrameRenderer::new(RendererOptions::default()).unwrap();
    let layer = offscreen(1, 16, 16);

    renderer
        .draw(PixelBuffer::new(0, 0, vec![]).unwrap(), &layer)
        .unwrap();
    if !settle(&renderer) {
        return;
    }
    assert_eq!(renderer.stats().dropped(), 1);
    assert_eq!(renderer.stats().cached_textures(), 0);
    assert_eq!(layer.lock().unwrap().presented_count(), 0);

    renderer.draw(PixelBuffer::solid(4, 4, BLUE).unwrap(), &layer).unwrap();
    assert!(settle(&renderer));
    assert_eq!(renderer.stats().presented(), 1);
    assert_eq!(renderer.stats().cached_textures(), 1);
    assert_counts_consistent(renderer.stats());
}
