//! Plane overlay demo.
//!
//! Draws a synthetic camera feed aspect-fill into a window while a scripted
//! session adds, relabels and removes planes. Space pauses the session.
//!
//! Run with `RUST_LOG=debug cargo run --example plane_overlay_demo`.

use std::sync::Arc;
use std::time::Instant;

use planeview::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

const FEED_WIDTH: u32 = 640;
const FEED_HEIGHT: u32 = 480;
const FRAMES_PER_EVENT: u64 = 90;

fn quad(width: f32, depth: f32) -> PlaneGeometry {
    PlaneGeometry::new(
        vec![
            Vec3::new(-width / 2.0, 0.0, -depth / 2.0),
            Vec3::new(width / 2.0, 0.0, -depth / 2.0),
            Vec3::new(width / 2.0, 0.0, depth / 2.0),
            Vec3::new(-width / 2.0, 0.0, depth / 2.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

fn script() -> Vec<AnchorEvent> {
    let floor = PlaneAnchor::new(
        AnchorIdentifier::new(),
        Classification::Floor,
        Vec3::ZERO,
        quad(2.0, 3.0),
    );
    let wall = PlaneAnchor::new(
        AnchorIdentifier::new(),
        Classification::Wall,
        Vec3::new(0.0, 0.0, 0.1),
        quad(1.5, 1.0),
    )
    .with_alignment(PlaneAlignment::Vertical)
    .with_transform(Mat4::from_translation(Vec3::new(0.0, 1.0, -2.0)));
    let door = PlaneAnchor {
        classification: Classification::Door,
        center: Vec3::new(0.2, 0.0, 0.1),
        ..wall.clone()
    };

    vec![
        AnchorEvent::Added(vec![floor.clone().into()]),
        AnchorEvent::Added(vec![wall.into()]),
        AnchorEvent::Updated(vec![door.clone().into()]),
        AnchorEvent::Removed(vec![floor.into()]),
        AnchorEvent::Removed(vec![door.into()]),
    ]
}

/// A moving color gradient standing in for the camera.
fn camera_frame(t: f32) -> PixelBuffer {
    let image = image::RgbaImage::from_fn(FEED_WIDTH, FEED_HEIGHT, |x, y| {
        #[allow(clippy::cast_precision_loss)]
        let (u, v) = (x as f32 / FEED_WIDTH as f32, y as f32 / FEED_HEIGHT as f32);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let channel = |f: f32| (f.fract() * 255.0) as u8;
        image::Rgba([channel(u + t * 0.1), channel(v), channel(0.5 + t * 0.05), 255])
    });
    PixelBuffer::from_rgba_image(&image)
}

struct Demo {
    window: Option<Arc<Window>>,
    view: Option<PixelBufferView<SurfaceLayer>>,
    viewer: PlaneDetectionViewer,
    session: ScriptedSession,
    started: Instant,
    frame: u64,
}

impl Demo {
    fn new() -> Self {
        Self {
            window: None,
            view: None,
            viewer: PlaneDetectionViewer::new(ViewerOptions::default())
                .expect("default options are valid"),
            session: ScriptedSession::from_events(script()),
            started: Instant::now(),
            frame: 0,
        }
    }

    fn advance_session(&mut self) {
        if self.frame % FRAMES_PER_EVENT != 0 || !self.session.step(&mut self.viewer) {
            return;
        }
        let scene = self.viewer.scene();
        log::info!("scene now holds {} anchors", scene.len());
        for (handle, entity) in scene.anchors() {
            let label = entity
                .child_named(TEXT_CHILD_NAME)
                .and_then(ModelEntity::mesh)
                .map_or("<none>", MeshResource::name);
            log::info!("  {handle}: {label}");
        }
    }

    fn toggle_session(&mut self) {
        if self.session.is_running() {
            self.viewer.pause(&mut self.session);
            log::info!("session paused");
        } else {
            self.viewer.start(&mut self.session);
            log::info!("session resumed");
        }
    }
}

impl ApplicationHandler for Demo {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("planeview")
            .with_inner_size(LogicalSize::new(960, 720));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("failed to create window"),
        );

        let size = window.inner_size();
        let mut layer = SurfaceLayer::new(window.clone());
        layer.set_drawable_size(size.width, size.height);
        let view = PixelBufferView::new(layer, RendererOptions::default())
            .expect("failed to start renderer");

        self.viewer.start(&mut self.session);
        window.request_redraw();
        self.window = Some(window);
        self.view = Some(view);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(view) = &mut self.view {
                    view.set_bounds(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Space)
                {
                    self.toggle_session();
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame += 1;
                self.advance_session();

                if let Some(view) = &mut self.view {
                    let frame = camera_frame(self.started.elapsed().as_secs_f32());
                    if let Err(e) = view.set_pixel_buffer(frame) {
                        log::error!("renderer stopped: {e}");
                        event_loop.exit();
                        return;
                    }
                    if self.frame % 300 == 0 {
                        let stats = view.renderer().stats();
                        log::info!(
                            "frames presented: {}, dropped: {}",
                            stats.presented(),
                            stats.dropped()
                        );
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() {
    init_logging();

    let event_loop = EventLoop::new().expect("failed to create event loop");
    let mut demo = Demo::new();
    event_loop.run_app(&mut demo).expect("event loop error");
}
