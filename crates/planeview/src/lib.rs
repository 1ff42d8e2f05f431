//! planeview: plane-detection overlays and camera pixel-buffer presentation.
//!
//! Two independent pieces sit behind this facade:
//!
//! - a [`PlaneDetectionViewer`] that receives plane-anchor events from a
//!   [`TrackingSession`] and keeps a [`Scene`] of labelled plane overlays in
//!   step with them
//! - a [`PixelBufferView`] that presents every assigned camera frame through a
//!   serialized [`FrameRenderer`]
//!
//! # Quick Start
//!
//! ```no_run
//! use planeview::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let mut viewer = PlaneDetectionViewer::new(ViewerOptions::default())?;
//!     let mut session = ScriptedSession::new();
//!     viewer.start(&mut session);
//!
//!     let floor = PlaneAnchor::new(
//!         AnchorIdentifier::new(),
//!         Classification::Floor,
//!         Vec3::ZERO,
//!         PlaneGeometry::new(
//!             vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 0.0, 1.0), Vec3::Z],
//!             vec![0, 1, 2, 0, 2, 3],
//!         ),
//!     );
//!     session.push(AnchorEvent::Added(vec![floor.into()]));
//!     viewer.pump(&mut session);
//!
//!     assert_eq!(viewer.scene().len(), 1);
//!     Ok(())
//! }
//! ```

mod pixel_view;
mod session;
mod viewer;

pub use pixel_view::PixelBufferView;
pub use session::{
    AnchorEvent, ScriptedSession, SessionDelegate, TrackingSession, WorldTrackingConfiguration,
};
pub use viewer::PlaneDetectionViewer;

// Re-export core types
pub use planeview_core::{
    Anchor, AnchorEntity, AnchorIdentifier, AnchorSceneReconciler,
    BlockTextMesher, Classification, EntityHandle, EntityStyle, MeshDescriptor, MeshError,
    MeshPrimitives, MeshResource, ModelComponent, ModelEntity, PlaneAlignment, PlaneAnchor,
    PlaneDetection, PlaneGeometry, PlaneViewError, Result, Scene, SimpleMaterial, TextContainer,
    TextMeshOptions, TextMeshProvider, Transform, ViewerOptions, GEOMETRY_CHILD_NAME,
    TEXT_CHILD_NAME,
};
pub use planeview_core::{Mat4, Quat, Vec2, Vec3, Vec4};

// Re-export render types
pub use planeview_render::{
    DropReason, FrameOutcome, FrameRenderer, FrameStats, OffscreenLayer, PixelBuffer,
    PixelFormat, PowerPreference, PresentationLayer, RenderError, RenderResult, RendererOptions,
    SurfaceLayer,
};

/// Initializes `env_logger` from `RUST_LOG`. Calling it again is harmless.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::debug!("planeview logging initialized");
    }
}
