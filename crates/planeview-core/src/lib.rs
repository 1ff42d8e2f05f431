//! Core model for planeview.
//!
//! This crate provides the pieces that turn a stream of plane-anchor events into
//! a scene graph of labelled, translucent plane overlays:
//! - [`PlaneAnchor`] and [`Classification`] describing what the tracker observed
//! - [`Scene`], [`AnchorEntity`] and [`ModelEntity`] forming the scene graph
//! - [`MeshResource`] generation from plane geometry and text
//! - [`AnchorSceneReconciler`] keeping the scene in step with the anchor stream

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod anchor;
pub mod error;
pub mod material;
pub mod mesh;
pub mod options;
pub mod reconciler;
pub mod scene;
pub mod text;
pub mod transform;

pub use anchor::{Anchor, AnchorIdentifier, Classification, PlaneAlignment, PlaneAnchor, PlaneGeometry};
pub use error::{MeshError, PlaneViewError, Result};
pub use material::SimpleMaterial;
pub use mesh::{MeshDescriptor, MeshPrimitives, MeshResource};
pub use options::{PlaneDetection, ViewerOptions};
pub use reconciler::{AnchorSceneReconciler, EntityStyle, GEOMETRY_CHILD_NAME, TEXT_CHILD_NAME};
pub use scene::{AnchorEntity, EntityHandle, ModelComponent, ModelEntity, Scene};
pub use text::{BlockTextMesher, TextContainer, TextMeshOptions, TextMeshProvider};
pub use transform::Transform;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
