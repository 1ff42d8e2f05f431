//! Plane anchors as reported by the tracking service.
//!
//! Anchors are owned by the external tracker. Each event carries a snapshot of
//! the tracker's current estimate; the identifier is the only stable part.

use std::fmt;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MeshError;
use crate::mesh::{MeshDescriptor, MeshPrimitives, MeshResource};

/// Stable identifier of an anchor across add/update/remove events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorIdentifier(Uuid);

impl AnchorIdentifier {
    /// Creates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AnchorIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnchorIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Semantic classification the tracker assigned to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Ceiling,
    Wall,
    Floor,
    Table,
    Seat,
    Window,
    Door,
    /// Classification is unavailable or not yet determined.
    #[default]
    Unknown,
}

impl Classification {
    /// Returns the display string drawn above the plane.
    ///
    /// `Floor` is labelled "Table"; the overlay has always shown it that way.
    pub fn label(self) -> &'static str {
        match self {
            Classification::Ceiling => "Ceiling",
            Classification::Wall => "Wall",
            Classification::Floor | Classification::Table => "Table",
            Classification::Seat => "Seat",
            Classification::Window => "Window",
            Classification::Door => "Door",
            Classification::Unknown => "Unknown",
        }
    }
}

/// Orientation of a detected plane relative to gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneAlignment {
    #[default]
    Horizontal,
    Vertical,
}

/// Polygonal outline of a plane, in the anchor's local frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneGeometry {
    /// Ordered vertices of the closed boundary polygon.
    pub boundary_vertices: Vec<Vec3>,
    /// Triangle list; each triple indexes into `boundary_vertices`.
    pub triangle_indices: Vec<u16>,
}

impl PlaneGeometry {
    /// Creates plane geometry from boundary vertices and triangle indices.
    pub fn new(boundary_vertices: Vec<Vec3>, triangle_indices: Vec<u16>) -> Self {
        Self {
            boundary_vertices,
            triangle_indices,
        }
    }

    /// Describes this geometry as a triangle mesh with 32-bit indices.
    pub fn mesh_descriptor(&self) -> MeshDescriptor {
        MeshDescriptor {
            name: "plane".to_string(),
            positions: self.boundary_vertices.clone(),
            primitives: MeshPrimitives::Triangles(
                self.triangle_indices.iter().map(|&i| u32::from(i)).collect(),
            ),
        }
    }

    /// Builds the plane mesh, or reports why the geometry cannot be materialized.
    pub fn mesh_resource(&self) -> Result<MeshResource, MeshError> {
        MeshResource::generate(&[self.mesh_descriptor()])
    }
}

/// A world-anchored estimate of a planar surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneAnchor {
    pub identifier: AnchorIdentifier,
    /// World-from-anchor pose.
    pub transform: Mat4,
    pub alignment: PlaneAlignment,
    pub classification: Classification,
    /// Center of the plane in the anchor's local frame.
    pub center: Vec3,
    pub geometry: PlaneGeometry,
}

impl PlaneAnchor {
    /// Creates an anchor at the world origin with the given estimate.
    pub fn new(
        identifier: AnchorIdentifier,
        classification: Classification,
        center: Vec3,
        geometry: PlaneGeometry,
    ) -> Self {
        Self {
            identifier,
            transform: Mat4::IDENTITY,
            alignment: PlaneAlignment::default(),
            classification,
            center,
            geometry,
        }
    }

    /// Sets the world-from-anchor pose.
    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Sets the plane alignment.
    #[must_use]
    pub fn with_alignment(mut self, alignment: PlaneAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Any anchor the tracker may report in an event batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    Plane(PlaneAnchor),
    /// An anchor of a kind the overlay does not visualise.
    Other {
        identifier: AnchorIdentifier,
        transform: Mat4,
    },
}

impl Anchor {
    pub fn identifier(&self) -> AnchorIdentifier {
        match self {
            Anchor::Plane(plane) => plane.identifier,
            Anchor::Other { identifier, .. } => *identifier,
        }
    }

    pub fn as_plane(&self) -> Option<&PlaneAnchor> {
        match self {
            Anchor::Plane(plane) => Some(plane),
            Anchor::Other { .. } => None,
        }
    }
}

impl From<PlaneAnchor> for Anchor {
    fn from(plane: PlaneAnchor) -> Self {
        Anchor::Plane(plane)
    }
}
