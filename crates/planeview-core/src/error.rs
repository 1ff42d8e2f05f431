//! Error types for planeview.

use thiserror::Error;

/// The main error type for planeview core operations.
#[derive(Error, Debug)]
pub enum PlaneViewError {
    /// Options failed validation.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Reasons a mesh descriptor is rejected by [`MeshResource::generate`](crate::MeshResource::generate).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// No descriptors were supplied.
    #[error("no mesh descriptors")]
    NoDescriptors,

    /// A descriptor has no vertex positions.
    #[error("descriptor '{0}' has no positions")]
    EmptyPositions(String),

    /// The index list does not describe whole triangles.
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),

    /// A descriptor has no primitives.
    #[error("descriptor '{0}' has no primitives")]
    EmptyPrimitives(String),

    /// An index refers past the end of the position list.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    /// A position contains NaN or infinity.
    #[error("position {0} is not finite")]
    NonFinitePosition(usize),

    /// Text contained nothing to draw.
    #[error("text has no visible glyphs")]
    EmptyText,
}

/// A specialized Result type for planeview core operations.
pub type Result<T> = std::result::Result<T, PlaneViewError>;
