//! Surface materials for overlay entities.

use glam::Vec4;
use serde::{Deserialize, Serialize};

/// A flat, unlit-looking material with a single base color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimpleMaterial {
    /// Base color as linear RGBA.
    pub color: Vec4,
    pub is_metallic: bool,
}

impl SimpleMaterial {
    /// Creates a material from a color.
    pub fn new(color: Vec4, is_metallic: bool) -> Self {
        Self { color, is_metallic }
    }

    /// Translucent white used for plane geometry.
    pub fn translucent_white() -> Self {
        Self::new(Vec4::new(1.0, 1.0, 1.0, 0.5), false)
    }

    /// Opaque pink used for classification labels.
    pub fn system_pink() -> Self {
        Self::new(Vec4::new(1.0, 0.176, 0.333, 1.0), false)
    }

    /// Returns true if the material blends with what is behind it.
    pub fn is_translucent(&self) -> bool {
        self.color.w < 1.0
    }
}

impl Default for SimpleMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE, false)
    }
}
