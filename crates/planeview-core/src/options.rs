//! Configuration options for the plane overlay.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::anchor::PlaneAlignment;
use crate::error::{PlaneViewError, Result};
use crate::material::SimpleMaterial;
use crate::text::TextContainer;

/// Which plane alignments world tracking should detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneDetection {
    pub horizontal: bool,
    pub vertical: bool,
}

impl PlaneDetection {
    /// Detect both horizontal and vertical planes.
    pub const ALL: Self = Self {
        horizontal: true,
        vertical: true,
    };

    /// Returns true if no alignment is requested.
    pub fn is_empty(&self) -> bool {
        !self.horizontal && !self.vertical
    }

    /// Returns true if planes with `alignment` should be detected.
    pub fn includes(&self, alignment: PlaneAlignment) -> bool {
        match alignment {
            PlaneAlignment::Horizontal => self.horizontal,
            PlaneAlignment::Vertical => self.vertical,
        }
    }
}

impl Default for PlaneDetection {
    fn default() -> Self {
        Self::ALL
    }
}

/// Options for the plane overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Plane alignments requested from world tracking.
    pub plane_detection: PlaneDetection,

    /// Material of the plane mesh.
    pub geometry_material: SimpleMaterial,

    /// Material of the classification label.
    pub text_material: SimpleMaterial,

    /// Uniform scale applied to the label mesh.
    pub text_scale: f32,

    /// Rotation of the label about +X, in radians.
    pub text_rotation_radians: f32,

    /// Container frame for label layout (None = mesher default).
    pub text_container: Option<TextContainer>,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            plane_detection: PlaneDetection::ALL,
            geometry_material: SimpleMaterial::translucent_white(),
            text_material: SimpleMaterial::system_pink(),
            text_scale: 0.01,
            text_rotation_radians: -std::f32::consts::FRAC_PI_2,
            text_container: None,
        }
    }
}

impl ViewerOptions {
    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes options to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that the options describe something drawable.
    pub fn validate(&self) -> Result<()> {
        if !self.text_scale.is_finite() || self.text_scale <= 0.0 {
            return Err(PlaneViewError::InvalidOptions(format!(
                "text_scale must be positive, got {}",
                self.text_scale
            )));
        }
        if !self.text_rotation_radians.is_finite() {
            return Err(PlaneViewError::InvalidOptions(
                "text_rotation_radians must be finite".into(),
            ));
        }
        for (name, material) in [
            ("geometry_material", &self.geometry_material),
            ("text_material", &self.text_material),
        ] {
            let c = material.color;
            if !c.is_finite() || c.min_element() < 0.0 || c.max_element() > 1.0 {
                return Err(PlaneViewError::InvalidOptions(format!(
                    "{name} color components must lie in [0, 1]"
                )));
            }
        }
        if self.plane_detection.is_empty() {
            log::warn!("plane detection disabled for both alignments; no planes will be reported");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_detection_includes() {
        let horizontal_only = PlaneDetection {
            horizontal: true,
            vertical: false,
        };
        assert!(horizontal_only.includes(PlaneAlignment::Horizontal));
        assert!(!horizontal_only.includes(PlaneAlignment::Vertical));
        assert!(PlaneDetection::ALL.includes(PlaneAlignment::Vertical));
    }

    #[test]
    fn test_defaults() {
        let options = ViewerOptions::default();
        assert_eq!(options.plane_detection, PlaneDetection::ALL);
        assert_eq!(options.geometry_material.color.w, 0.5);
        assert!(!options.geometry_material.is_metallic);
        assert!(!options.text_material.is_translucent());
        assert_eq!(options.text_scale, 0.01);
        assert!(options.text_container.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = ViewerOptions::from_json_str(r#"{ "text_scale": 0.02 }"#).unwrap();
        assert_eq!(options.text_scale, 0.02);
        assert_eq!(options.text_material, SimpleMaterial::system_pink());
    }

    #[test]
    fn test_json_roundtrip() {
        let options = ViewerOptions::default();
        let json = options.to_json_string().unwrap();
        assert_eq!(ViewerOptions::from_json_str(&json).unwrap(), options);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let err = ViewerOptions::from_json_str(r#"{ "text_scale": -1.0 }"#).unwrap_err();
        assert!(matches!(err, PlaneViewError::InvalidOptions(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ViewerOptions::load("/nonexistent/planeview.json").unwrap_err();
        assert!(matches!(err, PlaneViewError::IoError(_)));
    }
}
