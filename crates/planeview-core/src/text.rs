//! Text meshes for plane labels.
//!
//! Glyph outlines come from an external provider behind [`TextMeshProvider`].
//! [`BlockTextMesher`] is the built-in provider: every visible character
//! becomes an extruded box in a monospaced grid, which is enough to read a
//! short label in an overlay without pulling in a font stack.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::mesh::{MeshDescriptor, MeshPrimitives, MeshResource};

/// A rectangle that text is laid out into, in text-local units.
///
/// `origin` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextContainer {
    pub origin: Vec2,
    pub size: Vec2,
}

impl TextContainer {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }
}

/// Layout parameters for text mesh generation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextMeshOptions {
    /// Container to wrap and clip into; `None` lets the provider choose.
    pub container: Option<TextContainer>,
}

/// Source of extruded-glyph text meshes.
pub trait TextMeshProvider {
    /// Generates a triangle mesh rendering `text`.
    ///
    /// The returned mesh is named after `text`.
    fn generate_text(&self, text: &str, options: &TextMeshOptions)
        -> Result<MeshResource, MeshError>;
}

/// Monospaced block-glyph text mesher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockTextMesher {
    /// Height of a glyph cell.
    pub line_height: f32,
    /// Horizontal distance between glyph origins.
    pub advance: f32,
    /// Width of the box drawn for a glyph.
    pub glyph_width: f32,
    /// Depth of the extrusion along +Z.
    pub extrusion_depth: f32,
}

impl Default for BlockTextMesher {
    fn default() -> Self {
        Self {
            line_height: 10.0,
            advance: 6.0,
            glyph_width: 5.0,
            extrusion_depth: 1.0,
        }
    }
}

const BOX_CORNERS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

#[rustfmt::skip]
const BOX_TRIANGLES: [u32; 36] = [
    0, 2, 1, 0, 3, 2, // back
    4, 5, 6, 4, 6, 7, // front
    0, 1, 5, 0, 5, 4, // bottom
    3, 7, 6, 3, 6, 2, // top
    0, 4, 7, 0, 7, 3, // left
    1, 2, 6, 1, 6, 5, // right
];

impl BlockTextMesher {
    /// Returns the lower-left corner of each visible glyph cell.
    fn layout(&self, text: &str, options: &TextMeshOptions) -> Vec<Vec2> {
        let (start, max_width, min_y) = match options.container {
            Some(c) => (
                Vec2::new(c.origin.x, c.origin.y + c.size.y - self.line_height),
                Some(c.size.x),
                Some(c.origin.y),
            ),
            None => (Vec2::ZERO, None, None),
        };

        let mut cells = Vec::new();
        let mut cursor = start;
        for ch in text.chars() {
            if ch == '\n' {
                cursor = Vec2::new(start.x, cursor.y - self.line_height);
                continue;
            }
            if let Some(width) = max_width {
                if cursor.x - start.x + self.glyph_width > width && cursor.x > start.x {
                    cursor = Vec2::new(start.x, cursor.y - self.line_height);
                }
            }
            if min_y.is_some_and(|y| cursor.y < y) {
                break;
            }
            if !ch.is_whitespace() {
                cells.push(cursor);
            }
            cursor.x += self.advance;
        }
        cells
    }
}

impl TextMeshProvider for BlockTextMesher {
    fn generate_text(
        &self,
        text: &str,
        options: &TextMeshOptions,
    ) -> Result<MeshResource, MeshError> {
        let cells = self.layout(text, options);
        if cells.is_empty() {
            return Err(MeshError::EmptyText);
        }

        let size = Vec3::new(self.glyph_width, self.line_height, self.extrusion_depth);
        let mut positions = Vec::with_capacity(cells.len() * BOX_CORNERS.len());
        let mut indices = Vec::with_capacity(cells.len() * BOX_TRIANGLES.len());

        for cell in cells {
            #[allow(clippy::cast_possible_truncation)]
            let base = positions.len() as u32;
            let origin = cell.extend(0.0);
            positions.extend(
                BOX_CORNERS
                    .iter()
                    .map(|&corner| origin + Vec3::from(corner) * size),
            );
            indices.extend(BOX_TRIANGLES.iter().map(|&i| base + i));
        }

        MeshResource::generate(&[MeshDescriptor {
            name: text.to_string(),
            positions,
            primitives: MeshPrimitives::Triangles(indices),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_box_per_visible_glyph() {
        let mesher = BlockTextMesher::default();
        let mesh = mesher
            .generate_text("Wall", &TextMeshOptions::default())
            .unwrap();
        assert_eq!(mesh.name(), "Wall");
        assert_eq!(mesh.vertex_count(), 4 * 8);
        assert_eq!(mesh.triangle_count(), 4 * 12);

        let spaced = mesher
            .generate_text("A B", &TextMeshOptions::default())
            .unwrap();
        assert_eq!(spaced.vertex_count(), 2 * 8);
        // The space still advances the cursor.
        assert!((spaced.bounds().1.x - (2.0 * mesher.advance + mesher.glyph_width)).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_rejected() {
        let mesher = BlockTextMesher::default();
        assert_eq!(
            mesher.generate_text("", &TextMeshOptions::default()),
            Err(MeshError::EmptyText)
        );
        assert_eq!(
            mesher.generate_text("  \n", &TextMeshOptions::default()),
            Err(MeshError::EmptyText)
        );
    }

    #[test]
    fn test_container_wraps_and_clips() {
        let mesher = BlockTextMesher::default();
        // Two glyphs per line, two lines tall.
        let container = TextContainer::new(Vec2::ZERO, Vec2::new(12.0, 20.0));
        let options = TextMeshOptions {
            container: Some(container),
        };

        let cells = mesher.layout("ABCDEF", &options);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], Vec2::new(0.0, 10.0));
        assert_eq!(cells[1], Vec2::new(6.0, 10.0));
        assert_eq!(cells[2], Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_newline_starts_new_line() {
        let mesher = BlockTextMesher::default();
        let cells = mesher.layout("A\nB", &TextMeshOptions::default());
        assert_eq!(cells, vec![Vec2::ZERO, Vec2::new(0.0, -10.0)]);
    }
}
