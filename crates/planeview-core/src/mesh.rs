//! Triangle mesh resources.
//!
//! Meshes are built from one or more [`MeshDescriptor`]s. Generation validates
//! the descriptors and rejects anything that does not describe a well-formed
//! triangle list, so callers can fall back to "no model" instead of drawing
//! garbage.

use glam::Vec3;

use crate::error::MeshError;

/// Primitive topology of a mesh descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshPrimitives {
    /// Triangle list, three indices per triangle.
    Triangles(Vec<u32>),
}

impl MeshPrimitives {
    fn indices(&self) -> &[u32] {
        match self {
            MeshPrimitives::Triangles(indices) => indices,
        }
    }
}

/// Raw mesh data awaiting validation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDescriptor {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub primitives: MeshPrimitives,
}

/// A validated, immutable triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshResource {
    name: String,
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    bounds: (Vec3, Vec3),
}

impl MeshResource {
    /// Generates a mesh from descriptors, concatenating their parts.
    ///
    /// The resulting mesh takes the name of the first descriptor.
    pub fn generate(descriptors: &[MeshDescriptor]) -> Result<Self, MeshError> {
        let first = descriptors.first().ok_or(MeshError::NoDescriptors)?;

        let mut positions = Vec::new();
        let mut indices = Vec::new();

        for descriptor in descriptors {
            validate(descriptor)?;

            let base = u32::try_from(positions.len()).map_err(|_| MeshError::IndexOutOfRange {
                index: u32::MAX,
                vertex_count: positions.len(),
            })?;
            positions.extend_from_slice(&descriptor.positions);
            indices.extend(descriptor.primitives.indices().iter().map(|&i| base + i));
        }

        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in &positions {
            min = min.min(*p);
            max = max.max(*p);
        }

        Ok(Self {
            name: first.name.clone(),
            positions,
            indices,
            bounds: (min, max),
        })
    }

    /// Returns the mesh name. Text meshes are named after the text they render.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Returns the 32-bit triangle-list indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates the triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Returns the axis-aligned bounding box as (min, max).
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.bounds
    }
}

fn validate(descriptor: &MeshDescriptor) -> Result<(), MeshError> {
    if descriptor.positions.is_empty() {
        return Err(MeshError::EmptyPositions(descriptor.name.clone()));
    }

    if let Some(i) = descriptor.positions.iter().position(|p| !p.is_finite()) {
        return Err(MeshError::NonFinitePosition(i));
    }

    let indices = descriptor.primitives.indices();
    if indices.is_empty() {
        return Err(MeshError::EmptyPrimitives(descriptor.name.clone()));
    }
    if indices.len() % 3 != 0 {
        return Err(MeshError::IncompleteTriangle(indices.len()));
    }

    let vertex_count = descriptor.positions.len();
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(MeshError::IndexOutOfRange {
            index,
            vertex_count,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(name: &str) -> MeshDescriptor {
        MeshDescriptor {
            name: name.to_string(),
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            primitives: MeshPrimitives::Triangles(vec![0, 1, 2, 0, 2, 3]),
        }
    }

    #[test]
    fn test_generate_quad() {
        let mesh = MeshResource::generate(&[quad("q")]).unwrap();
        assert_eq!(mesh.name(), "q");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.bounds(), (Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_generate_offsets_later_parts() {
        let mesh = MeshResource::generate(&[quad("a"), quad("b")]).unwrap();
        assert_eq!(mesh.name(), "a");
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(&mesh.indices()[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(MeshResource::generate(&[]), Err(MeshError::NoDescriptors));

        let mut d = quad("q");
        d.positions.clear();
        assert!(matches!(
            MeshResource::generate(&[d]),
            Err(MeshError::EmptyPositions(_))
        ));

        let mut d = quad("q");
        d.primitives = MeshPrimitives::Triangles(vec![0, 1]);
        assert_eq!(
            MeshResource::generate(&[d]),
            Err(MeshError::IncompleteTriangle(2))
        );

        let mut d = quad("q");
        d.primitives = MeshPrimitives::Triangles(vec![]);
        assert!(matches!(
            MeshResource::generate(&[d]),
            Err(MeshError::EmptyPrimitives(_))
        ));

        let mut d = quad("q");
        d.primitives = MeshPrimitives::Triangles(vec![0, 1, 4]);
        assert_eq!(
            MeshResource::generate(&[d]),
            Err(MeshError::IndexOutOfRange {
                index: 4,
                vertex_count: 4
            })
        );

        let mut d = quad("q");
        d.positions[2] = Vec3::new(f32::NAN, 0.0, 0.0);
        assert_eq!(
            MeshResource::generate(&[d]),
            Err(MeshError::NonFinitePosition(2))
        );
    }
}
