//! Scene graph of anchored overlay entities.
//!
//! The graph is a two-level tree: the [`Scene`] owns [`AnchorEntity`] roots,
//! each root owns its [`ModelEntity`] children. Roots are addressed by
//! [`EntityHandle`]s handed out on insertion; handles are never reused within
//! a scene.

use std::collections::BTreeMap;
use std::fmt;

use glam::{Mat4, Vec3};

use crate::anchor::AnchorIdentifier;
use crate::material::SimpleMaterial;
use crate::mesh::MeshResource;
use crate::transform::Transform;

/// Opaque handle to an [`AnchorEntity`] inserted into a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(u64);

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Mesh and materials rendered by a [`ModelEntity`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelComponent {
    pub mesh: MeshResource,
    pub materials: Vec<SimpleMaterial>,
}

impl ModelComponent {
    pub fn new(mesh: MeshResource, materials: Vec<SimpleMaterial>) -> Self {
        Self { mesh, materials }
    }
}

/// A named scene-graph leaf that may render a model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelEntity {
    name: String,
    transform: Transform,
    model: Option<ModelComponent>,
}

impl ModelEntity {
    /// Creates an entity rendering `mesh` with `materials`.
    pub fn new(mesh: MeshResource, materials: Vec<SimpleMaterial>) -> Self {
        Self {
            model: Some(ModelComponent::new(mesh, materials)),
            ..Self::default()
        }
    }

    /// Creates an entity that renders nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the entity name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the transform relative to the parent.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Returns the translation relative to the parent.
    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    /// Sets the translation relative to the parent, keeping rotation and scale.
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.translation = position;
    }

    pub fn model(&self) -> Option<&ModelComponent> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut ModelComponent> {
        self.model.as_mut()
    }

    /// Replaces the model content. `None` makes the entity render nothing.
    pub fn set_model(&mut self, model: Option<ModelComponent>) {
        self.model = model;
    }

    /// Returns the mesh being rendered, if any.
    pub fn mesh(&self) -> Option<&MeshResource> {
        self.model.as_ref().map(|m| &m.mesh)
    }
}

/// A scene-graph root pinned to a tracked anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorEntity {
    anchor: AnchorIdentifier,
    transform: Transform,
    children: Vec<ModelEntity>,
}

impl AnchorEntity {
    /// Creates a detached entity following the anchor `identifier`.
    pub fn new(identifier: AnchorIdentifier) -> Self {
        Self {
            anchor: identifier,
            transform: Transform::IDENTITY,
            children: Vec::new(),
        }
    }

    /// Returns the anchor identifier this entity follows.
    pub fn anchor_identifier(&self) -> AnchorIdentifier {
        self.anchor
    }

    /// Returns the world transform of this root.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Attaches a child.
    ///
    /// With `preserve_world_transform`, the child's current transform is taken
    /// as its world transform and converted into this entity's frame, so the
    /// child stays where it is. Otherwise the child's transform is kept as-is
    /// and interpreted relative to this entity.
    pub fn add_child(&mut self, mut child: ModelEntity, preserve_world_transform: bool) {
        if preserve_world_transform {
            let local = self.transform.to_matrix().inverse() * child.transform.to_matrix();
            child.transform = Transform::from_matrix(local);
        }
        self.children.push(child);
    }

    pub fn children(&self) -> &[ModelEntity] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [ModelEntity] {
        &mut self.children
    }

    /// Finds the first child with the given name.
    pub fn child_named(&self, name: &str) -> Option<&ModelEntity> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns the world matrix of the named child.
    pub fn child_world_matrix(&self, name: &str) -> Option<Mat4> {
        self.child_named(name)
            .map(|c| self.transform.to_matrix() * c.transform.to_matrix())
    }
}

/// The set of anchored roots read by the compositor.
#[derive(Debug, Default)]
pub struct Scene {
    anchors: BTreeMap<EntityHandle, AnchorEntity>,
    next_handle: u64,
}

impl Scene {
    /// Creates a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a root and returns its handle.
    pub fn add_anchor(&mut self, entity: AnchorEntity) -> EntityHandle {
        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;
        self.anchors.insert(handle, entity);
        handle
    }

    /// Detaches a root from the scene.
    pub fn remove_anchor(&mut self, handle: EntityHandle) -> Option<AnchorEntity> {
        self.anchors.remove(&handle)
    }

    pub fn anchor(&self, handle: EntityHandle) -> Option<&AnchorEntity> {
        self.anchors.get(&handle)
    }

    pub fn anchor_mut(&mut self, handle: EntityHandle) -> Option<&mut AnchorEntity> {
        self.anchors.get_mut(&handle)
    }

    /// Iterates roots in insertion order.
    pub fn anchors(&self) -> impl Iterator<Item = (EntityHandle, &AnchorEntity)> {
        self.anchors.iter().map(|(h, e)| (*h, e))
    }

    /// Finds the root following `identifier` by scanning the scene.
    pub fn find_anchor_targeting(&self, identifier: AnchorIdentifier) -> Option<EntityHandle> {
        self.anchors
            .iter()
            .find(|(_, e)| e.anchor == identifier)
            .map(|(h, _)| *h)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_handles_are_not_reused() {
        let mut scene = Scene::new();
        let a = scene.add_anchor(AnchorEntity::new(AnchorIdentifier::new()));
        scene.remove_anchor(a);
        let b = scene.add_anchor(AnchorEntity::new(AnchorIdentifier::new()));
        assert_ne!(a, b);
        assert_eq!(scene.len(), 1);
        assert!(scene.anchor(a).is_none());
    }

    #[test]
    fn test_find_anchor_targeting() {
        let mut scene = Scene::new();
        let id = AnchorIdentifier::new();
        let handle = scene.add_anchor(AnchorEntity::new(id));
        scene.add_anchor(AnchorEntity::new(AnchorIdentifier::new()));
        assert_eq!(scene.find_anchor_targeting(id), Some(handle));
        assert_eq!(scene.find_anchor_targeting(AnchorIdentifier::new()), None);
    }

    #[test]
    fn test_add_child_preserving_world_transform() {
        let mut parent = AnchorEntity::new(AnchorIdentifier::new());
        parent.set_transform(Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        let child = ModelEntity::empty().with_name("kept");
        parent.add_child(child, true);

        let world = parent.child_world_matrix("kept").unwrap();
        assert!(world.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        assert!(parent
            .child_named("kept")
            .unwrap()
            .position()
            .abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_add_child_parent_local() {
        let mut parent = AnchorEntity::new(AnchorIdentifier::new());
        parent.set_transform(Transform::new(
            Vec3::ONE,
            Quat::from_rotation_y(1.0),
            Vec3::new(0.0, 2.0, 0.0),
        ));

        let mut child = ModelEntity::empty().with_name("local");
        child.set_position(Vec3::Z);
        parent.add_child(child, false);

        assert_eq!(parent.child_named("local").unwrap().position(), Vec3::Z);
    }
}
