//! Reconciliation of plane-anchor events into the scene graph.
//!
//! Every live plane anchor is mirrored by exactly one [`AnchorEntity`] with two
//! children: a translucent "Geometry" mesh of the plane outline and a "Text"
//! mesh naming its classification. The reconciler keeps an identifier → handle
//! map so updates and removals never scan the scene.

use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::anchor::{AnchorIdentifier, PlaneAnchor};
use crate::material::SimpleMaterial;
use crate::options::ViewerOptions;
use crate::scene::{AnchorEntity, EntityHandle, ModelComponent, ModelEntity, Scene};
use crate::text::{BlockTextMesher, TextMeshOptions, TextMeshProvider};
use crate::transform::Transform;

/// Name of the child rendering the plane outline.
pub const GEOMETRY_CHILD_NAME: &str = "Geometry";

/// Name of the child rendering the classification label.
pub const TEXT_CHILD_NAME: &str = "Text";

/// Materials and label placement applied to every anchor entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStyle {
    pub geometry_material: SimpleMaterial,
    pub text_material: SimpleMaterial,
    /// Scale and rotation of the label; translation is ignored.
    pub text_transform: Transform,
    pub text_options: TextMeshOptions,
}

impl EntityStyle {
    pub fn from_options(options: &ViewerOptions) -> Self {
        Self {
            geometry_material: options.geometry_material,
            text_material: options.text_material,
            text_transform: Transform::new(
                Vec3::splat(options.text_scale),
                Quat::from_axis_angle(Vec3::X, options.text_rotation_radians),
                Vec3::ZERO,
            ),
            text_options: TextMeshOptions {
                container: options.text_container,
            },
        }
    }
}

impl Default for EntityStyle {
    fn default() -> Self {
        Self::from_options(&ViewerOptions::default())
    }
}

/// Keeps a [`Scene`] in step with the plane anchors reported by the tracker.
pub struct AnchorSceneReconciler<T: TextMeshProvider = BlockTextMesher> {
    entities: HashMap<AnchorIdentifier, EntityHandle>,
    text_mesher: T,
    style: EntityStyle,
}

impl AnchorSceneReconciler<BlockTextMesher> {
    /// Creates a reconciler with default style and the built-in text mesher.
    pub fn new() -> Self {
        Self::with_text_mesher(EntityStyle::default(), BlockTextMesher::default())
    }
}

impl Default for AnchorSceneReconciler<BlockTextMesher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TextMeshProvider> AnchorSceneReconciler<T> {
    /// Creates a reconciler with a custom style and text mesh provider.
    pub fn with_text_mesher(style: EntityStyle, text_mesher: T) -> Self {
        Self {
            entities: HashMap::new(),
            text_mesher,
            style,
        }
    }

    pub fn style(&self) -> &EntityStyle {
        &self.style
    }

    /// Returns the entity mirroring `identifier`, if the anchor is live.
    pub fn entity_for(&self, identifier: AnchorIdentifier) -> Option<EntityHandle> {
        self.entities.get(&identifier).copied()
    }

    /// Iterates identifiers of all live anchors.
    pub fn live_identifiers(&self) -> impl Iterator<Item = AnchorIdentifier> + '_ {
        self.entities.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Creates an entity for each newly detected anchor and inserts it.
    ///
    /// An anchor that is already live is replaced.
    pub fn on_added(&mut self, scene: &mut Scene, anchors: &[PlaneAnchor]) {
        for anchor in anchors {
            if let Some(previous) = self.entities.remove(&anchor.identifier) {
                log::debug!("anchor {} added twice; replacing {previous}", anchor.identifier);
                scene.remove_anchor(previous);
            }

            let entity = self.build_entity(anchor);
            let handle = scene.add_anchor(entity);
            self.entities.insert(anchor.identifier, handle);
            log::debug!(
                "added {handle} for {} ({:?})",
                anchor.identifier,
                anchor.classification
            );
        }
    }

    /// Refreshes geometry, label, and position of live anchors.
    ///
    /// Anchors without an entity are skipped.
    pub fn on_updated(&mut self, scene: &mut Scene, anchors: &[PlaneAnchor]) {
        if self.entities.is_empty() {
            return;
        }

        for anchor in anchors {
            let Some(entity) = self
                .entities
                .get(&anchor.identifier)
                .and_then(|&handle| scene.anchor_mut(handle))
            else {
                log::debug!("update for unknown anchor {}; skipped", anchor.identifier);
                continue;
            };

            entity.set_transform(Transform::from_matrix(anchor.transform));

            for child in entity.children_mut() {
                match child.name() {
                    GEOMETRY_CHILD_NAME => {
                        let model = self.geometry_model(anchor);
                        replace_mesh(child, model);
                    }
                    TEXT_CHILD_NAME => {
                        let model = self.text_model(anchor);
                        replace_mesh(child, model);
                        child.set_position(anchor.center);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Detaches the entities of removed anchors.
    pub fn on_removed(&mut self, scene: &mut Scene, anchors: &[PlaneAnchor]) {
        for anchor in anchors {
            match self.entities.remove(&anchor.identifier) {
                Some(handle) => {
                    scene.remove_anchor(handle);
                    log::debug!("removed {handle} for {}", anchor.identifier);
                }
                None => log::debug!("remove for unknown anchor {}; skipped", anchor.identifier),
            }
        }
    }

    fn build_entity(&self, anchor: &PlaneAnchor) -> AnchorEntity {
        let mut entity = AnchorEntity::new(anchor.identifier);

        let geometry = model_entity(self.geometry_model(anchor)).with_name(GEOMETRY_CHILD_NAME);
        entity.add_child(geometry, true);

        let mut text = model_entity(self.text_model(anchor)).with_name(TEXT_CHILD_NAME);
        text.set_transform(self.style.text_transform);
        text.set_position(anchor.center);
        entity.add_child(text, false);

        // Children are attached in the detached frame; the anchor pose is
        // applied once the tree is complete.
        entity.set_transform(Transform::from_matrix(anchor.transform));
        entity
    }

    fn geometry_model(&self, anchor: &PlaneAnchor) -> Option<ModelComponent> {
        match anchor.geometry.mesh_resource() {
            Ok(mesh) => Some(ModelComponent::new(mesh, vec![self.style.geometry_material])),
            Err(e) => {
                log::debug!("no plane mesh for {}: {e}", anchor.identifier);
                None
            }
        }
    }

    fn text_model(&self, anchor: &PlaneAnchor) -> Option<ModelComponent> {
        let label = anchor.classification.label();
        match self.text_mesher.generate_text(label, &self.style.text_options) {
            Ok(mesh) => Some(ModelComponent::new(mesh, vec![self.style.text_material])),
            Err(e) => {
                log::debug!("no label mesh for {}: {e}", anchor.identifier);
                None
            }
        }
    }
}

fn model_entity(model: Option<ModelComponent>) -> ModelEntity {
    let mut entity = ModelEntity::empty();
    entity.set_model(model);
    entity
}

/// Swaps the mesh of `child`, keeping its materials when it already has a model.
fn replace_mesh(child: &mut ModelEntity, model: Option<ModelComponent>) {
    match (child.model_mut(), model) {
        (Some(current), Some(new)) => current.mesh = new.mesh,
        (None, Some(new)) => child.set_model(Some(new)),
        (_, None) => child.set_model(None),
    }
}
