//! The plane-detection view: scene graph plus reconciler.

use planeview_core::{
    Anchor, AnchorSceneReconciler, BlockTextMesher, EntityStyle, PlaneAnchor, Result, Scene,
    TextMeshProvider, ViewerOptions,
};

use crate::session::{SessionDelegate, TrackingSession, WorldTrackingConfiguration};

/// Owns the overlay scene and keeps it in step with a tracking session.
pub struct PlaneDetectionViewer<T: TextMeshProvider = BlockTextMesher> {
    scene: Scene,
    reconciler: AnchorSceneReconciler<T>,
    options: ViewerOptions,
}

impl PlaneDetectionViewer<BlockTextMesher> {
    /// Creates a viewer labelling planes with the built-in text mesher.
    pub fn new(options: ViewerOptions) -> Result<Self> {
        Self::with_text_mesher(options, BlockTextMesher::default())
    }
}

impl<T: TextMeshProvider> PlaneDetectionViewer<T> {
    /// Creates a viewer with a custom text mesh provider.
    pub fn with_text_mesher(options: ViewerOptions, text_mesher: T) -> Result<Self> {
        options.validate()?;
        let style = EntityStyle::from_options(&options);
        Ok(Self {
            scene: Scene::new(),
            reconciler: AnchorSceneReconciler::with_text_mesher(style, text_mesher),
            options,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn reconciler(&self) -> &AnchorSceneReconciler<T> {
        &self.reconciler
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Configuration the session is run with.
    pub fn configuration(&self) -> WorldTrackingConfiguration {
        WorldTrackingConfiguration::from(&self.options)
    }

    /// Runs `session` with this viewer's configuration.
    pub fn start(&self, session: &mut dyn TrackingSession) {
        session.run(self.configuration());
    }

    pub fn pause(&self, session: &mut dyn TrackingSession) {
        session.pause();
    }

    /// Applies every batch `session` has pending. Returns the batch count.
    pub fn pump(&mut self, session: &mut dyn TrackingSession) -> usize {
        session.deliver(self)
    }
}

fn planes(anchors: &[Anchor]) -> Vec<PlaneAnchor> {
    let planes: Vec<PlaneAnchor> = anchors.iter().filter_map(Anchor::as_plane).cloned().collect();
    if planes.len() < anchors.len() {
        log::debug!("ignoring {} non-plane anchors", anchors.len() - planes.len());
    }
    planes
}

impl<T: TextMeshProvider> SessionDelegate for PlaneDetectionViewer<T> {
    fn session_did_add(&mut self, anchors: &[Anchor]) {
        self.reconciler.on_added(&mut self.scene, &planes(anchors));
    }

    fn session_did_update(&mut self, anchors: &[Anchor]) {
        self.reconciler.on_updated(&mut self.scene, &planes(anchors));
    }

    fn session_did_remove(&mut self, anchors: &[Anchor]) {
        self.reconciler.on_removed(&mut self.scene, &planes(anchors));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planeview_core::{AnchorIdentifier, Classification, Mat4, PlaneGeometry, Vec3};

    use crate::session::{AnchorEvent, ScriptedSession};

    fn square(identifier: AnchorIdentifier) -> PlaneAnchor {
        PlaneAnchor::new(
            identifier,
            Classification::Table,
            Vec3::ZERO,
            PlaneGeometry::new(
                vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 0.0, 1.0), Vec3::Z],
                vec![0, 1, 2, 0, 2, 3],
            ),
        )
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = ViewerOptions {
            text_scale: 0.0,
            ..ViewerOptions::default()
        };
        assert!(PlaneDetectionViewer::new(options).is_err());
    }

    #[test]
    fn test_non_plane_anchors_ignored() {
        let mut viewer = PlaneDetectionViewer::new(ViewerOptions::default()).unwrap();
        let id = AnchorIdentifier::new();
        viewer.session_did_add(&[
            Anchor::Other {
                identifier: AnchorIdentifier::new(),
                transform: Mat4::IDENTITY,
            },
            square(id).into(),
        ]);

        assert_eq!(viewer.scene().len(), 1);
        assert!(viewer.reconciler().entity_for(id).is_some());
    }

    #[test]
    fn test_start_pump_pause() {
        let mut viewer = PlaneDetectionViewer::new(ViewerOptions::default()).unwrap();
        let id = AnchorIdentifier::new();
        let mut session = ScriptedSession::from_events([
            AnchorEvent::Added(vec![square(id).into()]),
            AnchorEvent::Removed(vec![square(id).into()]),
        ]);

        assert_eq!(viewer.pump(&mut session), 0);

        viewer.start(&mut session);
        assert!(session.is_running());
        assert_eq!(viewer.pump(&mut session), 2);
        assert!(viewer.scene().is_empty());

        viewer.pause(&mut session);
        assert!(!session.is_running());
    }
}
