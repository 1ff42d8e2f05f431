//! World-tracking sessions and the delegate they report anchors to.

use std::collections::VecDeque;

use planeview_core::{Anchor, PlaneDetection, ViewerOptions};

/// World-tracking configuration a session is run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldTrackingConfiguration {
    pub plane_detection: PlaneDetection,
}

impl From<&ViewerOptions> for WorldTrackingConfiguration {
    fn from(options: &ViewerOptions) -> Self {
        Self {
            plane_detection: options.plane_detection,
        }
    }
}

/// Receives anchor event batches from a [`TrackingSession`].
///
/// Batches may mix anchor kinds; implementors pick out the ones they handle.
pub trait SessionDelegate {
    fn session_did_add(&mut self, anchors: &[Anchor]);
    fn session_did_update(&mut self, anchors: &[Anchor]);
    fn session_did_remove(&mut self, anchors: &[Anchor]);
}

/// A source of anchor events that can be started and paused.
pub trait TrackingSession {
    /// Starts (or restarts) tracking with `configuration`.
    fn run(&mut self, configuration: WorldTrackingConfiguration);

    /// Stops delivering events until the next [`run`](Self::run).
    fn pause(&mut self);

    fn is_running(&self) -> bool;

    /// Delivers pending event batches to `delegate`, in order.
    ///
    /// Returns the number of batches delivered.
    fn deliver(&mut self, delegate: &mut dyn SessionDelegate) -> usize;
}

/// One batch of anchor events.
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorEvent {
    Added(Vec<Anchor>),
    Updated(Vec<Anchor>),
    Removed(Vec<Anchor>),
}

impl AnchorEvent {
    fn anchors_mut(&mut self) -> &mut Vec<Anchor> {
        match self {
            AnchorEvent::Added(anchors)
            | AnchorEvent::Updated(anchors)
            | AnchorEvent::Removed(anchors) => anchors,
        }
    }

    fn dispatch(&self, delegate: &mut dyn SessionDelegate) {
        match self {
            AnchorEvent::Added(anchors) => delegate.session_did_add(anchors),
            AnchorEvent::Updated(anchors) => delegate.session_did_update(anchors),
            AnchorEvent::Removed(anchors) => delegate.session_did_remove(anchors),
        }
    }
}

/// Replays recorded event batches.
///
/// Batches queue up while the session is paused and are delivered once it
/// runs. Plane anchors whose alignment the configuration does not detect are
/// left out, the way a live tracker would never report them.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    pending: VecDeque<AnchorEvent>,
    configuration: Option<WorldTrackingConfiguration>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session that will replay `events` in order.
    pub fn from_events(events: impl IntoIterator<Item = AnchorEvent>) -> Self {
        Self {
            pending: events.into_iter().collect(),
            configuration: None,
        }
    }

    /// Queues a batch behind any already pending.
    pub fn push(&mut self, event: AnchorEvent) {
        self.pending.push_back(event);
    }

    /// Number of batches not yet delivered.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Delivers the next pending batch, if the session is running.
    pub fn step(&mut self, delegate: &mut dyn SessionDelegate) -> bool {
        let Some(configuration) = self.configuration else {
            return false;
        };
        let Some(mut event) = self.pending.pop_front() else {
            return false;
        };

        let detection = configuration.plane_detection;
        event.anchors_mut().retain(|anchor| {
            anchor
                .as_plane()
                .is_none_or(|plane| detection.includes(plane.alignment))
        });
        event.dispatch(delegate);
        true
    }
}

impl TrackingSession for ScriptedSession {
    fn run(&mut self, configuration: WorldTrackingConfiguration) {
        log::debug!(
            "session running (horizontal: {}, vertical: {})",
            configuration.plane_detection.horizontal,
            configuration.plane_detection.vertical
        );
        self.configuration = Some(configuration);
    }

    fn pause(&mut self) {
        log::debug!("session paused with {} batches pending", self.pending.len());
        self.configuration = None;
    }

    fn is_running(&self) -> bool {
        self.configuration.is_some()
    }

    fn deliver(&mut self, delegate: &mut dyn SessionDelegate) -> usize {
        let mut delivered = 0;
        while self.step(delegate) {
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planeview_core::{
        AnchorIdentifier, Classification, Mat4, PlaneAlignment, PlaneAnchor, PlaneGeometry, Vec3,
    };

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, usize)>,
    }

    impl SessionDelegate for Recorder {
        fn session_did_add(&mut self, anchors: &[Anchor]) {
            self.calls.push(("add", anchors.len()));
        }
        fn session_did_update(&mut self, anchors: &[Anchor]) {
            self.calls.push(("update", anchors.len()));
        }
        fn session_did_remove(&mut self, anchors: &[Anchor]) {
            self.calls.push(("remove", anchors.len()));
        }
    }

    fn plane(alignment: PlaneAlignment) -> Anchor {
        PlaneAnchor::new(
            AnchorIdentifier::new(),
            Classification::Unknown,
            Vec3::ZERO,
            PlaneGeometry::default(),
        )
        .with_alignment(alignment)
        .into()
    }

    #[test]
    fn test_paused_session_holds_events() {
        let mut session = ScriptedSession::from_events([AnchorEvent::Added(vec![])]);
        let mut recorder = Recorder::default();

        assert!(!session.is_running());
        assert_eq!(session.deliver(&mut recorder), 0);
        assert_eq!(session.pending(), 1);

        session.run(WorldTrackingConfiguration::default());
        assert_eq!(session.deliver(&mut recorder), 1);
        assert_eq!(recorder.calls, vec![("add", 0)]);
    }

    #[test]
    fn test_batches_delivered_in_order() {
        let a = plane(PlaneAlignment::Horizontal);
        let mut session = ScriptedSession::from_events([
            AnchorEvent::Added(vec![a.clone()]),
            AnchorEvent::Updated(vec![a.clone()]),
            AnchorEvent::Removed(vec![a]),
        ]);
        session.run(WorldTrackingConfiguration::default());

        let mut recorder = Recorder::default();
        assert_eq!(session.deliver(&mut recorder), 3);
        assert_eq!(
            recorder.calls,
            vec![("add", 1), ("update", 1), ("remove", 1)]
        );
    }

    #[test]
    fn test_pause_stops_delivery() {
        let mut session = ScriptedSession::from_events([
            AnchorEvent::Added(vec![]),
            AnchorEvent::Added(vec![]),
        ]);
        let mut recorder = Recorder::default();

        session.run(WorldTrackingConfiguration::default());
        assert!(session.step(&mut recorder));
        session.pause();
        assert!(!session.step(&mut recorder));
        assert_eq!(session.pending(), 1);
    }

    #[test]
    fn test_undetected_alignment_filtered() {
        let other = Anchor::Other {
            identifier: AnchorIdentifier::new(),
            transform: Mat4::IDENTITY,
        };
        let mut session = ScriptedSession::from_events([AnchorEvent::Added(vec![
            plane(PlaneAlignment::Horizontal),
            plane(PlaneAlignment::Vertical),
            other,
        ])]);
        session.run(WorldTrackingConfiguration {
            plane_detection: PlaneDetection {
                horizontal: true,
                vertical: false,
            },
        });

        let mut recorder = Recorder::default();
        session.deliver(&mut recorder);
        // Non-plane anchors pass through to the delegate.
        assert_eq!(recorder.calls, vec![("add", 2)]);
    }
}
