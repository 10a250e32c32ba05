//! Recording observer sink.
//!
//! `RecordingSpectator` captures oversight events instead of forwarding
//! them anywhere, so tests can assert on exactly what the engine chose
//! to mirror and in what order.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use veil_core::SpectatorEvent;
use veil_service::{ObserverSink, UserProfile};

/// One recorded observation: the originating profile, when the transport
/// knew it, and the mirrored event.
pub type Observation = (Option<UserProfile>, SpectatorEvent);

/// [`ObserverSink`] that appends every event to an in-memory log.
///
/// Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingSpectator {
    log: Arc<Mutex<Vec<Observation>>>,
}

impl RecordingSpectator {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (a thread panicked while
    /// holding the lock). This is acceptable for test code.
    #[allow(clippy::expect_used)]
    fn locked(&self) -> MutexGuard<'_, Vec<Observation>> {
        self.log.lock().expect("Mutex poisoned")
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Vec<SpectatorEvent> {
        self.locked().iter().map(|(_, event)| event.clone()).collect()
    }

    /// All recorded observations with their origin profiles.
    pub fn observations(&self) -> Vec<Observation> {
        self.locked().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.locked().len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.locked().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.locked().clear();
    }
}

#[async_trait]
impl ObserverSink for RecordingSpectator {
    async fn observe(&self, origin: Option<&UserProfile>, event: SpectatorEvent) {
        self.locked().push((origin.cloned(), event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_events_in_order() {
        let spectator = RecordingSpectator::new();

        spectator.observe(None, SpectatorEvent::SearchEntered { user: 1 }).await;
        spectator.observe(None, SpectatorEvent::Matched { a: 1, b: 2 }).await;

        assert_eq!(spectator.events(), vec![
            SpectatorEvent::SearchEntered { user: 1 },
            SpectatorEvent::Matched { a: 1, b: 2 },
        ]);
    }

    #[tokio::test]
    async fn keeps_origin_profile() {
        let spectator = RecordingSpectator::new();
        let profile = UserProfile {
            id: 3,
            username: Some("ghost".to_owned()),
            full_name: "Ghost Writer".to_owned(),
        };

        spectator.observe(Some(&profile), SpectatorEvent::Started { user: 3 }).await;

        let observations = spectator.observations();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].0.as_ref().map(|p| p.id), Some(3));
    }

    #[tokio::test]
    async fn clear_empties_the_log() {
        let spectator = RecordingSpectator::new();
        spectator.observe(None, SpectatorEvent::Stopped { user: 4 }).await;
        assert!(!spectator.is_empty());

        spectator.clear();

        assert!(spectator.is_empty());
        assert_eq!(spectator.len(), 0);
    }
}
