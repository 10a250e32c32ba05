//! Scriptable in-memory transport.
//!
//! `SimTransport` stands in for a real messaging channel in tests. Every
//! delivery is recorded for later assertions, and individual recipients
//! can be scripted to fail so teardown paths get exercised without a
//! network.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use veil_core::{MessagePayload, UserId};
use veil_service::{DeliveryError, Outbound, Transport};

/// One recorded delivery: the recipient and what reached them.
pub type Delivery = (UserId, Outbound);

#[derive(Default)]
struct SimState {
    delivered: Vec<Delivery>,
    unreachable: HashSet<UserId>,
    flaky: HashSet<UserId>,
    typing: Vec<UserId>,
}

/// In-memory [`Transport`] with scriptable per-recipient failures.
///
/// Deliveries to users marked unreachable fail permanently; users marked
/// flaky fail with a transient error. Everything that gets through lands
/// in an ordered log. Clones share the same state, so a test can keep a
/// handle while the service owns another.
#[derive(Clone, Default)]
pub struct SimTransport {
    inner: Arc<Mutex<SimState>>,
}

impl SimTransport {
    /// Create a transport where every delivery succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (a thread panicked while
    /// holding the lock). This is acceptable for test code.
    #[allow(clippy::expect_used)]
    fn locked(&self) -> MutexGuard<'_, SimState> {
        self.inner.lock().expect("Mutex poisoned")
    }

    /// Make future deliveries to `user` fail permanently.
    pub fn mark_unreachable(&self, user: UserId) {
        self.locked().unreachable.insert(user);
    }

    /// Make future deliveries to `user` fail with a transient error.
    pub fn mark_flaky(&self, user: UserId) {
        self.locked().flaky.insert(user);
    }

    /// Let deliveries to `user` succeed again.
    pub fn mark_reachable(&self, user: UserId) {
        let mut state = self.locked();
        state.unreachable.remove(&user);
        state.flaky.remove(&user);
    }

    /// All recorded deliveries, oldest first.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.locked().delivered.clone()
    }

    /// Messages delivered to one user, oldest first.
    pub fn deliveries_to(&self, user: UserId) -> Vec<Outbound> {
        self.locked()
            .delivered
            .iter()
            .filter(|(to, _)| *to == user)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Notice texts delivered to one user, oldest first.
    pub fn notices_to(&self, user: UserId) -> Vec<String> {
        self.deliveries_to(user)
            .into_iter()
            .filter_map(|message| match message {
                Outbound::Notice { text, .. } => Some(text),
                Outbound::Relay(_) => None,
            })
            .collect()
    }

    /// Relayed payloads delivered to one user, oldest first.
    pub fn relays_to(&self, user: UserId) -> Vec<MessagePayload> {
        self.deliveries_to(user)
            .into_iter()
            .filter_map(|message| match message {
                Outbound::Relay(payload) => Some(payload),
                Outbound::Notice { .. } => None,
            })
            .collect()
    }

    /// Users that received a typing indicator, oldest first.
    pub fn typing_log(&self) -> Vec<UserId> {
        self.locked().typing.clone()
    }

    /// Forget recorded traffic. Failure scripts stay in place.
    pub fn clear_log(&self) {
        let mut state = self.locked();
        state.delivered.clear();
        state.typing.clear();
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn deliver(&self, to: UserId, message: Outbound) -> Result<(), DeliveryError> {
        let mut state = self.locked();
        if state.unreachable.contains(&to) {
            return Err(DeliveryError::Unreachable);
        }
        if state.flaky.contains(&to) {
            return Err(DeliveryError::Transient("simulated outage".to_owned()));
        }
        state.delivered.push((to, message));
        Ok(())
    }

    async fn typing(&self, to: UserId) {
        self.locked().typing.push(to);
    }
}
