//! Action execution outside the engine lock.
//!
//! Engine operations are short critical sections that return a list of
//! actions; this module executes them with the lock released so slow
//! deliveries never block unrelated pairing operations. A permanent
//! delivery failure re-enters the engine in a short follow-up critical
//! section, and any actions that follow-up produces are appended to the
//! work list. The loop is iterative so failure cascades cannot recurse.

use std::collections::VecDeque;
use std::time::Duration;

use veil_core::{Action, ChatEngine, UserId};

use crate::spectator::ObserverSink;
use crate::transport::{DeliveryError, Outbound, Transport, UserProfile};
use crate::ui;

/// Executes one batch of engine actions.
///
/// Borrows the service's collaborators for the duration of the batch.
pub(crate) struct ActionExecutor<'a> {
    pub(crate) engine: &'a tokio::sync::Mutex<ChatEngine>,
    pub(crate) transport: &'a dyn Transport,
    pub(crate) observer: &'a dyn ObserverSink,
    pub(crate) deliver_timeout: Duration,
}

impl ActionExecutor<'_> {
    /// Run every action, appending follow-ups produced by delivery
    /// failures until the work list is empty.
    pub(crate) async fn run(&self, origin: Option<&UserProfile>, actions: Vec<Action>) {
        let mut work: VecDeque<Action> = actions.into();

        while let Some(action) = work.pop_front() {
            match action {
                Action::Notify { user, notice } => {
                    let follow_up = self.send_notice(user, ui::render_notice(notice)).await;
                    work.extend(follow_up);
                },

                Action::Relay { sender, to, payload, mirror } => {
                    match self.deliver(to, Outbound::Relay(payload)).await {
                        Ok(()) => self.observer.observe(origin, mirror).await,
                        Err(DeliveryError::Unreachable) => {
                            tracing::info!(to, "Relay rejected permanently");
                            let follow_up = {
                                let mut engine = self.engine.lock().await;
                                engine.relay_failed(sender, to)
                            };
                            work.extend(follow_up);
                        },
                        Err(DeliveryError::Transient(reason)) => {
                            tracing::warn!(to, %reason, "Relay delivery failed, message lost");
                        },
                    }
                },

                Action::Mirror(event) => self.observer.observe(origin, event).await,
            }
        }
    }

    /// Deliver a notification, feeding a permanent rejection back into
    /// the engine. Returns the follow-up actions to execute.
    pub(crate) async fn send_notice(&self, user: UserId, message: Outbound) -> Vec<Action> {
        match self.deliver(user, message).await {
            Ok(()) => Vec::new(),
            Err(DeliveryError::Unreachable) => {
                tracing::info!(user, "Notification rejected permanently");
                let mut engine = self.engine.lock().await;
                engine.notify_failed(user)
            },
            Err(DeliveryError::Transient(reason)) => {
                tracing::warn!(user, %reason, "Notification delivery failed");
                Vec::new()
            },
        }
    }

    /// Single delivery attempt under the configured timeout.
    async fn deliver(&self, to: UserId, message: Outbound) -> Result<(), DeliveryError> {
        match tokio::time::timeout(self.deliver_timeout, self.transport.deliver(to, message)).await
        {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Transient("delivery timed out".to_owned())),
        }
    }
}
