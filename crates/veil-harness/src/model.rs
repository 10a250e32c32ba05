//! Reference model of the pairing lifecycle.
//!
//! `ModelWorld` re-implements the pairing rules with the most naive data
//! structures that can express them: a plain `Vec` queue and a `BTreeMap`
//! partner table, all linear scans. Operations are applied to both the
//! model and the real engine, and their observable states are compared.
//! Where the two disagree, the model is the oracle.

use std::collections::{BTreeMap, BTreeSet};

use arbitrary::Arbitrary;
use veil_core::MessagePayload;

/// User identifier in the model (small space keeps tests tractable).
pub type ModelUserId = u8;

/// Compact message content for testing.
///
/// The pairing rules never inspect content, so a single seed byte is
/// enough to fan out across the payload variants.
#[derive(Debug, Clone, Arbitrary)]
pub struct SmallMessage {
    /// Seed expanded deterministically into a payload.
    pub seed: u8,
}

impl SmallMessage {
    /// Expand the seed into a concrete payload.
    pub fn to_payload(&self) -> MessagePayload {
        match self.seed % 3 {
            0 => MessagePayload::Text(format!("message {}", self.seed)),
            1 => MessagePayload::Sticker { file: format!("sticker-{}", self.seed) },
            _ => MessagePayload::Photo {
                file: format!("photo-{}", self.seed),
                caption: (self.seed % 2 == 0).then(|| format!("caption {}", self.seed)),
            },
        }
    }
}

/// Operations that can be applied to the pairing system.
///
/// Each operation targets one or two users. Operations are small and
/// composable so proptest can explore interesting interleavings.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// User asks for a partner.
    EnterSearch {
        /// User performing the operation.
        user: ModelUserId,
    },

    /// User abandons the wait queue.
    CancelSearch {
        /// User performing the operation.
        user: ModelUserId,
    },

    /// User trades the current partner for a fresh match.
    Skip {
        /// User performing the operation.
        user: ModelUserId,
    },

    /// User ends the current chat.
    EndChat {
        /// User performing the operation.
        user: ModelUserId,
    },

    /// User sends content to be relayed to the partner.
    Forward {
        /// Sending user.
        user: ModelUserId,
        /// Content descriptor (kept small for efficiency).
        message: SmallMessage,
    },

    /// User files an abuse report.
    Report {
        /// Reporting user.
        user: ModelUserId,
    },

    /// A relay delivery to `recipient` failed permanently.
    RelayFailed {
        /// User whose message was being relayed.
        sender: ModelUserId,
        /// User who could not be reached.
        recipient: ModelUserId,
    },

    /// A notification delivery to `recipient` failed permanently.
    NotifyFailed {
        /// User who could not be reached.
        recipient: ModelUserId,
    },
}

/// Result of applying an operation.
///
/// Used to compare model and real system behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,

    /// Operation was rejected with an expected error.
    Error(OperationError),
}

impl OperationResult {
    /// Check if the operation succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, OperationResult::Ok)
    }

    /// Check if the operation was rejected.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}

/// Expected rejections.
///
/// Only user-initiated requests can be rejected; delivery failure
/// reports are always absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// User is already in a chat.
    AlreadyChatting,
    /// User is already waiting in the queue.
    AlreadySearching,
    /// User has no partner.
    NotChatting,
}

/// Observable state for oracle comparison.
///
/// The subset of pairing state both the model and the real engine can
/// produce, normalized for direct equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Waiting users in queue order, longest-waiting first.
    pub queue: Vec<ModelUserId>,
    /// Partner map entries, one per direction, sorted.
    pub partners: Vec<(ModelUserId, ModelUserId)>,
    /// Users currently marked unreachable, sorted.
    pub unreachable: Vec<ModelUserId>,
}

/// Reference implementation of the pairing rules.
#[derive(Debug, Clone, Default)]
pub struct ModelWorld {
    queue: Vec<ModelUserId>,
    partners: BTreeMap<ModelUserId, ModelUserId>,
    unreachable: BTreeSet<ModelUserId>,
}

impl ModelWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an operation and return the result.
    ///
    /// This is the main entry point for model-based testing. The result
    /// should match the real implementation's result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match *op {
            Operation::EnterSearch { user } => self.apply_enter_search(user),
            Operation::CancelSearch { user } => self.apply_cancel_search(user),
            Operation::Skip { user } => self.apply_skip(user),
            Operation::EndChat { user } => self.apply_end_chat(user),
            Operation::Forward { user, .. } => self.apply_forward(user),
            Operation::Report { user } => self.apply_report(user),
            Operation::RelayFailed { sender, recipient } => {
                self.apply_relay_failed(sender, recipient)
            },
            Operation::NotifyFailed { recipient } => self.apply_notify_failed(recipient),
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            queue: self.queue.clone(),
            partners: self.partners.iter().map(|(&user, &partner)| (user, partner)).collect(),
            unreachable: self.unreachable.iter().copied().collect(),
        }
    }

    /// Current partner of a user in the model.
    pub fn partner(&self, user: ModelUserId) -> Option<ModelUserId> {
        self.partners.get(&user).copied()
    }

    /// Whether the model considers a user unreachable.
    pub fn is_unreachable(&self, user: ModelUserId) -> bool {
        self.unreachable.contains(&user)
    }

    /// Inbound contact from a user clears their unreachable mark.
    fn touch(&mut self, user: ModelUserId) {
        self.unreachable.remove(&user);
    }

    /// Pair off waiting users front-to-back until fewer than two remain.
    fn pair_off(&mut self) {
        while self.queue.len() >= 2 {
            let a = self.queue.remove(0);
            let b = self.queue.remove(0);
            self.partners.insert(a, b);
            self.partners.insert(b, a);
        }
    }

    fn apply_enter_search(&mut self, user: ModelUserId) -> OperationResult {
        self.touch(user);
        if self.partners.contains_key(&user) {
            return OperationResult::Error(OperationError::AlreadyChatting);
        }
        if self.queue.contains(&user) {
            return OperationResult::Error(OperationError::AlreadySearching);
        }

        self.queue.push(user);
        self.pair_off();
        OperationResult::Ok
    }

    fn apply_cancel_search(&mut self, user: ModelUserId) -> OperationResult {
        self.touch(user);
        self.queue.retain(|&queued| queued != user);
        OperationResult::Ok
    }

    fn apply_skip(&mut self, user: ModelUserId) -> OperationResult {
        self.touch(user);
        let Some(partner) = self.partners.remove(&user) else {
            return OperationResult::Error(OperationError::NotChatting);
        };
        self.partners.remove(&partner);

        self.queue.push(user);
        self.queue.push(partner);
        self.pair_off();
        OperationResult::Ok
    }

    fn apply_end_chat(&mut self, user: ModelUserId) -> OperationResult {
        self.touch(user);
        if let Some(partner) = self.partners.remove(&user) {
            self.partners.remove(&partner);
        }
        OperationResult::Ok
    }

    fn apply_forward(&mut self, user: ModelUserId) -> OperationResult {
        self.touch(user);
        let Some(partner) = self.partners.get(&user).copied() else {
            let error = if self.queue.contains(&user) {
                OperationError::AlreadySearching
            } else {
                OperationError::NotChatting
            };
            return OperationResult::Error(error);
        };

        // A partner already known unreachable tears the chat down before
        // any delivery attempt. The mark stays on the partner.
        if self.unreachable.contains(&partner) {
            self.partners.remove(&user);
            self.partners.remove(&partner);
        }
        OperationResult::Ok
    }

    fn apply_report(&mut self, user: ModelUserId) -> OperationResult {
        self.touch(user);
        OperationResult::Ok
    }

    fn apply_relay_failed(
        &mut self,
        sender: ModelUserId,
        recipient: ModelUserId,
    ) -> OperationResult {
        self.unreachable.insert(recipient);
        if self.partners.get(&sender) == Some(&recipient) {
            self.partners.remove(&sender);
            self.partners.remove(&recipient);
        }
        OperationResult::Ok
    }

    fn apply_notify_failed(&mut self, recipient: ModelUserId) -> OperationResult {
        self.unreachable.insert(recipient);
        OperationResult::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_searchers_pair_up() {
        let mut model = ModelWorld::new();

        assert!(model.apply(&Operation::EnterSearch { user: 1 }).is_ok());
        assert!(model.apply(&Operation::EnterSearch { user: 2 }).is_ok());

        assert_eq!(model.partner(1), Some(2));
        assert_eq!(model.partner(2), Some(1));
        assert!(model.observable_state().queue.is_empty());
    }

    #[test]
    fn chatting_user_cannot_search_again() {
        let mut model = ModelWorld::new();
        model.apply(&Operation::EnterSearch { user: 1 });
        model.apply(&Operation::EnterSearch { user: 2 });

        let result = model.apply(&Operation::EnterSearch { user: 1 });

        assert_eq!(result, OperationResult::Error(OperationError::AlreadyChatting));
    }

    #[test]
    fn skip_with_empty_queue_rematches_the_pair() {
        let mut model = ModelWorld::new();
        model.apply(&Operation::EnterSearch { user: 1 });
        model.apply(&Operation::EnterSearch { user: 2 });

        assert!(model.apply(&Operation::Skip { user: 1 }).is_ok());

        assert_eq!(model.partner(1), Some(2));
    }

    #[test]
    fn skip_prefers_the_longest_waiting_user() {
        let mut model = ModelWorld::new();
        model.apply(&Operation::EnterSearch { user: 1 });
        model.apply(&Operation::EnterSearch { user: 2 });
        model.apply(&Operation::EnterSearch { user: 3 });

        model.apply(&Operation::Skip { user: 1 });

        // 3 was waiting; the skipper pairs with them, the former partner waits.
        assert_eq!(model.partner(1), Some(3));
        assert_eq!(model.observable_state().queue, vec![2]);
    }

    #[test]
    fn forward_to_unreachable_partner_dissolves_the_pair() {
        let mut model = ModelWorld::new();
        model.apply(&Operation::EnterSearch { user: 1 });
        model.apply(&Operation::EnterSearch { user: 2 });
        model.apply(&Operation::NotifyFailed { recipient: 2 });

        let result = model.apply(&Operation::Forward {
            user: 1,
            message: SmallMessage { seed: 0 },
        });

        assert!(result.is_ok());
        assert_eq!(model.partner(1), None);
        assert!(model.is_unreachable(2));
    }

    #[test]
    fn touch_clears_the_unreachable_mark() {
        let mut model = ModelWorld::new();
        model.apply(&Operation::NotifyFailed { recipient: 5 });
        assert!(model.is_unreachable(5));

        model.apply(&Operation::EnterSearch { user: 5 });

        assert!(!model.is_unreachable(5));
    }

    #[test]
    fn stale_relay_failure_only_marks() {
        let mut model = ModelWorld::new();
        model.apply(&Operation::EnterSearch { user: 1 });
        model.apply(&Operation::EnterSearch { user: 2 });
        model.apply(&Operation::EndChat { user: 1 });
        model.apply(&Operation::EnterSearch { user: 2 });
        model.apply(&Operation::EnterSearch { user: 3 });

        model.apply(&Operation::RelayFailed { sender: 1, recipient: 2 });

        // 2 moved on to a new chat; only the mark lands.
        assert_eq!(model.partner(2), Some(3));
        assert!(model.is_unreachable(2));
    }

    #[test]
    fn small_message_covers_payload_variants() {
        let text = SmallMessage { seed: 0 }.to_payload();
        let sticker = SmallMessage { seed: 1 }.to_payload();
        let photo = SmallMessage { seed: 2 }.to_payload();

        assert!(matches!(text, MessagePayload::Text(_)));
        assert!(matches!(sticker, MessagePayload::Sticker { .. }));
        assert!(matches!(photo, MessagePayload::Photo { .. }));
    }
}
