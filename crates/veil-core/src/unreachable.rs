//! Tracker for peers whose deliveries recently failed permanently.
//!
//! Membership is advisory: outbound paths consult it to skip delivery
//! attempts that are known to fail, instead of paying for the failed
//! call. A mark is cleared as soon as the user initiates contact again,
//! since that proves the channel works in at least one direction and the
//! next delivery attempt will re-mark on failure.

use std::collections::HashSet;

use crate::types::UserId;

/// Set of users currently considered undeliverable.
#[derive(Debug, Default)]
pub struct UnreachableSet {
    unreachable: HashSet<UserId>,
}

impl UnreachableSet {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user as undeliverable.
    ///
    /// Returns `true` if the user was newly marked.
    pub(crate) fn mark(&mut self, user: UserId) -> bool {
        self.unreachable.insert(user)
    }

    /// Clear a user's mark. Returns `true` if the user was marked.
    pub(crate) fn clear(&mut self, user: UserId) -> bool {
        self.unreachable.remove(&user)
    }

    /// Whether deliveries to this user should be skipped.
    pub fn is_unreachable(&self, user: UserId) -> bool {
        self.unreachable.contains(&user)
    }

    /// Number of users currently marked.
    pub fn len(&self) -> usize {
        self.unreachable.len()
    }

    /// Whether no user is currently marked.
    pub fn is_empty(&self) -> bool {
        self.unreachable.is_empty()
    }
}
