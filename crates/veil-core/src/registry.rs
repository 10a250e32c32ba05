//! User registry for lifecycle state and partner link tracking.
//!
//! The registry maintains two structures:
//! - `partners`: symmetric partner links, stored in both directions for
//!   O(1) lookup from either side
//! - `searching`: the set of users currently waiting for a partner
//!
//! A user never appears in both structures at once. Mutators are
//! crate-private: only the engine changes links, and only inside its
//! single mutual-exclusion domain. The registry itself performs no
//! locking.

use std::collections::{HashMap, HashSet};

use crate::types::{UserId, UserState};

/// Registry tracking which users are searching and who is paired with whom.
///
/// Read accessors never fail: users the registry has not seen are `Idle`.
#[derive(Debug, Default)]
pub struct UserRegistry {
    /// User → current partner. Symmetric: an entry `a → b` always has a
    /// mirror entry `b → a`.
    partners: HashMap<UserId, UserId>,
    /// Users currently waiting for a match.
    searching: HashSet<UserId>,
}

impl UserRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state of a user. Unknown users are `Idle`.
    pub fn state(&self, user: UserId) -> UserState {
        if self.partners.contains_key(&user) {
            UserState::Chatting
        } else if self.searching.contains(&user) {
            UserState::Searching
        } else {
            UserState::Idle
        }
    }

    /// Current partner of a user, if they are chatting.
    pub fn partner(&self, user: UserId) -> Option<UserId> {
        self.partners.get(&user).copied()
    }

    /// Mark a user as searching.
    ///
    /// Returns `false` if the user is already searching or chatting.
    pub(crate) fn set_searching(&mut self, user: UserId) -> bool {
        if self.partners.contains_key(&user) {
            return false;
        }
        self.searching.insert(user)
    }

    /// Clear a user's searching state.
    ///
    /// Returns `true` if the user was searching.
    pub(crate) fn clear_searching(&mut self, user: UserId) -> bool {
        self.searching.remove(&user)
    }

    /// Link two users as chat partners, clearing their searching state.
    ///
    /// Returns `false` without mutating if `a == b` or either user is
    /// already linked.
    pub(crate) fn link(&mut self, a: UserId, b: UserId) -> bool {
        if a == b || self.partners.contains_key(&a) || self.partners.contains_key(&b) {
            return false;
        }
        self.searching.remove(&a);
        self.searching.remove(&b);
        self.partners.insert(a, b);
        self.partners.insert(b, a);
        true
    }

    /// Dissolve a user's partner link in both directions.
    ///
    /// Returns the former partner, or `None` if the user was not chatting.
    pub(crate) fn unlink(&mut self, user: UserId) -> Option<UserId> {
        let partner = self.partners.remove(&user)?;
        let back = self.partners.remove(&partner);
        debug_assert_eq!(back, Some(user), "partner link must be symmetric");
        Some(partner)
    }

    /// All partner map entries. Symmetric pairs appear once per direction.
    pub fn links(&self) -> impl Iterator<Item = (UserId, UserId)> + '_ {
        self.partners.iter().map(|(&user, &partner)| (user, partner))
    }

    /// All users currently searching, in no particular order.
    pub fn searching_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.searching.iter().copied()
    }

    /// Number of users currently searching.
    pub fn searching_count(&self) -> usize {
        self.searching.len()
    }

    /// Number of users currently chatting. Always even.
    pub fn chatting_count(&self) -> usize {
        self.partners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_is_idle() {
        let registry = UserRegistry::new();
        assert_eq!(registry.state(7), UserState::Idle);
        assert_eq!(registry.partner(7), None);
    }

    #[test]
    fn set_searching_transitions_state() {
        let mut registry = UserRegistry::new();

        assert!(registry.set_searching(1));
        assert_eq!(registry.state(1), UserState::Searching);
        assert_eq!(registry.searching_count(), 1);
    }

    #[test]
    fn set_searching_twice_fails() {
        let mut registry = UserRegistry::new();

        assert!(registry.set_searching(1));
        assert!(!registry.set_searching(1));
        assert_eq!(registry.searching_count(), 1);
    }

    #[test]
    fn set_searching_while_chatting_fails() {
        let mut registry = UserRegistry::new();

        registry.link(1, 2);
        assert!(!registry.set_searching(1));
        assert_eq!(registry.state(1), UserState::Chatting);
    }

    #[test]
    fn link_is_symmetric() {
        let mut registry = UserRegistry::new();

        registry.set_searching(1);
        registry.set_searching(2);
        assert!(registry.link(1, 2));

        assert_eq!(registry.state(1), UserState::Chatting);
        assert_eq!(registry.state(2), UserState::Chatting);
        assert_eq!(registry.partner(1), Some(2));
        assert_eq!(registry.partner(2), Some(1));
        assert_eq!(registry.searching_count(), 0);
        assert_eq!(registry.chatting_count(), 2);
    }

    #[test]
    fn link_rejects_self_match() {
        let mut registry = UserRegistry::new();

        assert!(!registry.link(1, 1));
        assert_eq!(registry.state(1), UserState::Idle);
    }

    #[test]
    fn link_rejects_already_linked_user() {
        let mut registry = UserRegistry::new();

        registry.link(1, 2);
        assert!(!registry.link(1, 3));
        assert!(!registry.link(3, 2));
        assert_eq!(registry.partner(1), Some(2));
        assert_eq!(registry.state(3), UserState::Idle);
    }

    #[test]
    fn unlink_clears_both_directions() {
        let mut registry = UserRegistry::new();

        registry.link(1, 2);
        assert_eq!(registry.unlink(1), Some(2));

        assert_eq!(registry.state(1), UserState::Idle);
        assert_eq!(registry.state(2), UserState::Idle);
        assert_eq!(registry.partner(2), None);
        assert_eq!(registry.chatting_count(), 0);
    }

    #[test]
    fn unlink_idle_user_is_none() {
        let mut registry = UserRegistry::new();
        assert_eq!(registry.unlink(9), None);
    }
}
