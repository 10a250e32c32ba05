//! Invariant checking for pairing state.
//!
//! Invariants are properties that must hold after every engine step, no
//! matter which events arrived in which order. Scenario tests check
//! specific flows; the checks here verify the structural rules behind
//! all of them.
//!
//! # Architecture
//!
//! Checks run against an [`EngineSnapshot`] captured from a live
//! [`ChatEngine`], not against the engine itself, so a single capture is
//! examined atomically. Use [`InvariantRegistry::standard()`] for the
//! full pairing rule set.

use std::collections::{BTreeSet, HashMap, HashSet};

use veil_core::{ChatEngine, UserId};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// Observable pairing state captured at one point in time.
#[derive(Debug, Clone, Default)]
pub struct EngineSnapshot {
    /// Waiting users in queue order, longest-waiting first.
    pub queue: Vec<UserId>,
    /// Users flagged as searching.
    pub searching: BTreeSet<UserId>,
    /// Partner map entries, one per direction.
    pub links: Vec<(UserId, UserId)>,
}

impl EngineSnapshot {
    /// Capture the observable state of a live engine.
    pub fn capture(engine: &ChatEngine) -> Self {
        Self {
            queue: engine.waiting().collect(),
            searching: engine.searching().collect(),
            links: engine.links().collect(),
        }
    }

    /// Create an empty snapshot (no users).
    pub fn empty() -> Self {
        Self::default()
    }
}

/// An invariant that can be checked against a pairing snapshot.
///
/// Invariants capture WHAT must be true, not specific test scenarios.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the captured state.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &EngineSnapshot) -> InvariantResult;
}

/// The queue and the searching flag describe the same set of users.
///
/// Every queued user carries the flag, no user is queued twice, and the
/// flag never outlives the queue entry.
pub struct QueueConsistency;

impl Invariant for QueueConsistency {
    fn name(&self) -> &'static str {
        "queue-consistency"
    }

    fn check(&self, state: &EngineSnapshot) -> InvariantResult {
        let mut seen = HashSet::new();
        for &user in &state.queue {
            if !seen.insert(user) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("user {user} queued more than once"),
                });
            }
            if !state.searching.contains(&user) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("user {user} queued without the searching flag"),
                });
            }
        }

        if state.searching.len() != state.queue.len() {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{} users flagged searching but {} queued",
                    state.searching.len(),
                    state.queue.len()
                ),
            });
        }

        Ok(())
    }
}

/// Every partner link is mirrored: `a -> b` implies `b -> a`.
pub struct PartnerSymmetry;

impl Invariant for PartnerSymmetry {
    fn name(&self) -> &'static str {
        "partner-symmetry"
    }

    fn check(&self, state: &EngineSnapshot) -> InvariantResult {
        let mut partners = HashMap::new();
        for &(user, partner) in &state.links {
            if partners.insert(user, partner).is_some() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("user {user} linked to more than one partner"),
                });
            }
        }

        for (&user, &partner) in &partners {
            if partners.get(&partner) != Some(&user) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "user {user} links to {partner} but {partner} does not link back"
                    ),
                });
            }
        }

        Ok(())
    }
}

/// No user is ever paired with themselves.
pub struct NoSelfPairing;

impl Invariant for NoSelfPairing {
    fn name(&self) -> &'static str {
        "no-self-pairing"
    }

    fn check(&self, state: &EngineSnapshot) -> InvariantResult {
        for &(user, partner) in &state.links {
            if user == partner {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("user {user} paired with themselves"),
                });
            }
        }
        Ok(())
    }
}

/// Searching and chatting are mutually exclusive.
pub struct SearchChatExclusion;

impl Invariant for SearchChatExclusion {
    fn name(&self) -> &'static str {
        "search-chat-exclusion"
    }

    fn check(&self, state: &EngineSnapshot) -> InvariantResult {
        for &(user, _) in &state.links {
            if state.searching.contains(&user) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("user {user} is both searching and chatting"),
                });
            }
        }
        Ok(())
    }
}

/// Registry of invariants to check.
///
/// Collects multiple invariants and runs them all against a snapshot.
/// Use [`InvariantRegistry::standard()`] for the pairing rule set.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard pairing invariants.
    ///
    /// Includes:
    /// - [`QueueConsistency`]: queue and searching flag agree
    /// - [`PartnerSymmetry`]: links are mirrored
    /// - [`NoSelfPairing`]: nobody chats with themselves
    /// - [`SearchChatExclusion`]: searching and chatting never overlap
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(QueueConsistency);
        registry.add(PartnerSymmetry);
        registry.add(NoSelfPairing);
        registry.add(SearchChatExclusion);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &EngineSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking on any violation.
    ///
    /// Use this in tests where you want immediate failure with context.
    ///
    /// # Panics
    ///
    /// Panics with the full violation list if any invariant fails.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &EngineSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use veil_core::ChatEvent;

    use super::*;

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn empty_snapshot_passes_invariants() {
        let registry = InvariantRegistry::standard();
        let snapshot = EngineSnapshot::empty();
        assert!(registry.check_all(&snapshot).is_ok());
    }

    #[test]
    fn live_engine_snapshot_passes_invariants() {
        let mut engine = ChatEngine::new();
        for user in 1..=5 {
            engine.process(ChatEvent::EnterSearch { user });
        }
        engine.process(ChatEvent::Skip { user: 1 });

        let registry = InvariantRegistry::standard();
        registry.assert_all(&EngineSnapshot::capture(&engine), "after staged flow");
    }

    #[test]
    fn asymmetric_link_is_flagged() {
        let snapshot =
            EngineSnapshot { queue: vec![], searching: BTreeSet::new(), links: vec![(1, 2)] };

        let result = PartnerSymmetry.check(&snapshot);

        let violation = result.unwrap_err();
        assert_eq!(violation.invariant, "partner-symmetry");
        assert!(violation.message.contains("does not link back"));
    }

    #[test]
    fn duplicate_queue_entry_is_flagged() {
        let snapshot = EngineSnapshot {
            queue: vec![3, 3],
            searching: BTreeSet::from([3]),
            links: vec![],
        };

        let result = QueueConsistency.check(&snapshot);

        assert!(result.unwrap_err().message.contains("queued more than once"));
    }

    #[test]
    fn stray_searching_flag_is_flagged() {
        let snapshot = EngineSnapshot {
            queue: vec![1],
            searching: BTreeSet::from([1, 2]),
            links: vec![],
        };

        let result = QueueConsistency.check(&snapshot);

        assert!(result.unwrap_err().message.contains("flagged searching"));
    }

    #[test]
    fn self_pair_is_flagged() {
        let snapshot =
            EngineSnapshot { queue: vec![], searching: BTreeSet::new(), links: vec![(4, 4)] };

        let result = NoSelfPairing.check(&snapshot);

        assert_eq!(result.unwrap_err().invariant, "no-self-pairing");
    }

    #[test]
    fn searching_while_chatting_is_flagged() {
        let snapshot = EngineSnapshot {
            queue: vec![1],
            searching: BTreeSet::from([1]),
            links: vec![(1, 2), (2, 1)],
        };

        let result = SearchChatExclusion.check(&snapshot);

        assert_eq!(result.unwrap_err().invariant, "search-chat-exclusion");
    }
}
