//! FIFO queue of users waiting for a partner.
//!
//! Order is enqueue order. A user appears at most once; cancellation may
//! remove from any position without disturbing the relative order of the
//! rest.

use std::collections::VecDeque;

use crate::types::UserId;

/// Ordered wait queue with at-most-once membership.
#[derive(Debug, Default)]
pub struct WaitQueue {
    waiting: VecDeque<UserId>,
}

impl WaitQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user to the back of the queue.
    ///
    /// No-op if the user is already queued. Returns `true` if the user
    /// was appended.
    pub(crate) fn enqueue(&mut self, user: UserId) -> bool {
        if self.waiting.contains(&user) {
            return false;
        }
        self.waiting.push_back(user);
        true
    }

    /// Remove a user from any position in the queue.
    ///
    /// Returns `true` if the user was present. Relative order of the
    /// remaining entries is preserved.
    pub(crate) fn remove(&mut self, user: UserId) -> bool {
        match self.waiting.iter().position(|&queued| queued == user) {
            Some(index) => {
                self.waiting.remove(index);
                true
            },
            None => false,
        }
    }

    /// Pop the two longest-waiting users, in FIFO order.
    ///
    /// Returns `None` without mutating when fewer than two are waiting.
    pub(crate) fn dequeue_pair(&mut self) -> Option<(UserId, UserId)> {
        if self.waiting.len() < 2 {
            return None;
        }
        let first = self.waiting.pop_front()?;
        let second = self.waiting.pop_front()?;
        Some((first, second))
    }

    /// Whether a user is currently queued.
    pub fn contains(&self, user: UserId) -> bool {
        self.waiting.contains(&user)
    }

    /// Number of users waiting.
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    /// Queued users in FIFO order, front first.
    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.waiting.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_preserves_fifo_order() {
        let mut queue = WaitQueue::new();

        assert!(queue.enqueue(1));
        assert!(queue.enqueue(2));
        assert!(queue.enqueue(3));

        let order: Vec<_> = queue.iter().collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_enqueue_is_noop() {
        let mut queue = WaitQueue::new();

        assert!(queue.enqueue(1));
        assert!(!queue.enqueue(1));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn remove_from_middle_keeps_order() {
        let mut queue = WaitQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);

        assert!(queue.remove(2));

        let order: Vec<_> = queue.iter().collect();
        assert_eq!(order, vec![1, 3]);
    }

    #[test]
    fn remove_absent_user_is_noop() {
        let mut queue = WaitQueue::new();
        queue.enqueue(1);

        assert!(!queue.remove(9));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn dequeue_pair_takes_longest_waiting() {
        let mut queue = WaitQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);

        assert_eq!(queue.dequeue_pair(), Some((1, 2)));
        let order: Vec<_> = queue.iter().collect();
        assert_eq!(order, vec![3]);
    }

    #[test]
    fn dequeue_pair_requires_two_waiting() {
        let mut queue = WaitQueue::new();

        assert_eq!(queue.dequeue_pair(), None);

        queue.enqueue(1);
        assert_eq!(queue.dequeue_pair(), None);
        assert_eq!(queue.len(), 1);
    }
}
