//! Pairing and relay engine - Sans-IO core of the service.
//!
//! The engine ties together the state components:
//! - [`UserRegistry`] (lifecycle state and partner links)
//! - [`WaitQueue`] (FIFO matching order)
//! - [`UnreachableSet`] (recipients to skip pre-emptively)
//!
//! # Architecture
//!
//! ```text
//! ChatEngine
//!   ├─ registry: UserRegistry
//!   ├─ queue: WaitQueue
//!   └─ unreachable: UnreachableSet
//! ```
//!
//! # Event Flow
//!
//! 1. The embedder translates inbound traffic into [`ChatEvent`]s
//! 2. `ChatEngine` processes events and produces [`Action`]s
//! 3. The embedder executes actions (delivery, observer mirror) outside
//!    the engine lock and feeds permanent delivery failures back in as
//!    `RelayFailed`/`NotifyFailed` events
//!
//! Every method is an atomic unit: it either applies a full transition
//! or rejects with no side effects. The engine performs no locking and
//! no I/O; callers serialize access through a single mutual-exclusion
//! domain.

use crate::action::{Action, Notice, SpectatorEvent};
use crate::error::UserError;
use crate::event::ChatEvent;
use crate::queue::WaitQueue;
use crate::registry::UserRegistry;
use crate::types::{MessagePayload, UserId, UserState};
use crate::unreachable::UnreachableSet;

/// Sans-IO pairing and relay engine.
///
/// All methods return actions for the caller to execute rather than
/// performing delivery directly.
#[derive(Debug, Default)]
pub struct ChatEngine {
    /// Lifecycle state and partner links.
    registry: UserRegistry,
    /// Users waiting to be matched, in arrival order.
    queue: WaitQueue,
    /// Recipients whose deliveries recently failed permanently.
    unreachable: UnreachableSet,
}

impl ChatEngine {
    /// Create a new engine with no users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one inbound event and return the actions to execute.
    ///
    /// Total entry point: requests that a typed method rejects with
    /// [`UserError`] become a guidance notification to the requester.
    pub fn process(&mut self, event: ChatEvent) -> Vec<Action> {
        match event {
            ChatEvent::EnterSearch { user } => {
                self.enter_search(user).unwrap_or_else(|error| self.reject(user, error))
            },
            ChatEvent::CancelSearch { user } => self.cancel_search(user),
            ChatEvent::Skip { user } => {
                self.skip(user).unwrap_or_else(|error| self.reject(user, error))
            },
            ChatEvent::EndChat { user } => self.end_chat(user),
            ChatEvent::Forward { user, payload } => {
                self.forward(user, payload).unwrap_or_else(|error| self.reject(user, error))
            },
            ChatEvent::Report { user } => self.report(user),
            ChatEvent::RelayFailed { sender, recipient } => self.relay_failed(sender, recipient),
            ChatEvent::NotifyFailed { recipient } => self.notify_failed(recipient),
        }
    }

    /// Put a user into the wait queue and match as far as possible.
    ///
    /// Rejects when the user is already chatting or already searching;
    /// a duplicate request never enqueues twice.
    pub fn enter_search(&mut self, user: UserId) -> Result<Vec<Action>, UserError> {
        self.touch(user);
        match self.registry.state(user) {
            UserState::Chatting => Err(UserError::AlreadyInChat),
            UserState::Searching => Err(UserError::AlreadySearching),
            UserState::Idle => {
                let marked = self.registry.set_searching(user);
                let queued = self.queue.enqueue(user);
                debug_assert!(marked && queued, "idle user must be absent from queue");
                tracing::debug!(user, waiting = self.queue.len(), "User entered search queue");

                let mut actions = vec![Action::Mirror(SpectatorEvent::SearchEntered { user })];
                self.notify(&mut actions, user, Notice::SearchStarted);
                self.drain(&mut actions);
                Ok(actions)
            },
        }
    }

    /// Take a user out of the wait queue.
    ///
    /// Always acknowledges; cancelling while not searching changes
    /// nothing and alters no other user's state.
    pub fn cancel_search(&mut self, user: UserId) -> Vec<Action> {
        self.touch(user);
        let mut actions = Vec::new();

        if self.registry.clear_searching(user) {
            let removed = self.queue.remove(user);
            debug_assert!(removed, "searching user must be queued");
            tracing::debug!(user, "User cancelled search");
            actions.push(Action::Mirror(SpectatorEvent::SearchCancelled { user }));
        }

        self.notify(&mut actions, user, Notice::SearchCancelled);
        actions
    }

    /// End the current chat and re-queue both sides, requester first.
    ///
    /// The requester is enqueued before the former partner, which
    /// decides who pairs with whom when the queue drains next. With
    /// nobody else waiting the two are re-matched with each other;
    /// intended behavior, see the scenario tests.
    pub fn skip(&mut self, user: UserId) -> Result<Vec<Action>, UserError> {
        self.touch(user);
        let Some(partner) = self.registry.partner(user) else {
            return Err(UserError::NotInChat);
        };

        let mut actions = Vec::new();
        self.notify(&mut actions, partner, Notice::PartnerLeft);

        self.registry.unlink(user);
        let user_marked = self.registry.set_searching(user);
        let partner_marked = self.registry.set_searching(partner);
        let user_queued = self.queue.enqueue(user);
        let partner_queued = self.queue.enqueue(partner);
        debug_assert!(
            user_marked && partner_marked && user_queued && partner_queued,
            "unlinked users must be free to re-enter the queue"
        );
        tracing::debug!(user, partner, "User skipped to next partner");

        actions.push(Action::Mirror(SpectatorEvent::Skipped { user, former: partner }));
        self.notify(&mut actions, user, Notice::LookingForNewPartner);
        self.drain(&mut actions);
        Ok(actions)
    }

    /// End the current chat and return both sides to rest.
    ///
    /// Neither side is re-queued. Ending while not chatting is a no-op
    /// that still acknowledges.
    pub fn end_chat(&mut self, user: UserId) -> Vec<Action> {
        self.touch(user);
        let mut actions = Vec::new();

        if let Some(partner) = self.registry.unlink(user) {
            tracing::debug!(user, partner, "Chat ended");
            self.notify(&mut actions, partner, Notice::ChatEnded);
            actions.push(Action::Mirror(SpectatorEvent::Stopped { user }));
        }

        self.notify(&mut actions, user, Notice::ChatEnded);
        actions
    }

    /// Relay a message payload to the sender's current partner.
    ///
    /// Emits a single [`Action::Relay`] carrying the observer event to
    /// fire on delivery success. A partner already known to be
    /// unreachable short-circuits: the chat is torn down without a
    /// delivery attempt, exactly as if the attempt had just failed.
    pub fn forward(
        &mut self,
        user: UserId,
        payload: MessagePayload,
    ) -> Result<Vec<Action>, UserError> {
        self.touch(user);
        let Some(partner) = self.registry.partner(user) else {
            return Err(match self.registry.state(user) {
                UserState::Searching => UserError::AlreadySearching,
                _ => UserError::NotInChat,
            });
        };

        if self.unreachable.is_unreachable(partner) {
            self.registry.unlink(user);
            tracing::debug!(user, partner, "Partner unreachable, chat torn down before delivery");
            let mut actions = Vec::new();
            self.notify(&mut actions, user, Notice::PartnerUnavailable);
            return Ok(actions);
        }

        let mirror = SpectatorEvent::Relayed { from: user, preview: payload.preview() };
        Ok(vec![Action::Relay { sender: user, to: partner, payload, mirror }])
    }

    /// Record an abuse report from a user.
    ///
    /// Valid in any state; the observer event carries the current
    /// partner when one exists, since that is whom the report concerns.
    pub fn report(&mut self, user: UserId) -> Vec<Action> {
        self.touch(user);
        let partner = self.registry.partner(user);
        tracing::info!(user, ?partner, "Report submitted");

        let mut actions = vec![Action::Mirror(SpectatorEvent::ReportSubmitted { user, partner })];
        self.notify(&mut actions, user, Notice::ReportReceived);
        actions
    }

    /// Apply the fallout of a permanently failed relay.
    ///
    /// Marks the recipient unreachable. The pair is torn down and the
    /// sender informed only while the two are still linked; a stale
    /// failure report (the pair already dissolved by a concurrent
    /// operation) only marks.
    pub fn relay_failed(&mut self, sender: UserId, recipient: UserId) -> Vec<Action> {
        self.unreachable.mark(recipient);
        tracing::info!(recipient, "Marked unreachable after failed relay");

        let mut actions = Vec::new();
        if self.registry.partner(sender) == Some(recipient) {
            self.registry.unlink(sender);
            tracing::debug!(sender, recipient, "Chat torn down after delivery failure");
            self.notify(&mut actions, sender, Notice::PartnerUnavailable);
        }
        actions
    }

    /// Record a permanently failed notification delivery.
    ///
    /// Marks the recipient so further sends are skipped. Pairing state
    /// is left untouched.
    pub fn notify_failed(&mut self, recipient: UserId) -> Vec<Action> {
        if self.unreachable.mark(recipient) {
            tracing::info!(recipient, "Marked unreachable after failed notification");
        }
        Vec::new()
    }

    /// Current lifecycle state of a user.
    pub fn state(&self, user: UserId) -> UserState {
        self.registry.state(user)
    }

    /// Current partner of a user, if they are chatting.
    pub fn partner(&self, user: UserId) -> Option<UserId> {
        self.registry.partner(user)
    }

    /// Whether deliveries to a user are currently skipped.
    pub fn is_unreachable(&self, user: UserId) -> bool {
        self.unreachable.is_unreachable(user)
    }

    /// Users waiting for a partner, longest-waiting first.
    pub fn waiting(&self) -> impl Iterator<Item = UserId> + '_ {
        self.queue.iter()
    }

    /// Number of users waiting for a partner.
    pub fn waiting_count(&self) -> usize {
        self.queue.len()
    }

    /// Users flagged as searching, in no particular order.
    ///
    /// Holds the same users as [`ChatEngine::waiting`]; the flag set and
    /// the queue are kept in lockstep.
    pub fn searching(&self) -> impl Iterator<Item = UserId> + '_ {
        self.registry.searching_users()
    }

    /// Number of users currently chatting.
    pub fn chatting_count(&self) -> usize {
        self.registry.chatting_count()
    }

    /// Number of users currently marked unreachable.
    pub fn unreachable_count(&self) -> usize {
        self.unreachable.len()
    }

    /// All partner map entries, one per direction.
    pub fn links(&self) -> impl Iterator<Item = (UserId, UserId)> + '_ {
        self.registry.links()
    }

    /// Clear an unreachable mark when its user initiates contact.
    ///
    /// An inbound event proves the channel works in at least one
    /// direction; the next failed delivery re-marks.
    fn touch(&mut self, user: UserId) {
        if self.unreachable.clear(user) {
            tracing::debug!(user, "Cleared unreachable mark after inbound contact");
        }
    }

    /// Append a notification unless the recipient is known unreachable.
    fn notify(&self, actions: &mut Vec<Action>, user: UserId, notice: Notice) {
        if self.unreachable.is_unreachable(user) {
            tracing::debug!(user, ?notice, "Skipped notification to unreachable user");
            return;
        }
        actions.push(Action::Notify { user, notice });
    }

    /// Match waiting users until fewer than two remain.
    ///
    /// Loops so a burst of arrivals resolves into pairs in one pass,
    /// always consuming the two longest-waiting entries.
    fn drain(&mut self, actions: &mut Vec<Action>) {
        while let Some((a, b)) = self.queue.dequeue_pair() {
            let linked = self.registry.link(a, b);
            debug_assert!(linked, "queued users must be distinct and unlinked");
            tracing::debug!(a, b, waiting = self.queue.len(), "Matched pair");

            self.notify(actions, a, Notice::Matched);
            self.notify(actions, b, Notice::Matched);
            actions.push(Action::Mirror(SpectatorEvent::Matched { a, b }));
        }
    }

    /// Turn a rejected request into a guidance notification.
    fn reject(&self, user: UserId, error: UserError) -> Vec<Action> {
        tracing::debug!(user, %error, "Rejected request");
        let mut actions = Vec::new();
        self.notify(&mut actions, user, error.into());
        actions
    }
}
