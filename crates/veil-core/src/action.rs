//! Outbound vocabulary of the engine.
//!
//! Every state transition is described by a list of [`Action`]s for the
//! caller to execute after releasing the engine lock. Actions carry
//! semantic values, not rendered text: [`Notice`] names what a user
//! should be told and [`SpectatorEvent`] names what the oversight
//! channel should see. Rendering both is the embedder's concern.

use serde::{Deserialize, Serialize};

use crate::error::UserError;
use crate::types::{MessagePayload, UserId};

/// Notification for a single user, rendered by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// Search started, waiting for a partner.
    SearchStarted,
    /// Search was already in progress.
    StillSearching,
    /// A search was requested while chatting.
    AlreadyInChat,
    /// Search cancelled acknowledgement.
    SearchCancelled,
    /// A partner was found.
    Matched,
    /// The partner skipped to a new chat; the recipient is re-queued.
    PartnerLeft,
    /// Acknowledgement for the user who skipped; they are re-queued.
    LookingForNewPartner,
    /// The chat ended and the recipient is back at rest.
    ChatEnded,
    /// A chat-only request arrived while not chatting.
    NotInChat,
    /// The partner cannot be reached; the chat was torn down.
    PartnerUnavailable,
    /// Report acknowledgement.
    ReportReceived,
}

impl From<UserError> for Notice {
    fn from(error: UserError) -> Self {
        match error {
            UserError::AlreadyInChat => Self::AlreadyInChat,
            UserError::AlreadySearching => Self::StillSearching,
            UserError::NotInChat => Self::NotInChat,
        }
    }
}

/// Event copy for the oversight channel.
///
/// Carries user ids only. The observer layer decides how much identity
/// it attaches when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpectatorEvent {
    /// A user opened the service.
    Started {
        /// Acting user.
        user: UserId,
    },
    /// A user entered the wait queue.
    SearchEntered {
        /// Acting user.
        user: UserId,
    },
    /// A user left the wait queue before being matched.
    SearchCancelled {
        /// Acting user.
        user: UserId,
    },
    /// Two users were paired.
    Matched {
        /// First of the pair, in queue order.
        a: UserId,
        /// Second of the pair.
        b: UserId,
    },
    /// A user skipped to the next partner.
    Skipped {
        /// Acting user.
        user: UserId,
        /// The partner who was left behind.
        former: UserId,
    },
    /// A user ended their chat.
    Stopped {
        /// Acting user.
        user: UserId,
    },
    /// A user submitted an abuse report.
    ReportSubmitted {
        /// Reporting user.
        user: UserId,
        /// Current partner at report time, when chatting.
        partner: Option<UserId>,
    },
    /// A message was successfully relayed.
    Relayed {
        /// Sending user.
        from: UserId,
        /// Bounded preview of the content.
        preview: String,
    },
}

/// One unit of work for the embedder to execute outside the engine lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Deliver a notification to a user.
    Notify {
        /// Recipient.
        user: UserId,
        /// What to tell them.
        notice: Notice,
    },
    /// Copy a message payload to a chat partner.
    ///
    /// `mirror` is the observer event to emit only after delivery
    /// succeeds. `sender` is carried for failure bookkeeping; the
    /// recipient must never learn it.
    Relay {
        /// Originating user, for delivery-failure follow-up only.
        sender: UserId,
        /// Recipient.
        to: UserId,
        /// Content to copy.
        payload: MessagePayload,
        /// Observer event to emit on delivery success.
        mirror: SpectatorEvent,
    },
    /// Emit an observer event.
    Mirror(SpectatorEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_map_to_guidance_notices() {
        assert_eq!(Notice::from(UserError::AlreadyInChat), Notice::AlreadyInChat);
        assert_eq!(Notice::from(UserError::AlreadySearching), Notice::StillSearching);
        assert_eq!(Notice::from(UserError::NotInChat), Notice::NotInChat);
    }
}
