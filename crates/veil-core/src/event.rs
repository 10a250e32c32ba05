//! Inbound events consumed by the engine.

use serde::{Deserialize, Serialize};

use crate::types::{MessagePayload, UserId};

/// One inbound event for [`ChatEngine::process`](crate::ChatEngine::process).
///
/// User-initiated variants come from command and menu handlers. The two
/// delivery-feedback variants come from the embedder's executor after an
/// outbound call failed permanently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A user wants a partner.
    EnterSearch {
        /// Acting user.
        user: UserId,
    },
    /// A user stopped waiting.
    CancelSearch {
        /// Acting user.
        user: UserId,
    },
    /// A user wants to swap their current partner for a new one.
    Skip {
        /// Acting user.
        user: UserId,
    },
    /// A user ended their chat.
    EndChat {
        /// Acting user.
        user: UserId,
    },
    /// A user sent content for their partner.
    Forward {
        /// Sending user.
        user: UserId,
        /// Content to relay.
        payload: MessagePayload,
    },
    /// A user submitted an abuse report.
    Report {
        /// Reporting user.
        user: UserId,
    },
    /// A relayed message could not be delivered permanently.
    RelayFailed {
        /// User whose message failed.
        sender: UserId,
        /// Recipient that rejected delivery.
        recipient: UserId,
    },
    /// A notification could not be delivered permanently.
    NotifyFailed {
        /// Recipient that rejected delivery.
        recipient: UserId,
    },
}
