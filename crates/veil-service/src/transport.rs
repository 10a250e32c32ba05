//! Outbound delivery seam.
//!
//! The engine never talks to a wire. Everything it wants sent goes
//! through [`Transport`], implemented by the embedder for whatever
//! channel carries the chat. Delivery is best-effort single-attempt:
//! the service applies a bounded timeout and never retries.

use async_trait::async_trait;
use thiserror::Error;
use veil_core::{MessagePayload, UserId};

use crate::ui::Menu;

/// Delivery failure classification.
///
/// The distinction drives pairing state: a permanent rejection tears the
/// chat down, a transient fault leaves it intact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The recipient permanently rejects delivery (left or blocked the
    /// channel). Never retried.
    #[error("recipient unreachable")]
    Unreachable,

    /// Temporary or malformed-request fault. The message may be lost;
    /// state is unchanged.
    #[error("transient delivery failure: {0}")]
    Transient(String),
}

/// One message ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Rendered service notification.
    Notice {
        /// Text to show the recipient.
        text: String,
        /// Menu to attach, for transports that render keyboards.
        menu: Option<Menu>,
    },
    /// Anonymous copy of a partner's content.
    Relay(MessagePayload),
}

/// Identity metadata the transport attaches to inbound traffic.
///
/// Used only when rendering oversight events. It never reaches the
/// other chat participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Transport user id, matching the engine's [`UserId`].
    pub id: UserId,
    /// Public handle, when the user has one.
    pub username: Option<String>,
    /// Display name.
    pub full_name: String,
}

/// Outbound capability implemented by the embedder.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one outbound message. Single attempt, no retry.
    async fn deliver(&self, to: UserId, message: Outbound) -> Result<(), DeliveryError>;

    /// Best-effort typing indicator. Failures are the implementation's
    /// to swallow. Default: no-op.
    async fn typing(&self, to: UserId) {
        let _ = to;
    }
}
