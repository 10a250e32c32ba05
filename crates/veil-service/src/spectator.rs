//! Oversight mirror.
//!
//! Every user-visible event is copied to a configured oversight chat so
//! moderators can audit the service. The mirror is fire-and-forget: its
//! own delivery failures are logged and swallowed, and they never mark
//! the oversight chat unreachable.

use std::sync::Arc;

use async_trait::async_trait;
use veil_core::{SpectatorEvent, UserId};

use crate::transport::{Outbound, Transport, UserProfile};

/// Sink for observer events.
///
/// `origin` is the profile of the acting user when the transport
/// supplied one. Implementations must never fail the caller.
#[async_trait]
pub trait ObserverSink: Send + Sync {
    /// Record one event.
    async fn observe(&self, origin: Option<&UserProfile>, event: SpectatorEvent);
}

/// Mirrors events to an oversight chat through the transport.
///
/// With no chat configured every event is dropped.
pub struct SpectatorMirror {
    transport: Arc<dyn Transport>,
    chat: Option<UserId>,
}

impl SpectatorMirror {
    /// Create a mirror delivering to `chat`, or a disabled one for `None`.
    pub fn new(transport: Arc<dyn Transport>, chat: Option<UserId>) -> Self {
        Self { transport, chat }
    }

    /// Identity prefix for an event about `user`.
    ///
    /// Falls back to the bare id when the profile is missing or belongs
    /// to a different user.
    fn meta(user: UserId, origin: Option<&UserProfile>) -> String {
        match origin {
            Some(profile) if profile.id == user => {
                let username = profile.username.as_deref().unwrap_or("—");
                format!("[id:{} | @{} | {}]", user, username, profile.full_name)
            },
            _ => format!("[id:{user} | @— | ]"),
        }
    }

    fn render(origin: Option<&UserProfile>, event: &SpectatorEvent) -> String {
        match event {
            SpectatorEvent::Started { user } => {
                format!("{} started a session", Self::meta(*user, origin))
            },
            SpectatorEvent::SearchEntered { user } => {
                format!("{} entered search queue", Self::meta(*user, origin))
            },
            SpectatorEvent::SearchCancelled { user } => {
                format!("{} cancelled search", Self::meta(*user, origin))
            },
            SpectatorEvent::Matched { a, b } => {
                format!("{} matched with id:{}", Self::meta(*a, origin), b)
            },
            SpectatorEvent::Skipped { user, former } => {
                format!("{} used Next (left partner id:{})", Self::meta(*user, origin), former)
            },
            SpectatorEvent::Stopped { user } => {
                format!("{} stopped the chat", Self::meta(*user, origin))
            },
            SpectatorEvent::ReportSubmitted { user, partner } => match partner {
                Some(partner) => format!(
                    "{} submitted a report on id:{} (manual review needed)",
                    Self::meta(*user, origin),
                    partner
                ),
                None => format!(
                    "{} submitted a report (manual review needed)",
                    Self::meta(*user, origin)
                ),
            },
            SpectatorEvent::Relayed { from, preview } => {
                format!("{} -> {}", Self::meta(*from, origin), preview)
            },
        }
    }
}

#[async_trait]
impl ObserverSink for SpectatorMirror {
    async fn observe(&self, origin: Option<&UserProfile>, event: SpectatorEvent) {
        let Some(chat) = self.chat else {
            return;
        };

        let text = Self::render(origin, &event);
        let message = Outbound::Notice { text, menu: None };
        if let Err(error) = self.transport.deliver(chat, message).await {
            tracing::warn!(%error, "Spectator delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: UserId) -> UserProfile {
        UserProfile { id, username: Some("ada".to_owned()), full_name: "Ada L".to_owned() }
    }

    #[test]
    fn renders_profile_metadata_for_acting_user() {
        let origin = profile(7);
        let text = SpectatorMirror::render(
            Some(&origin),
            &SpectatorEvent::SearchEntered { user: 7 },
        );
        assert_eq!(text, "[id:7 | @ada | Ada L] entered search queue");
    }

    #[test]
    fn falls_back_to_bare_id_without_profile() {
        let text = SpectatorMirror::render(None, &SpectatorEvent::Matched { a: 3, b: 9 });
        assert_eq!(text, "[id:3 | @— | ] matched with id:9");
    }

    #[test]
    fn ignores_profile_of_a_different_user() {
        let origin = profile(7);
        let text =
            SpectatorMirror::render(Some(&origin), &SpectatorEvent::Stopped { user: 8 });
        assert_eq!(text, "[id:8 | @— | ] stopped the chat");
    }

    #[test]
    fn missing_username_renders_placeholder() {
        let origin = UserProfile { id: 7, username: None, full_name: "Ada L".to_owned() };
        let text = SpectatorMirror::render(
            Some(&origin),
            &SpectatorEvent::SearchCancelled { user: 7 },
        );
        assert_eq!(text, "[id:7 | @— | Ada L] cancelled search");
    }

    #[test]
    fn relayed_event_carries_preview() {
        let text = SpectatorMirror::render(
            None,
            &SpectatorEvent::Relayed { from: 4, preview: "hello there".to_owned() },
        );
        assert_eq!(text, "[id:4 | @— | ] -> hello there");
    }

    #[test]
    fn report_names_the_partner_when_known() {
        let text = SpectatorMirror::render(
            None,
            &SpectatorEvent::ReportSubmitted { user: 4, partner: Some(5) },
        );
        assert_eq!(text, "[id:4 | @— | ] submitted a report on id:5 (manual review needed)");

        let text = SpectatorMirror::render(
            None,
            &SpectatorEvent::ReportSubmitted { user: 4, partner: None },
        );
        assert_eq!(text, "[id:4 | @— | ] submitted a report (manual review needed)");
    }
}
