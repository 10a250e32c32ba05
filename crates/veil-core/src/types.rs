//! Core identifiers and message content descriptors.
//!
//! The engine never sees real transport identities or raw message bodies.
//! Users are opaque numeric ids and messages are [`MessagePayload`]
//! descriptors: enough structure to copy the content to a partner and to
//! build a bounded preview for oversight, nothing more.

use serde::{Deserialize, Serialize};

/// Opaque user identifier assigned by the transport layer.
///
/// The engine only compares these for equality; it attaches no meaning to
/// the numeric value.
pub type UserId = u64;

/// Maximum number of characters in an observer preview of relayed content.
pub const PREVIEW_MAX_CHARS: usize = 150;

/// Placeholder preview for content with no usable text.
pub const MEDIA_PREVIEW: &str = "<media>";

/// Where a user currently is in the pairing lifecycle.
///
/// Exactly one state holds for any user at any time. Users the engine has
/// never seen (or that returned to rest) are `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserState {
    /// Not waiting and not paired.
    Idle,
    /// In the wait queue, not yet paired.
    Searching,
    /// Paired with exactly one partner.
    Chatting,
}

/// Content descriptor for a relayed message.
///
/// Non-text variants carry the transport's opaque file handle so the
/// relaying side can re-send the same content without ever downloading it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessagePayload {
    /// Plain text message.
    Text(String),
    /// Sticker, referenced by file handle. Stickers carry no caption.
    Sticker {
        /// Opaque transport file handle.
        file: String,
    },
    /// Photo with optional caption.
    Photo {
        /// Opaque transport file handle.
        file: String,
        /// Caption attached to the photo, if any.
        caption: Option<String>,
    },
    /// Video with optional caption.
    Video {
        /// Opaque transport file handle.
        file: String,
        /// Caption attached to the video, if any.
        caption: Option<String>,
    },
    /// Voice note with optional caption.
    Voice {
        /// Opaque transport file handle.
        file: String,
        /// Caption attached to the voice note, if any.
        caption: Option<String>,
    },
    /// Document with optional caption.
    Document {
        /// Opaque transport file handle.
        file: String,
        /// Caption attached to the document, if any.
        caption: Option<String>,
    },
}

impl MessagePayload {
    /// Text content of the payload: message text or media caption.
    fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Photo { caption, .. }
            | Self::Video { caption, .. }
            | Self::Voice { caption, .. }
            | Self::Document { caption, .. } => caption.as_deref(),
            Self::Sticker { .. } => None,
        }
    }

    /// Bounded preview of the content for the observer mirror.
    ///
    /// Uses the text or caption truncated to [`PREVIEW_MAX_CHARS`]
    /// characters, or [`MEDIA_PREVIEW`] when the content has no text.
    pub fn preview(&self) -> String {
        match self.text() {
            Some(text) => text.chars().take(PREVIEW_MAX_CHARS).collect(),
            None => MEDIA_PREVIEW.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_preview_is_verbatim_when_short() {
        let payload = MessagePayload::Text("hello".to_owned());
        assert_eq!(payload.preview(), "hello");
    }

    #[test]
    fn long_text_preview_is_truncated() {
        let payload = MessagePayload::Text("x".repeat(500));
        assert_eq!(payload.preview().chars().count(), PREVIEW_MAX_CHARS);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Multi-byte characters must not be split mid-encoding.
        let payload = MessagePayload::Text("ñ".repeat(200));
        let preview = payload.preview();
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS);
        assert!(preview.chars().all(|c| c == 'ñ'));
    }

    #[test]
    fn captioned_media_previews_caption() {
        let payload = MessagePayload::Photo {
            file: "f1".to_owned(),
            caption: Some("sunset".to_owned()),
        };
        assert_eq!(payload.preview(), "sunset");
    }

    #[test]
    fn uncaptioned_media_previews_placeholder() {
        let photo = MessagePayload::Photo { file: "f1".to_owned(), caption: None };
        assert_eq!(photo.preview(), MEDIA_PREVIEW);

        let sticker = MessagePayload::Sticker { file: "s1".to_owned() };
        assert_eq!(sticker.preview(), MEDIA_PREVIEW);
    }
}
