//! Error taxonomy for engine operations.
//!
//! A [`UserError`] is a caller mistake, not a system fault: the operation
//! is rejected with no side effects and the requester gets a guidance
//! response. Delivery failures are not errors at this layer; they come
//! back into the engine as explicit follow-up events.

use thiserror::Error;

/// A request that cannot be honored in the requester's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UserError {
    /// Searching was requested while already chatting.
    #[error("already in a chat")]
    AlreadyInChat,

    /// Searching was requested while already waiting.
    #[error("already searching")]
    AlreadySearching,

    /// A chat-only operation was requested while not chatting.
    #[error("not in a chat")]
    NotInChat,
}
