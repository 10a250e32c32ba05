//! Sans-IO pairing and relay engine for anonymous one-on-one chat
//!
//! Pairs waiting users first-come-first-served, relays message payloads
//! between partners without revealing identity, and describes every
//! side effect as data so the embedder owns all I/O.
//!
//! # Components
//!
//! - [`ChatEngine`]: the state machine; events in, actions out
//! - [`UserRegistry`]: lifecycle state and symmetric partner links
//! - [`WaitQueue`]: FIFO matching order with at-most-once membership
//! - [`UnreachableSet`]: recipients whose deliveries are skipped
//!
//! All state is process-lifetime only: nothing is persisted and a
//! restart resets every user to rest.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod engine;
mod error;
mod event;
mod queue;
mod registry;
mod types;
mod unreachable;

pub use action::{Action, Notice, SpectatorEvent};
pub use engine::ChatEngine;
pub use error::UserError;
pub use event::ChatEvent;
pub use queue::WaitQueue;
pub use registry::UserRegistry;
pub use types::{MEDIA_PREVIEW, MessagePayload, PREVIEW_MAX_CHARS, UserId, UserState};
pub use unreachable::UnreachableSet;
