//! Runtime glue for the veil pairing engine.
//!
//! Wraps [`veil_core`]'s action-based logic with real orchestration:
//! one async mutex around the engine, delivery through a pluggable
//! [`Transport`], oversight mirroring through an [`ObserverSink`], and
//! a health endpoint for deployment probes. The concrete wire (bot API,
//! webhook ingestion, polling) stays outside this crate; embedders
//! implement the two traits and feed [`Incoming`] updates in.
//!
//! # Components
//!
//! - [`ChatService`]: routes inbound updates into engine events and
//!   executes the resulting actions outside the lock
//! - [`Transport`]: outbound delivery seam, best-effort single-attempt
//! - [`SpectatorMirror`]: copies user-visible events to an oversight chat
//! - [`health`]: liveness endpoint with engine counters

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod executor;
pub mod health;
mod router;
mod spectator;
mod transport;
mod ui;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use router::{ChatService, Incoming, IncomingKind};
pub use spectator::{ObserverSink, SpectatorMirror};
pub use transport::{DeliveryError, Outbound, Transport, UserProfile};
pub use ui::{Button, Callback, HELP_TEXT, Menu, SETTINGS_TEXT, WELCOME, render_notice};
