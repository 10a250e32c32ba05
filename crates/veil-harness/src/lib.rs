//! Test harness for the pairing engine and service.
//!
//! In-memory implementations of the service seams for deterministic,
//! reproducible testing without a live messaging channel.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation for
//! model-based testing. Operations are applied to both the model and
//! the real engine, and their observable states are compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through
//! invariant checks. Invariants verify WHAT must be true across all
//! execution paths, not specific scenarios. Use
//! [`InvariantRegistry::standard()`] for the pairing rule set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod observer;
pub mod sim_transport;

pub use invariants::{
    EngineSnapshot, Invariant, InvariantRegistry, InvariantResult, NoSelfPairing, PartnerSymmetry,
    QueueConsistency, SearchChatExclusion, Violation,
};
pub use model::{
    ModelUserId, ModelWorld, ObservableState, Operation, OperationError, OperationResult,
    SmallMessage,
};
pub use observer::{Observation, RecordingSpectator};
pub use sim_transport::{Delivery, SimTransport};
