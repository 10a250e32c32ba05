//! Service-level errors.

use thiserror::Error;

/// Errors from the service glue.
///
/// Delivery failures are not represented here; they are expected
/// operating conditions handled through engine feedback.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The health endpoint failed to bind or serve.
    #[error("health endpoint: {0}")]
    Health(#[from] std::io::Error),
}
