//! Service configuration.

use std::time::Duration;

use veil_core::UserId;

use crate::error::ServiceError;

/// Runtime configuration for the service glue.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Oversight chat for the spectator mirror. `None` disables
    /// mirroring entirely.
    pub spectator_chat: Option<UserId>,
    /// Upper bound for a single outbound delivery attempt. A timeout is
    /// treated as a transient failure.
    pub deliver_timeout: Duration,
    /// Bind address for the health endpoint.
    pub health_bind: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            spectator_chat: None,
            deliver_timeout: Duration::from_secs(10),
            health_bind: "0.0.0.0:8080".to_owned(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment.
    ///
    /// Recognized variables, all optional:
    /// - `VEIL_SPECTATOR_CHAT`: oversight chat id; unset, empty or `0`
    ///   disables the mirror
    /// - `VEIL_DELIVER_TIMEOUT_MS`: delivery timeout in milliseconds
    /// - `VEIL_HEALTH_BIND`: health endpoint bind address
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServiceError> {
        let mut config = Self::default();

        if let Some(value) = lookup("VEIL_SPECTATOR_CHAT") {
            let value = value.trim();
            if !value.is_empty() {
                let chat = value
                    .parse::<UserId>()
                    .map_err(|e| ServiceError::Config(format!("VEIL_SPECTATOR_CHAT: {e}")))?;
                config.spectator_chat = (chat != 0).then_some(chat);
            }
        }

        if let Some(value) = lookup("VEIL_DELIVER_TIMEOUT_MS") {
            let millis = value
                .trim()
                .parse::<u64>()
                .map_err(|e| ServiceError::Config(format!("VEIL_DELIVER_TIMEOUT_MS: {e}")))?;
            config.deliver_timeout = Duration::from_millis(millis);
        }

        if let Some(value) = lookup("VEIL_HEALTH_BIND") {
            config.health_bind = value;
        }

        Ok(config)
    }
}
