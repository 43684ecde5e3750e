//! Protocol configuration.
//!
//! Bounds how long the protocol waits on each external collaborator.
//! Defaults suit in-process backends; override via environment variables
//! or explicit construction for networked resolvers and remote signers.

use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Timeouts applied to external collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Bound on DID resolution and on credential lookup, each.
    pub resolve_timeout: Duration,
    /// Bound on proof signing and on signature recovery, each.
    pub signing_timeout: Duration,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            resolve_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            signing_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ProtocolConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ZKID_RESOLVE_TIMEOUT_MS` (default: 5000)
    /// - `ZKID_SIGNING_TIMEOUT_MS` (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            resolve_timeout: env_millis("ZKID_RESOLVE_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            signing_timeout: env_millis("ZKID_SIGNING_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
        })
    }

    /// Same timeout for every collaborator.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            resolve_timeout: timeout,
            signing_timeout: timeout,
        }
    }
}

fn env_millis(var: &str, default: u64) -> Result<Duration, ConfigError> {
    let ms = match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string()))?,
        Err(_) => default,
    };
    if ms == 0 {
        return Err(ConfigError::InvalidValue(
            var.to_string(),
            "timeout must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_millis(ms))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
