//! Error types for region proxy operations.

use regionbox_client::ClientError;
use smol_str::SmolStr;
use thiserror::Error;

/// Error returned by [`Region`](crate::Region) and [`Cache`](crate::Cache)
/// operations.
///
/// Errors raised by the cache client pass through unchanged in
/// [`RegionError::Client`]; nothing here retries.
#[derive(Debug, Error)]
pub enum RegionError {
    /// The value converter has no stored form for the value.
    ///
    /// Carries the detail string of the rejected host value.
    #[error("Unable to put value {0}")]
    UnsupportedValueType(String),

    /// A dynamically invoked method received the wrong number of arguments.
    #[error("{method} must be called with {expected}")]
    InvalidArgumentCount {
        /// Method name.
        method: &'static str,
        /// Human readable description of the expected arguments.
        expected: &'static str,
        /// Number of arguments actually passed.
        received: usize,
    },

    /// A dynamically invoked method does not exist.
    #[error("unknown region method {0}")]
    UnknownMethod(SmolStr),

    /// The cache proxy was closed.
    #[error("cache is closed")]
    CacheClosed,

    /// Error reported by the cache client.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Error raised while loading a [`BridgeConfig`](crate::BridgeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be parsed or does not match the schema.
    #[error("invalid bridge configuration: {0}")]
    Parse(#[from] serde_saphyr::Error),
}
