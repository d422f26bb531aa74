//! Error types for cache client operations.

use smol_str::SmolStr;
use thiserror::Error;

/// Result alias for cache client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Error raised by the cache client.
///
/// The region proxy never retries and never rewrites these; they reach the
/// host exactly as the client reported them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client cannot reach any cache server.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// The client cache was closed.
    #[error("cache is closed")]
    CacheClosed,

    /// A function execution named a function the servers do not know.
    #[error("function {0} is not registered")]
    FunctionNotFound(SmolStr),

    /// Any other client failure.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}
