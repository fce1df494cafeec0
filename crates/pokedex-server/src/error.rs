//! Server lifecycle errors.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using [`ServerError`].
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors surfaced by the server lifecycle.
///
/// Everything here is fatal to the run that produced it. Per-request
/// failures never appear at this level; they become JSON error responses
/// instead.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured listen address could not be parsed.
    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddr {
        /// The address as configured.
        addr: String,
        /// The parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding the listener failed. Never retried.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: String,
        /// The bind failure.
        #[source]
        source: std::io::Error,
    },

    /// Accepting a connection failed while serving.
    #[error("accept failed: {source}")]
    Accept {
        /// The accept failure.
        #[source]
        source: std::io::Error,
    },

    /// The serve task did not come to rest within the drain deadline.
    #[error("drain deadline exceeded after {waited:?}, {active} connections still open")]
    DrainTimeout {
        /// How long the controller waited.
        waited: Duration,
        /// Connections still registered when it gave up.
        active: usize,
    },

    /// The serve task ended abnormally.
    #[error("serve task failed: {message}")]
    Serve {
        /// Description of the abnormal end.
        message: String,
    },
}

impl ServerError {
    /// Creates an invalid-address error.
    #[must_use]
    pub fn invalid_addr(addr: impl Into<String>, source: std::net::AddrParseError) -> Self {
        Self::InvalidAddr {
            addr: addr.into(),
            source,
        }
    }

    /// Creates a bind error.
    #[must_use]
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    /// Creates an accept error.
    #[must_use]
    pub const fn accept(source: std::io::Error) -> Self {
        Self::Accept { source }
    }

    /// Creates a drain-timeout error.
    #[must_use]
    pub const fn drain_timeout(waited: Duration, active: usize) -> Self {
        Self::DrainTimeout { waited, active }
    }

    /// Creates a serve-task error.
    #[must_use]
    pub fn serve(message: impl Into<String>) -> Self {
        Self::Serve {
            message: message.into(),
        }
    }
}
