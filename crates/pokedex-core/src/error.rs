//! Error types shared across the service.
//!
//! Three failure kinds cover every request-path error. They are produced by
//! the gateways and pipelines and carried unchanged until the HTTP layer
//! translates them into status codes; no intermediate layer remaps one kind
//! into another.

use thiserror::Error;

/// Result type alias using [`ServiceError`].
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Request-path errors for the species pipelines and gateways.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested species does not exist upstream.
    #[error("pokemon '{name}' not found")]
    NotFound {
        /// The name that was looked up.
        name: String,
    },

    /// The species exists but its payload violates the completeness
    /// contract.
    #[error("pokemon data is missing: {message}")]
    MissingData {
        /// Which part of the contract was violated.
        message: String,
    },

    /// An upstream dependency could not be reached or answered unusably.
    #[error("service unavailable: {message}")]
    Unavailable {
        /// Human-readable summary of the failure.
        message: String,
        /// The underlying error, kept for logs and never shown to clients.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ServiceError {
    /// Creates a not-found error for the given species name.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates a missing-data error.
    #[must_use]
    pub fn missing_data(message: impl Into<String>) -> Self {
        Self::MissingData {
            message: message.into(),
        }
    }

    /// Creates an unavailable error without an underlying cause.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unavailable error wrapping the underlying cause.
    pub fn unavailable_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns `true` for [`ServiceError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for [`ServiceError::MissingData`].
    #[must_use]
    pub const fn is_missing_data(&self) -> bool {
        matches!(self, Self::MissingData { .. })
    }

    /// Returns `true` for [`ServiceError::Unavailable`].
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
