//! Application-wide error types.
//!
//! Every failure the ledger reports falls into one of four kinds. Transports
//! map them onto their own vocabulary through [`AppError::status_code`] and
//! [`AppError::error_code`].

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Boxed error kept as the cause of an internal failure.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested resource does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource kind, e.g. `"account"`.
        resource: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Malformed or semantically invalid input.
    #[error("Validation error: {message}")]
    Validation {
        /// Human readable description.
        message: String,
        /// Input field the message refers to, when known.
        field: Option<String>,
    },

    /// Valid input that cannot be applied to the current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Ledger-integrity or storage failure. Never caused by bad input.
    #[error("Internal error: {message}")]
    Internal {
        /// Description safe to log.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxedCause>,
    },
}

impl AppError {
    /// Builds a `NotFound` error.
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Builds a `Validation` error without a field pointer.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Builds a `Validation` error pointing at an input field.
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Builds a `Conflict` error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Builds an `Internal` error without a cause.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an `Internal` error wrapping its cause.
    pub fn internal_with<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation { .. } => 400,
            Self::Conflict(_) => 409,
            Self::Internal { .. } => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the offending input field of a validation error.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// Returns true for failures that indicate a server-side problem.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
