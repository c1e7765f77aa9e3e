use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the candela workspace.
///
/// Covers argument validation, payload shape problems, backend HTTP failures,
/// transport-level failures, and discarded responses for superseded queries.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CandelaError {
    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with the returned or expected data (missing columns, length mismatch, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code returned by the backend or proxy.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// The request never produced an HTTP response (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(String),

    /// A resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "metadata for campaign 42".
        what: String,
    },

    /// The response arrived after the series' desired query changed and was discarded.
    #[error("response for {series} superseded by a newer query")]
    Superseded {
        /// Display form of the series key.
        series: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl CandelaError {
    /// Helper: build an `Http` error from a status and message.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `Superseded` error for a series label.
    pub fn superseded(series: impl Into<String>) -> Self {
        Self::Superseded {
            series: series.into(),
        }
    }

    /// Returns true if retrying the same request could plausibly succeed.
    ///
    /// Transport failures, 5xx and 429 responses are retryable. Client errors,
    /// payload problems and superseded responses are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
