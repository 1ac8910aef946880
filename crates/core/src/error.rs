//! Error types for chart retrieval.
//!
//! [`ChartError`] is the closed taxonomy every public operation returns.
//! Each variant maps to a stable [`ErrorKind`] so calling layers (an HTTP
//! API, a CLI) can branch on the failure without matching on messages.
//!
//! # Example
//!
//! ```rust
//! use billboard_core::{ChartError, ErrorKind};
//!
//! let err = ChartError::invalid_input("Invalid chart name: \"Hot 100\"");
//! assert_eq!(err.kind(), ErrorKind::InvalidInput);
//! assert_eq!(err.kind().code(), "INVALID_INPUT");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed cause carried by errors that wrap a lower-level failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for chart operations.
#[derive(Error, Debug)]
pub enum ChartError {
    /// Connection, DNS or HTTP status failure.
    ///
    /// Raised once retries are exhausted, or immediately for status codes
    /// that are not worth retrying (e.g. 404).
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The request exceeded the configured timeout on its final attempt.
    #[error("{message}")]
    Timeout {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Unexpected failure while walking markup that was otherwise present.
    #[error("{message}")]
    Parse {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The page parsed but yielded no entities, usually upstream markup drift.
    #[error("{0}")]
    NotFound(String),

    /// Caller-supplied chart name or date failed validation.
    ///
    /// Never reaches the network.
    #[error("{0}")]
    InvalidInput(String),
}

impl ChartError {
    pub fn network(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::Network { message: message.into(), source }
    }

    pub fn timeout(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::Timeout { message: message.into(), source }
    }

    pub fn parse(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::Parse { message: message.into(), source }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns the stable discriminator for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Discriminator for [`ChartError`].
///
/// Serializes to the wire codes used in API error envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    #[serde(rename = "TIMEOUT")]
    Timeout,
    #[serde(rename = "PARSE_ERROR")]
    Parse,
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
}

impl ErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Parse => "PARSE_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidInput => "INVALID_INPUT",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure of a single HTTP attempt, as reported by a [`Transport`](crate::fetch::Transport).
///
/// The fetcher decides from this classification whether to retry, and
/// wraps it as the cause of the [`ChartError`] it finally raises.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The attempt did not complete within the request timeout.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Connect, DNS, reset or abort before a response arrived.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The server answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Status { status: u16 },

    /// The response body could not be read or decoded.
    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether the failure is likely transient.
    ///
    /// Timeouts, connection-level failures, 5xx responses and 429 are
    /// retried; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connection(_) => true,
            Self::Status { status } => *status >= 500 || *status == 429,
            Self::Body(_) | Self::Other(_) => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for ChartError.
pub type Result<T> = std::result::Result<T, ChartError>;
