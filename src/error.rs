//! Error types for the SecureSBOM SDK.
//!
//! This module provides a unified error type for all SDK operations,
//! along with the temporary/permanent classification the retrying client
//! relies on.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for SecureSBOM operations.
pub type Result<T> = std::result::Result<T, SecureSbomError>;

/// Errors that can occur when using the SecureSBOM SDK.
#[derive(Error, Debug)]
pub enum SecureSbomError {
    /// Missing or invalid client configuration.
    ///
    /// Raised while building a client, never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// API error from the SecureSBOM service (non-2xx response).
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Machine-readable error code, if the service supplied one.
        code: Option<String>,
        /// Human-readable error message.
        message: String,
    },

    /// HTTP transport error (connection refused, reset, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a body that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The supplied SBOM document is not usable.
    #[error("invalid SBOM: {0}")]
    InvalidSbom(String),

    /// Local file or stream I/O failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File the operation was acting on (`-` for stdin/stdout).
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The operation's context was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation's context deadline elapsed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// A temporary failure persisted across every allowed attempt.
    #[error("giving up after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The error returned by the final attempt.
        #[source]
        source: Box<SecureSbomError>,
    },
}

impl SecureSbomError {
    /// Returns true if the failure is transient and the same request may
    /// succeed if sent again.
    ///
    /// Server errors (5xx), rate limiting (429) and connection-level
    /// failures are temporary. Everything else is permanent.
    pub fn is_temporary(&self) -> bool {
        match self {
            SecureSbomError::Api { status_code, .. } => *status_code >= 500 || *status_code == 429,
            SecureSbomError::Http(e) => !(e.is_decode() || e.is_builder() || e.is_redirect()),
            _ => false,
        }
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            SecureSbomError::Api {
                status_code: 401 | 403,
                ..
            }
        )
    }

    /// Returns true if the operation stopped because its context was
    /// cancelled or ran out of time.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            SecureSbomError::Cancelled | SecureSbomError::DeadlineExceeded
        )
    }

    /// Returns the HTTP status code if available.
    ///
    /// For exhausted retries this is the status of the final attempt.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SecureSbomError::Api { status_code, .. } => Some(*status_code),
            SecureSbomError::Http(e) => e.status().map(|s| s.as_u16()),
            SecureSbomError::RetriesExhausted { source, .. } => source.status_code(),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SecureSbomError::Io {
            path: path.into(),
            source,
        }
    }
}
