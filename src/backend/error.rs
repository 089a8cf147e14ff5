//! Backend error types.

use thiserror::Error;

/// Failures from the Auth0 Management API backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The Auth0 domain argument is not a bare hostname.
    #[error("Invalid Auth0 domain: {0}")]
    InvalidDomain(String),

    /// The HTTP request itself failed (DNS, connect, timeout).
    #[error("Auth0 request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Auth0 API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The API answered 2xx but the body was not the expected shape.
    #[error("Invalid response from Auth0 API: {0}")]
    InvalidResponse(String),

    /// A required credential argument was absent.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}
