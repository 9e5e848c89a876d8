//! Error types for the Butler Coffee API client.
//!
//! [`ApiError`] covers the ways a call to the remote service can fail:
//! the server rejected the request, the network failed underneath, the
//! body could not be decoded, or the call needed a token we do not have.

use thiserror::Error;

/// Errors that can occur while talking to the Butler Coffee API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response. `message` is the best human-readable text
    /// extracted from the error body.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Underlying transport failure (DNS, connection refused, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not match the expected envelope.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// The endpoint requires a bearer token and none is configured.
    #[error("not logged in, run `bc-cli login` first")]
    NotAuthenticated,
}
