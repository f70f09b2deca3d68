//! Remote store error types
//!
//! Structured error handling for remote storage operations. Maps HTTP status
//! codes to specific variants so callers can distinguish "path does not
//! exist" (cached as a negative entry) from transient failures (never cached).

/// Remote store error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Not found")]
    NotFound,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limited by remote store")]
    RateLimited,

    #[error("Remote server error ({0}): {1}")]
    Server(u16, String),

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request error: {0}")]
    Request(String),
}

impl RemoteError {
    /// Create a RemoteError from an HTTP status code and response body.
    ///
    /// Dropbox reports path-level failures as 409 with an `error_summary`
    /// string; `path/not_found` and deleted paths both map to `NotFound`.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => RemoteError::AuthFailed(body.to_string()),
            404 => RemoteError::NotFound,
            408 => RemoteError::Timeout,
            409 if body.contains("not_found") => RemoteError::NotFound,
            409 => RemoteError::Request(format!("HTTP 409: {}", body)),
            429 => RemoteError::RateLimited,
            500..=599 => RemoteError::Server(status, body.to_string()),
            _ => RemoteError::Request(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_connect() {
            RemoteError::Network(err.to_string())
        } else {
            RemoteError::Request(err.to_string())
        }
    }
}
