//! Error types for the GitHub client.

/// Error from GitHub API operations.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON deserialization error.
    #[error("invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),

    /// API base URL could not be used to build a request.
    #[error("invalid GitHub API URL: {0}")]
    InvalidUrl(String),
}
