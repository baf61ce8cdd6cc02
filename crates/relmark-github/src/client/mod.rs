//! GitHub REST API client.
//!
//! Provides a sync HTTP client with optional bearer-token authentication.
//! Unauthenticated calls are subject to GitHub's public rate limits.

mod releases;

use std::time::Duration;

use ureq::Agent;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size requested from listing endpoints.
pub const PAGE_SIZE: usize = 100;

/// REST API version pinned in every request.
const API_VERSION: &str = "2022-11-28";

/// GitHub REST API client.
pub struct GithubClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Create a client.
    ///
    /// # Arguments
    /// * `token` - Bearer token; `None` for unauthenticated access
    /// * `api_url` - API base URL; `None` for [`DEFAULT_API_URL`]
    pub fn new(token: Option<&str>, api_url: Option<&str>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: api_url
                .unwrap_or(DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_owned(),
            token: token.filter(|t| !t.is_empty()).map(str::to_owned),
        }
    }

    /// Get the API base URL (without trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests carry an `Authorization` header.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn user_agent() -> String {
        format!("relmark/{}", env!("CARGO_PKG_VERSION"))
    }
}
