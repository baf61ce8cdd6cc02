//! Release source abstraction.
//!
//! The renderer builds one source per directive, bound to that directive's
//! token and API URL, through a [`ReleaseSourceFactory`].

use tracing::debug;

use crate::client::GithubClient;
use crate::error::GithubError;
use crate::types::Release;

/// Something that can list every release of a repository.
pub trait ReleaseSource {
    /// Return all releases of `owner/repo`, in source order.
    fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, GithubError>;
}

impl ReleaseSource for GithubClient {
    fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, GithubError> {
        GithubClient::list_releases(self, owner, repo)
    }
}

/// Builds release sources bound to a token and API base URL.
pub trait ReleaseSourceFactory {
    /// Create a source. `api_url` has already had any trailing `/` removed.
    fn connect(
        &self,
        token: Option<&str>,
        api_url: Option<&str>,
    ) -> Result<Box<dyn ReleaseSource>, GithubError>;
}

/// Factory producing [`GithubClient`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct GithubSourceFactory;

impl ReleaseSourceFactory for GithubSourceFactory {
    fn connect(
        &self,
        token: Option<&str>,
        api_url: Option<&str>,
    ) -> Result<Box<dyn ReleaseSource>, GithubError> {
        if let Some(url) = api_url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            return Err(GithubError::InvalidUrl(url.to_owned()));
        }
        let client = GithubClient::new(token, api_url);
        debug!(
            "Connecting to {} ({})",
            client.base_url(),
            if client.is_authenticated() {
                "authenticated"
            } else {
                "anonymous"
            }
        );
        Ok(Box::new(client))
    }
}
