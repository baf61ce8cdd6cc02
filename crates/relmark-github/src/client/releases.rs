//! Release listing for the GitHub API.

use tracing::{debug, info};

use super::{API_VERSION, GithubClient, PAGE_SIZE};
use crate::error::GithubError;
use crate::types::Release;

impl GithubClient {
    /// List every release of a repository, in the order GitHub returns them.
    ///
    /// Pages are requested with `per_page=100` and concatenated as received.
    /// Pagination follows the `Link` header's `rel="next"` entry; when no
    /// `Link` header is present, a short page ends the listing.
    pub fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, GithubError> {
        let url = self.releases_url(owner, repo);
        info!("Listing releases for {}/{}", owner, repo);

        let releases = collect_pages(|page| {
            let (batch, link) = self.get_releases_page(&url, page)?;
            debug!("Fetched page {} of {}/{} ({} releases)", page, owner, repo, batch.len());
            Ok((batch, link))
        })?;

        info!("Found {} releases for {}/{}", releases.len(), owner, repo);
        Ok(releases)
    }

    /// Fetch one page, returning the releases and the raw `Link` header.
    fn get_releases_page(
        &self,
        url: &str,
        page: usize,
    ) -> Result<(Vec<Release>, Option<String>), GithubError> {
        let mut request = self
            .agent
            .get(url)
            .query("per_page", PAGE_SIZE.to_string())
            .query("page", page.to_string())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", &Self::user_agent());
        if let Some(ref token) = self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let response = request.call()?;

        let status = response.status().as_u16();
        let link = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(GithubError::HttpResponse {
                status,
                body: error_body,
            });
        }

        let body = body_reader.read_to_string()?;
        let releases: Vec<Release> = serde_json::from_str(&body)?;
        Ok((releases, link))
    }

    /// Build the releases listing URL for a repository.
    fn releases_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}/releases", self.base_url, owner, repo)
    }
}

/// Request pages starting at 1 until the listing ends, concatenating them.
///
/// `fetch` returns one page and its raw `Link` header. With a header, the
/// listing continues while it has a `rel="next"` entry; without one, it
/// continues while pages are full. The first error stops the listing.
fn collect_pages<F>(mut fetch: F) -> Result<Vec<Release>, GithubError>
where
    F: FnMut(usize) -> Result<(Vec<Release>, Option<String>), GithubError>,
{
    let mut releases = Vec::new();
    let mut page = 1usize;
    loop {
        let (batch, link) = fetch(page)?;
        let more = match link {
            Some(ref header) => has_next_page(header),
            None => batch.len() == PAGE_SIZE,
        };
        releases.extend(batch);

        if !more {
            return Ok(releases);
        }
        page += 1;
    }
}

/// Check whether a `Link` header advertises a next page.
///
/// Format: `<https://api.github.com/...&page=2>; rel="next", <...>; rel="last"`.
fn has_next_page(link: &str) -> bool {
    link.split(',').any(|entry| {
        entry
            .split(';')
            .skip(1)
            .any(|param| matches!(param.trim(), "rel=\"next\"" | "rel=next"))
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const NEXT: &str = r#"<https://api.github.com/repositories/1/releases?per_page=100&page=2>; rel="next""#;
    const LAST: &str = r#"<https://api.github.com/repositories/1/releases?per_page=100&page=1>; rel="first""#;

    fn releases(tags: impl IntoIterator<Item = String>) -> Vec<Release> {
        tags.into_iter()
            .map(|tag| {
                serde_json::from_value(serde_json::json!({
                    "tag_name": tag,
                    "html_url": format!("https://github.com/abc/def/releases/tag/{tag}"),
                }))
                .unwrap()
            })
            .collect()
    }

    fn tags(releases: &[Release]) -> Vec<&str> {
        releases.iter().map(|r| r.tag_name.as_str()).collect()
    }

    #[test]
    fn test_collect_pages_follows_link_header() {
        let mut requested = Vec::new();
        let all = collect_pages(|page| {
            requested.push(page);
            let link = if page < 3 { NEXT } else { LAST };
            Ok((
                releases([format!("p{page}a"), format!("p{page}b")]),
                Some(link.to_owned()),
            ))
        })
        .unwrap();

        assert_eq!(requested, vec![1, 2, 3]);
        assert_eq!(tags(&all), vec!["p1a", "p1b", "p2a", "p2b", "p3a", "p3b"]);
    }

    #[test]
    fn test_collect_pages_link_header_wins_over_page_size() {
        let mut requested = Vec::new();
        let all = collect_pages(|page| {
            requested.push(page);
            Ok((
                releases((0..PAGE_SIZE).map(|i| format!("v{i}"))),
                Some(LAST.to_owned()),
            ))
        })
        .unwrap();

        assert_eq!(requested, vec![1]);
        assert_eq!(all.len(), PAGE_SIZE);
    }

    #[test]
    fn test_collect_pages_without_link_stops_on_short_page() {
        let mut requested = Vec::new();
        let all = collect_pages(|page| {
            requested.push(page);
            let count = if page == 1 { PAGE_SIZE } else { 3 };
            Ok((
                releases((0..count).map(|i| format!("v{page}.{i}"))),
                None,
            ))
        })
        .unwrap();

        assert_eq!(requested, vec![1, 2]);
        assert_eq!(all.len(), PAGE_SIZE + 3);
        assert_eq!(all[0].tag_name, "v1.0");
        assert_eq!(all[PAGE_SIZE].tag_name, "v2.0");
    }

    #[test]
    fn test_collect_pages_empty_listing() {
        let all = collect_pages(|_| Ok((Vec::new(), None))).unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_collect_pages_error_stops_listing() {
        let mut requested = Vec::new();
        let err = collect_pages(|page| {
            requested.push(page);
            if page == 2 {
                return Err(GithubError::HttpResponse {
                    status: 404,
                    body: "Not Found".to_owned(),
                });
            }
            Ok((releases(["v1".to_owned()]), Some(NEXT.to_owned())))
        })
        .unwrap_err();

        assert_eq!(requested, vec![1, 2]);
        assert!(matches!(err, GithubError::HttpResponse { status: 404, .. }));
    }

    #[test]
    fn test_releases_url() {
        let client = GithubClient::new(None, None);
        assert_eq!(
            client.releases_url("abc", "def"),
            "https://api.github.com/repos/abc/def/releases"
        );
    }

    #[test]
    fn test_releases_url_enterprise() {
        let client = GithubClient::new(None, Some("https://github.example.com/api/v3/"));
        assert_eq!(
            client.releases_url("my-org", "my.repo"),
            "https://github.example.com/api/v3/repos/my-org/my.repo/releases"
        );
    }

    #[test]
    fn test_has_next_page() {
        let link = r#"<https://api.github.com/repositories/1/releases?per_page=100&page=2>; rel="next", <https://api.github.com/repositories/1/releases?per_page=100&page=5>; rel="last""#;
        assert!(has_next_page(link));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let link = r#"<https://api.github.com/repositories/1/releases?per_page=100&page=4>; rel="prev", <https://api.github.com/repositories/1/releases?per_page=100&page=1>; rel="first""#;
        assert!(!has_next_page(link));
    }

    #[test]
    fn test_has_next_page_ignores_url_text() {
        let link = r#"<https://api.github.com/next?rel="next">; rel="prev""#;
        assert!(!has_next_page(link));
        assert!(!has_next_page(""));
    }
}
