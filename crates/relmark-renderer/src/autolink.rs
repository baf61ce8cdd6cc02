//! Issue and user reference links in release notes.
//!
//! `#123` becomes `[#123](<release base>issues/123)` and `@name` becomes
//! `[@name](<repository root>/name)`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::release::ReleaseRecord;

static ISSUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[0-9]+").unwrap());

static USER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@[a-zA-Z0-9-]+").unwrap());

/// Rewrite issue and user references in a release body into links.
///
/// Runs once per record: the `processed` flag is set afterwards, even when
/// nothing matched, and a processed record is returned untouched.
pub fn autolink(release: &mut ReleaseRecord) {
    if release.processed {
        return;
    }

    let base_url = release_base_url(&release.html_url);
    let root_url = repository_root(base_url);

    let body = {
        let linked = ISSUE_RE.replace_all(&release.body, |caps: &Captures<'_>| {
            let issue = &caps[0];
            format!("[{issue}]({base_url}issues/{})", &issue[1..])
        });
        USER_RE
            .replace_all(&linked, |caps: &Captures<'_>| {
                let user = &caps[0];
                format!("[{user}]({root_url}/{})", &user[1..])
            })
            .into_owned()
    };

    release.body = body;
    release.processed = true;
}

/// Everything before the first `releases` in the release URL.
///
/// `https://github.com/org/repo/releases/tag/v1` gives
/// `https://github.com/org/repo/`.
fn release_base_url(html_url: &str) -> &str {
    html_url
        .find("releases")
        .map_or(html_url, |idx| &html_url[..idx])
}

/// Drop the last three `/`-separated segments of the release base URL.
///
/// Assumes the base has the shape `scheme://host/org/repo/`, so this yields
/// `scheme://host`. Other URL shapes give a wrong root.
fn repository_root(base_url: &str) -> String {
    let segments: Vec<&str> = base_url.split('/').collect();
    segments[..segments.len().saturating_sub(3)].join("/")
}
