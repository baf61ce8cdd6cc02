//! GitHub release types.

use serde::{Deserialize, Serialize};

/// Release as returned by `GET /repos/{owner}/{repo}/releases`.
///
/// Only the fields relmark renders are kept; the rest of the payload is
/// ignored during deserialization.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Release {
    /// Release title. GitHub allows it to be null.
    #[serde(default)]
    pub name: Option<String>,
    /// Git tag the release points at.
    pub tag_name: String,
    /// Absolute URL of the release page.
    pub html_url: String,
    /// Publication timestamp (ISO-8601). Null for drafts.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Creation timestamp (ISO-8601).
    #[serde(default)]
    pub created_at: Option<String>,
    /// Release notes (markdown). GitHub allows it to be null.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether the release is an unpublished draft.
    #[serde(default)]
    pub draft: bool,
    /// Whether the release is marked as a prerelease.
    #[serde(default)]
    pub prerelease: bool,
    /// Account that created the release.
    #[serde(default)]
    pub author: Option<Author>,
}

/// Release author.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Author {
    /// GitHub login.
    pub login: String,
}
