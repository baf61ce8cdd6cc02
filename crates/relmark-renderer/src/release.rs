//! Release records as seen by templates.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use relmark_github::Release;
use serde::{Serialize, Serializer};

use crate::error::RenderError;

/// One release, ready for link rewriting and rendering.
///
/// Bound as `release` in templates. `published_at` renders as an RFC 3339
/// timestamp with its UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRecord {
    /// Release title (the tag name when GitHub has no title).
    pub name: String,
    /// Git tag.
    pub tag_name: String,
    /// Absolute URL of the release page.
    pub html_url: String,
    /// Publication time.
    #[serde(serialize_with = "serialize_timestamp")]
    pub published_at: DateTime<FixedOffset>,
    /// Release notes.
    pub body: String,
    /// Unpublished draft.
    pub draft: bool,
    /// Marked as prerelease.
    pub prerelease: bool,
    /// Login of the author, if known.
    pub author: Option<String>,
    /// Set once links in `body` have been rewritten.
    pub processed: bool,
}

impl ReleaseRecord {
    /// Convert an API release.
    ///
    /// Drafts have no publication time; their creation time is used instead.
    pub fn from_api(release: Release) -> Result<Self, RenderError> {
        let name = release
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| release.tag_name.clone());

        let Some(raw) = release.published_at.or(release.created_at) else {
            return Err(RenderError::MissingTimestamp { release: name });
        };
        let published_at = parse_timestamp(&raw).map_err(|source| RenderError::Timestamp {
            release: name.clone(),
            source,
        })?;

        Ok(Self {
            name,
            tag_name: release.tag_name,
            html_url: release.html_url,
            published_at,
            body: release.body.unwrap_or_default(),
            draft: release.draft,
            prerelease: release.prerelease,
            author: release.author.map(|a| a.login),
            processed: false,
        })
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`Z` or `±hh:mm` offsets). A timestamp without an
/// offset is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).or_else(|err| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc().fixed_offset())
            .map_err(|_| err)
    })
}

fn serialize_timestamp<S: Serializer>(
    value: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339())
}
