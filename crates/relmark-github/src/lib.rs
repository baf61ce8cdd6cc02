//! GitHub releases client for relmark.
//!
//! Provides a sync HTTP client for the GitHub REST API that collects every
//! page of a repository's releases, plus the [`ReleaseSource`] seam the
//! renderer uses so tests can substitute an in-memory source.

mod client;
mod error;
mod source;
mod types;

pub use client::{DEFAULT_API_URL, GithubClient, PAGE_SIZE};
pub use error::GithubError;
pub use source::{GithubSourceFactory, ReleaseSource, ReleaseSourceFactory};
pub use types::{Author, Release};
