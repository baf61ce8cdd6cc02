//! Expands GitHub release changelog directives in markdown.
//!
//! A markdown document is split into blocks and run through a
//! [`BlockParser`]. The [`ChangelogProcessor`] replaces every block holding
//! a `::github-release-changelog owner/repo` line with the repository's
//! releases, rendered one by one through a `minijinja` template.
//!
//! # Example
//!
//! ```no_run
//! use relmark_github::GithubSourceFactory;
//! use relmark_renderer::{
//!     BlockParser, ChangelogProcessor, DefaultEnvironment, GlobalOptions, ReleaseFormatter,
//! };
//!
//! let formatter = ReleaseFormatter::new(GithubSourceFactory, &DefaultEnvironment);
//! let mut parser = BlockParser::new()
//!     .with_processor(ChangelogProcessor::new(formatter, GlobalOptions::default()));
//!
//! let markdown = parser
//!     .process("# Changelog\n\n## ::github-release-changelog rust-lang/rust\n")
//!     .unwrap();
//! ```

mod autolink;
mod blocks;
pub mod directive;
mod error;
mod fence;
mod formatter;
mod release;
mod template;
#[cfg(test)]
mod test_env;

pub use autolink::autolink;
pub use blocks::{BlockParser, BlockProcessor};
pub use directive::{ChangelogProcessor, GlobalOptions, RenderOptions};
pub use error::RenderError;
pub use formatter::ReleaseFormatter;
pub use release::{ReleaseRecord, parse_timestamp};
pub use template::{
    DEFAULT_RELEASE_TEMPLATE, DefaultEnvironment, TemplateEnvironmentFactory, TemplateRegistry,
    register_date_filters,
};
