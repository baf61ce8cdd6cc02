//! The `::github-release-changelog` directive.
//!
//! A directive line names a repository; the indented lines under it are a
//! YAML option body:
//!
//! ```text
//! ## ::github-release-changelog my-org/my-repo
//!     match: "v2\\."
//!     autoprocess: false
//! ```
//!
//! The heading marker sets how far the rendered release headings are
//! shifted unless `base_indent` says otherwise.

mod options;
mod parser;
mod processor;

pub use options::{DirectiveOptions, GlobalOptions, RenderOptions};
pub use parser::{DirectiveMatch, ExtractedDirective, extract, matches, parse_line};
pub use processor::{ChangelogProcessor, DEFAULT_MAX_EXPANSIONS};
