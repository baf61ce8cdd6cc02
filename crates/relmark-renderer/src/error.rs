//! Error types for changelog rendering.

use relmark_github::GithubError;

/// Error raised while expanding a changelog directive.
///
/// None of these are recovered from locally: they abort the document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Release source failure (not found, forbidden, network).
    #[error("GitHub error: {0}")]
    Github(#[from] GithubError),

    /// Directive body is not valid YAML.
    #[error("invalid directive options: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Directive body parsed but an option has the wrong shape.
    #[error("invalid directive options: {message}")]
    Options {
        /// What was wrong.
        message: String,
    },

    /// Release name filter is not a valid regex.
    #[error("invalid release name filter: {0}")]
    Filter(#[from] regex::Error),

    /// Template syntax or evaluation error.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Release timestamp could not be parsed.
    #[error("invalid timestamp on release {release}: {source}")]
    Timestamp {
        /// Release name.
        release: String,
        /// Underlying parse error.
        source: chrono::ParseError,
    },

    /// Release has neither a publication nor a creation timestamp.
    #[error("release {release} has no timestamp")]
    MissingTimestamp {
        /// Release name.
        release: String,
    },

    /// No template environment registered under this name.
    #[error("unknown template environment: {0}")]
    UnknownEnvironment(String),

    /// Too many directives expanded in one document.
    #[error("more than {0} changelog directives expanded in one document")]
    ExpansionLimit(usize),
}

impl RenderError {
    pub(crate) fn options(message: impl Into<String>) -> Self {
        Self::Options {
            message: message.into(),
        }
    }
}
