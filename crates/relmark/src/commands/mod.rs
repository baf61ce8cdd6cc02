//! CLI command implementations.

pub(crate) mod releases;
pub(crate) mod render;

use std::path::PathBuf;

use clap::Args;
use relmark_config::{ChangelogConfig, CliSettings, Config};
use relmark_github::GithubSourceFactory;
use relmark_renderer::{ReleaseFormatter, TemplateRegistry};

use crate::error::CliError;

pub(crate) use releases::ReleasesArgs;
pub(crate) use render::RenderArgs;

/// Arguments shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover relmark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitHub token (overrides config).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API base URL, e.g. for GitHub Enterprise (overrides config).
    #[arg(long)]
    github_api_url: Option<String>,

    /// Do not rewrite issue and user references into links.
    #[arg(long)]
    no_autoprocess: bool,

    /// Template environment to render releases with (overrides config).
    #[arg(long, env = "RELMARK_TEMPLATE_ENVIRONMENT")]
    template_environment: Option<String>,

    /// Enable verbose output (log every directive and page fetched).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load the configuration with these arguments applied on top.
    fn load_config(&self, enabled: Option<bool>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            token: self.token.clone(),
            github_api_url: self.github_api_url.clone(),
            autoprocess: self.no_autoprocess.then_some(false),
            enabled,
            template_environment: self.template_environment.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Create a formatter backed by the GitHub API.
///
/// The template environment is looked up by the configured name.
fn create_formatter(
    changelog: &ChangelogConfig,
    registry: &TemplateRegistry,
) -> Result<ReleaseFormatter, CliError> {
    let templates = registry.get(&changelog.template_environment)?;
    Ok(ReleaseFormatter::new(GithubSourceFactory, templates))
}
