//! Configuration management for relmark.
//!
//! Parses `relmark.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. The `[changelog]`
//! section is the plugin-level fallback layer for every
//! `::github-release-changelog` directive in a build.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `changelog.token`
//! - `changelog.github_api_url`

mod expand;
#[cfg(test)]
mod test_env;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the GitHub token.
    pub token: Option<String>,
    /// Override the GitHub API base URL.
    pub github_api_url: Option<String>,
    /// Override link autoprocessing.
    pub autoprocess: Option<bool>,
    /// Override whether the directive is recognized at all.
    pub enabled: Option<bool>,
    /// Override the template environment name.
    pub template_environment: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "relmark.toml";

/// Name of the built-in template environment.
pub const DEFAULT_TEMPLATE_ENVIRONMENT: &str = "default";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Changelog directive configuration.
    pub changelog: ChangelogConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Plugin-level changelog configuration.
///
/// Mirrors the keys accepted in a directive body. Directive-local values
/// take precedence over these.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Whether the directive is recognized. When false, directive lines
    /// pass through as literal text.
    pub enabled: bool,
    /// GitHub token (needs repo scope for private repositories).
    pub token: Option<String>,
    /// GitHub API URL for self-hosted instances.
    pub github_api_url: Option<String>,
    /// Template used to render each release.
    pub release_template: Option<String>,
    /// Regex matched against the start of each release name.
    #[serde(rename = "match")]
    pub name_filter: Option<String>,
    /// Rewrite `#123` and `@user` references in release bodies into links.
    pub autoprocess: bool,
    /// Registered template environment to render with.
    pub template_environment: String,
    /// Maximum directive expansions per document.
    pub max_expansions: usize,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token: None,
            github_api_url: None,
            release_template: None,
            name_filter: None,
            autoprocess: true,
            template_environment: DEFAULT_TEMPLATE_ENVIRONMENT.to_owned(),
            max_expansions: 64,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`changelog.token`").
        field: String,
        /// Error message (e.g., "${`GITHUB_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `relmark.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let changelog = &mut self.changelog;
        if let Some(token) = &settings.token {
            changelog.token = non_empty(token.clone());
        }
        if let Some(url) = &settings.github_api_url {
            changelog.github_api_url = Some(url.clone());
        }
        if let Some(autoprocess) = settings.autoprocess {
            changelog.autoprocess = autoprocess;
        }
        if let Some(enabled) = settings.enabled {
            changelog.enabled = enabled;
        }
        if let Some(name) = &settings.template_environment {
            changelog.template_environment.clone_from(name);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_config_from(current)
    }

    fn discover_config_from(mut current: PathBuf) -> Option<PathBuf> {
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let changelog = &self.changelog;

        if let Some(ref url) = changelog.github_api_url {
            require_non_empty(url, "changelog.github_api_url")?;
            require_http_url(url, "changelog.github_api_url")?;
        }

        require_non_empty(
            &changelog.template_environment,
            "changelog.template_environment",
        )?;

        if changelog.max_expansions == 0 {
            return Err(ConfigError::Validation(
                "changelog.max_expansions must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    ///
    /// A token that expands to an empty string is treated as unset.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let changelog = &mut self.changelog;

        if let Some(ref token) = changelog.token {
            changelog.token = non_empty(expand::expand_env(token, "changelog.token")?);
        }
        if let Some(ref url) = changelog.github_api_url {
            changelog.github_api_url =
                Some(expand::expand_env(url, "changelog.github_api_url")?);
        }

        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
