//! Directive options and their precedence.
//!
//! Options come from three layers: the YAML body under a directive line,
//! the plugin-level `[changelog]` configuration, and built-in defaults.
//! A key set in the body wins over the configuration, which wins over the
//! default.
//!
//! ```yaml
//! ::github-release-changelog <owner>/<repo>
//!     token: !ENV GITHUB_TOKEN
//!     base_indent: 2
//!     release_template: "{{ release.name }}"
//!     github_api_url: https://api.github.com
//!     match: "v1\\."
//!     autoprocess: false
//! ```

use relmark_config::ChangelogConfig;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::RenderError;

/// Options written in a directive body. Unset keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveOptions {
    /// GitHub token.
    pub token: Option<String>,
    /// Heading levels to shift rendered output by.
    pub base_indent: Option<usize>,
    /// Template used to render each release.
    pub release_template: Option<String>,
    /// GitHub API base URL.
    pub github_api_url: Option<String>,
    /// Regex matched against the start of each release name.
    pub name_filter: Option<String>,
    /// Rewrite issue and user references into links.
    pub autoprocess: Option<bool>,
}

/// Plugin-level fallback options, shared by every directive in a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOptions {
    /// GitHub token.
    pub token: Option<String>,
    /// GitHub API base URL.
    pub github_api_url: Option<String>,
    /// Template used to render each release.
    pub release_template: Option<String>,
    /// Regex matched against the start of each release name.
    pub name_filter: Option<String>,
    /// Rewrite issue and user references into links.
    pub autoprocess: bool,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            token: None,
            github_api_url: None,
            release_template: None,
            name_filter: None,
            autoprocess: true,
        }
    }
}

impl From<&ChangelogConfig> for GlobalOptions {
    fn from(config: &ChangelogConfig) -> Self {
        Self {
            token: config.token.clone(),
            github_api_url: config.github_api_url.clone(),
            release_template: config.release_template.clone(),
            name_filter: config.name_filter.clone(),
            autoprocess: config.autoprocess,
        }
    }
}

/// Fully merged options for one directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// GitHub token.
    pub token: Option<String>,
    /// Heading levels to shift rendered output by.
    pub base_indent: usize,
    /// Template override; `None` uses the built-in template.
    pub template: Option<String>,
    /// GitHub API base URL; `None` uses the public API.
    pub api_base_url: Option<String>,
    /// Regex matched against the start of each release name.
    pub name_filter: Option<String>,
    /// Rewrite issue and user references into links.
    pub autolink: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            token: None,
            base_indent: 0,
            template: None,
            api_base_url: None,
            name_filter: None,
            autolink: true,
        }
    }
}

impl DirectiveOptions {
    /// Parse a directive body.
    ///
    /// An empty body yields no options. `!ENV` tags are resolved here; a
    /// variable that is not set leaves its key unset. Keys with a null value
    /// are also treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Yaml`] for malformed YAML and
    /// [`RenderError::Options`] for a body that is not a mapping or an option
    /// with the wrong type.
    pub fn parse(body: &str) -> Result<Self, RenderError> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }

        let mapping = match serde_yaml::from_str::<Value>(body)? {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(RenderError::options(
                    "directive body must be a mapping of option names to values",
                ));
            }
        };

        Self::from_mapping(mapping)
    }

    fn from_mapping(mapping: Mapping) -> Result<Self, RenderError> {
        let mut options = Self::default();

        for (key, value) in mapping {
            let Some(key) = key.as_str().map(str::to_owned) else {
                return Err(RenderError::options("option names must be strings"));
            };
            let Some(value) = resolve_env(value)? else {
                debug!("Directive option '{}' is unset", key);
                continue;
            };

            match key.as_str() {
                "token" => options.token = Some(scalar_string(&key, &value)?),
                "base_indent" => options.base_indent = Some(indent(&value)?),
                "release_template" => options.release_template = Some(scalar_string(&key, &value)?),
                "github_api_url" => options.github_api_url = Some(scalar_string(&key, &value)?),
                "match" => options.name_filter = Some(pattern(&value)?),
                "autoprocess" => options.autoprocess = Some(flag(&value)?),
                other => debug!("Ignoring unknown directive option '{}'", other),
            }
        }

        Ok(options)
    }

    /// Merge with the plugin-level options.
    ///
    /// `heading_level` is the base indent when the body does not set one.
    pub fn resolve(&self, global: &GlobalOptions, heading_level: usize) -> RenderOptions {
        RenderOptions {
            token: self.token.clone().or_else(|| global.token.clone()),
            base_indent: self.base_indent.unwrap_or(heading_level),
            template: self
                .release_template
                .clone()
                .or_else(|| global.release_template.clone()),
            api_base_url: self
                .github_api_url
                .clone()
                .or_else(|| global.github_api_url.clone()),
            name_filter: self
                .name_filter
                .clone()
                .or_else(|| global.name_filter.clone()),
            autolink: self.autoprocess.unwrap_or(global.autoprocess),
        }
    }
}

/// Resolve `!ENV` tags.
///
/// - `!ENV NAME` reads `NAME`.
/// - `!ENV [A, B, fallback]` reads the first set variable among all but the
///   last item, and otherwise uses the last item as a literal value.
///
/// Values read from the environment stay text; the option parsers below
/// read numbers and flags out of text themselves. Returns `None` when
/// nothing resolves or the value is null.
fn resolve_env(value: Value) -> Result<Option<Value>, RenderError> {
    match value {
        Value::Null => Ok(None),
        Value::Tagged(tagged) if tagged.tag == "ENV" => {
            let (names, fallback) = match tagged.value {
                Value::String(name) => (vec![Value::String(name)], None),
                Value::Sequence(mut items) if items.len() > 1 => {
                    let fallback = items.pop();
                    (items, fallback)
                }
                Value::Sequence(items) => (items, None),
                _ => {
                    return Err(RenderError::options(
                        "!ENV expects a variable name or a list of names",
                    ));
                }
            };

            for name in &names {
                let Some(name) = name.as_str() else {
                    return Err(RenderError::options("!ENV variable names must be strings"));
                };
                if let Ok(raw) = std::env::var(name) {
                    return Ok(env_scalar(raw));
                }
            }
            Ok(fallback.filter(|v| !v.is_null()))
        }
        Value::Tagged(tagged) => Err(RenderError::options(format!(
            "unsupported tag {}",
            tagged.tag
        ))),
        other => Ok(Some(other)),
    }
}

/// Empty or YAML-null text leaves the key unset.
fn env_scalar(raw: String) -> Option<Value> {
    let null = matches!(raw.trim(), "" | "~" | "null" | "Null" | "NULL");
    (!null).then_some(Value::String(raw))
}

fn scalar_string(key: &str, value: &Value) -> Result<String, RenderError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(RenderError::options(format!("{key} must be a string"))),
    }
}

/// The `match` pattern must be a YAML string: unquoted `1.10` is the
/// number 1.1, which would filter on the wrong prefix.
fn pattern(value: &Value) -> Result<String, RenderError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Err(RenderError::options(format!(
            "match must be a quoted string, got the number {n}"
        ))),
        _ => Err(RenderError::options("match must be a string")),
    }
}

fn indent(value: &Value) -> Result<usize, RenderError> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => value.as_u64().and_then(|n| usize::try_from(n).ok()),
    };
    parsed.ok_or_else(|| RenderError::options("base_indent must be a non-negative integer"))
}

fn flag(value: &Value) -> Result<bool, RenderError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "enable" | "enabled" | "true" | "yes" | "on" => Ok(true),
            "disable" | "disabled" | "false" | "no" | "off" => Ok(false),
            _ => Err(RenderError::options(format!(
                "autoprocess must be a boolean, got '{s}'"
            ))),
        },
        _ => Err(RenderError::options("autoprocess must be a boolean")),
    }
}
