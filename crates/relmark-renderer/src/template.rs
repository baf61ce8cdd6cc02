//! Template environments for rendering releases.
//!
//! A [`TemplateEnvironmentFactory`] builds the `minijinja` environment
//! releases are rendered with. Hosts register factories by name in a
//! [`TemplateRegistry`] at startup and pick one per build; the registry
//! always knows the `default` factory.
//!
//! `release.published_at` reaches templates as an RFC 3339 string. The
//! default environment adds two filters for reformatting it:
//!
//! - `date` renders the calendar date, e.g. `2023-12-01`.
//! - `strftime(format)` renders with a chrono format string, e.g.
//!   `{{ release.published_at | strftime("%B %-d, %Y") }}`.

use std::collections::BTreeMap;
use std::fmt::Write;

use minijinja::{Environment, Error, ErrorKind};
use relmark_config::DEFAULT_TEMPLATE_ENVIRONMENT;

use crate::error::RenderError;
use crate::release::parse_timestamp;

/// Template used when neither the directive nor the configuration sets one.
pub const DEFAULT_RELEASE_TEMPLATE: &str = "# [{{ release.name }}]({{ release.html_url }})\n*Released at {{ release.published_at }}*\n\n{{ release.body }}";

/// Builds a template environment.
pub trait TemplateEnvironmentFactory {
    /// Create a fresh environment. Called once per build.
    fn create(&self) -> Environment<'static>;
}

impl<F> TemplateEnvironmentFactory for F
where
    F: Fn() -> Environment<'static>,
{
    fn create(&self) -> Environment<'static> {
        self()
    }
}

/// Plain environment without auto-escaping, with the date filters.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEnvironment;

impl TemplateEnvironmentFactory for DefaultEnvironment {
    fn create(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        register_date_filters(&mut env);
        env
    }
}

/// Add the `date` and `strftime` filters to `env`.
///
/// Custom factories call this to keep templates written for the default
/// environment working.
pub fn register_date_filters(env: &mut Environment<'_>) {
    env.add_filter("date", |value: &str| strftime(value, "%Y-%m-%d"));
    env.add_filter("strftime", strftime);
}

fn strftime(value: &str, format: &str) -> Result<String, Error> {
    let timestamp = parse_timestamp(value).map_err(|err| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("'{value}' is not a timestamp"),
        )
        .with_source(err)
    })?;

    let mut out = String::new();
    write!(out, "{}", timestamp.format(format)).map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid date format '{format}'"),
        )
    })?;
    Ok(out)
}

/// Named template environment factories.
pub struct TemplateRegistry {
    factories: BTreeMap<String, Box<dyn TemplateEnvironmentFactory>>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Create a registry holding only the `default` factory.
    #[must_use]
    pub fn new() -> Self {
        let mut factories: BTreeMap<String, Box<dyn TemplateEnvironmentFactory>> =
            BTreeMap::new();
        factories.insert(
            DEFAULT_TEMPLATE_ENVIRONMENT.to_owned(),
            Box::new(DefaultEnvironment),
        );
        Self { factories }
    }

    /// Register a factory, replacing any factory with the same name.
    #[must_use]
    pub fn with_factory<F: TemplateEnvironmentFactory + 'static>(
        mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Self {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Names of all registered factories, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Look up a factory by name.
    ///
    /// The name is matched case-insensitively against `default`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownEnvironment`] if nothing is registered
    /// under `name`.
    pub fn get(&self, name: &str) -> Result<&dyn TemplateEnvironmentFactory, RenderError> {
        let key = if name.eq_ignore_ascii_case(DEFAULT_TEMPLATE_ENVIRONMENT) {
            DEFAULT_TEMPLATE_ENVIRONMENT
        } else {
            name
        };
        match self.factories.get(key) {
            Some(factory) => Ok(factory.as_ref()),
            None => Err(RenderError::UnknownEnvironment(name.to_owned())),
        }
    }
}
