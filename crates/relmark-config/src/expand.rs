//! `${VAR}` references in configuration strings.
//!
//! Only braced references are expanded; any other `$` is literal text, so
//! tokens and URLs containing `$` survive untouched.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand every `${VAR}` and `${VAR:-default}` reference in `value`.
///
/// An unterminated `${` is kept as written.
///
/// # Errors
///
/// Returns [`ConfigError::EnvVar`] naming `field` when a reference without
/// a default names an unset variable.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(close) = rest[start..].find('}') else {
            break;
        };
        let end = start + close + 1;
        expanded.push_str(&rest[..start]);
        expanded.push_str(&expand_reference(&rest[start..end], field)?);
        rest = &rest[end..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}

/// Expand a single `${...}` reference.
fn expand_reference(reference: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(reference, |var| std::env::var(var).map(Some))
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{0}}} not set", e.var_name),
        })
}
