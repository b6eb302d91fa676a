//! Environment variable interpolation for configuration files

use super::error::ConfigError;
use regex::{Captures, Regex};
use std::env;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}"));

/// Interpolate `${VAR}` references from the process environment
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    interpolate_with(content, |name| env::var(name).ok())
}

/// Interpolate `${VAR}` references through an arbitrary lookup.
///
/// The first unresolved variable is reported as `EnvVarNotFound`.
pub fn interpolate_with<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = ENV_VAR_PATTERN
        .as_ref()
        .map_err(|e| ConfigError::ParseError {
            path: "<env>".to_string(),
            line: None,
            column: None,
            message: e.to_string(),
        })?;
    let mut missing: Option<String> = None;

    let result = pattern.replace_all(content, |cap: &Captures| {
        let var_name = &cap[1];
        match lookup(var_name) {
            Some(value) => value,
            None => {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var) => Err(ConfigError::EnvVarNotFound { var }),
        None => Ok(result.into_owned()),
    }
}
