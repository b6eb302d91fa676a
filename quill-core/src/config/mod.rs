//! Configuration for the routing layer
//!
//! Two sources feed the crate:
//! - [`Settings`], read once from the process environment (keys, base URLs,
//!   proxy, run mode, timeout)
//! - [`CatalogConfig`], a YAML or JSON file describing the models offered to
//!   callers

mod env;
mod error;
mod schema;
mod secrets;
mod settings;
mod validator;

pub use env::{interpolate_env_vars, interpolate_with};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{CatalogConfig, CatalogModelEntry, CatalogProvider};
pub use secrets::SecretString;
pub use settings::{
    ProviderSettings, Settings, DEFAULT_TIMEOUT_SECS, PLACEHOLDER_API_KEY, PROXY_HOST_ENV,
    PROXY_PORT_ENV, RUN_MODE_ENV, RUN_MODE_FALLBACK_ENV, TIMEOUT_ENV,
};
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;

fn read_file(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

/// Load a catalog configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<CatalogConfig> {
    let path = path.as_ref();
    let content = read_file(path)?;
    CatalogConfig::parse_yaml(&content, &path.to_string_lossy())
}

/// Load a catalog configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<CatalogConfig> {
    let path = path.as_ref();
    let content = read_file(path)?;
    CatalogConfig::parse_json(&content, &path.to_string_lossy())
}
