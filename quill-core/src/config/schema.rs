//! Model catalog configuration structures with serde support

use super::env;
use super::error::{ConfigError, ValidationError};
use super::validator::ConfigValidator;
use crate::providers::ProviderId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root of the model catalog configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Schema version (required, no default)
    pub version: String,

    /// Providers in display order
    #[serde(default)]
    pub providers: Vec<CatalogProvider>,
}

/// One provider section of the catalog
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogProvider {
    /// Provider identifier, e.g. `openai`
    pub id: String,

    /// Human-readable name; the id is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub models: Vec<CatalogModelEntry>,
}

/// A model listed under a provider.
///
/// Fields other than `id` and `name` are kept verbatim in `metadata`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogModelEntry {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl CatalogModelEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            metadata: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl CatalogProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            enabled: true,
            models: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_model(mut self, model: CatalogModelEntry) -> Self {
        self.models.push(model);
        self
    }

    /// Display name before capitalization
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl CatalogConfig {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            providers: Vec::new(),
        }
    }

    pub fn with_provider(mut self, provider: CatalogProvider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Parse YAML after `${VAR}` interpolation, then validate
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse_yaml(content, "<string>")
    }

    /// Parse JSON after `${VAR}` interpolation, then validate
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse_json(content, "<string>")
    }

    pub(crate) fn parse_yaml(content: &str, path: &str) -> Result<Self, ConfigError> {
        let interpolated = env::interpolate_env_vars(content)?;
        let config: CatalogConfig =
            serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
                path: path.to_string(),
                line: e.location().map(|l| l.line()),
                column: e.location().map(|l| l.column()),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn parse_json(content: &str, path: &str) -> Result<Self, ConfigError> {
        let interpolated = env::interpolate_env_vars(content)?;
        let config: CatalogConfig =
            serde_json::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
                path: path.to_string(),
                line: Some(e.line()),
                column: Some(e.column()),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Run the configuration validator
    pub fn validate(&self) -> Result<(), ValidationError> {
        ConfigValidator::new().validate(self)
    }

    /// Default catalog covering every routable provider
    pub fn builtin() -> Self {
        let entry = |provider: ProviderId, id: &str, name: &str| {
            let entry = CatalogModelEntry::new(id).with_name(name);
            if id == provider.default_model() {
                entry.with_metadata("default", true)
            } else {
                entry
            }
        };

        Self::new("1")
            .with_provider(
                CatalogProvider::new(ProviderId::OpenAI.as_str())
                    .with_name("OpenAI")
                    .with_model(entry(ProviderId::OpenAI, "gpt-4o", "GPT-4o"))
                    .with_model(entry(ProviderId::OpenAI, "gpt-4o-mini", "GPT-4o mini"))
                    .with_model(entry(ProviderId::OpenAI, "gpt-3.5-turbo", "GPT-3.5 Turbo")),
            )
            .with_provider(
                CatalogProvider::new(ProviderId::Anthropic.as_str())
                    .with_model(entry(
                        ProviderId::Anthropic,
                        "claude-3-haiku-20240307",
                        "Claude 3 Haiku",
                    ))
                    .with_model(entry(
                        ProviderId::Anthropic,
                        "claude-3-5-sonnet-20241022",
                        "Claude 3.5 Sonnet",
                    )),
            )
            .with_provider(
                CatalogProvider::new(ProviderId::Qwen.as_str())
                    .with_model(entry(ProviderId::Qwen, "qwen-turbo", "Qwen Turbo"))
                    .with_model(entry(ProviderId::Qwen, "qwen-plus", "Qwen Plus")),
            )
            .with_provider(
                CatalogProvider::new(ProviderId::DeepSeek.as_str())
                    .with_name("DeepSeek")
                    .with_model(entry(ProviderId::DeepSeek, "deepseek-chat", "DeepSeek Chat")),
            )
            .with_provider(
                CatalogProvider::new(ProviderId::Gemini.as_str())
                    .with_model(entry(ProviderId::Gemini, "gemini-1.5-flash", "Gemini 1.5 Flash"))
                    .with_model(entry(ProviderId::Gemini, "gemini-1.5-pro", "Gemini 1.5 Pro")),
            )
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::builtin()
    }
}
