//! Catalog configuration validation

use super::error::ValidationError;
use super::schema::{CatalogConfig, CatalogProvider};
use std::collections::HashSet;

/// Structural checks applied to every loaded catalog
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a catalog, reporting the first offending field
    pub fn validate(&self, config: &CatalogConfig) -> Result<(), ValidationError> {
        if config.version.trim().is_empty() {
            return Err(ValidationError::required("version"));
        }

        let mut seen = HashSet::new();
        for (i, provider) in config.providers.iter().enumerate() {
            let path = format!("providers[{i}].id");
            if provider.id.trim().is_empty() {
                return Err(ValidationError::required(path));
            }
            if !seen.insert(provider.id.as_str()) {
                return Err(ValidationError::duplicate(path, &provider.id)
                    .with_context("provider ids must be unique"));
            }
            self.validate_models(i, provider)?;
        }

        Ok(())
    }

    fn validate_models(
        &self,
        index: usize,
        provider: &CatalogProvider,
    ) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for (j, model) in provider.models.iter().enumerate() {
            let path = format!("providers[{index}].models[{j}].id");
            if model.id.trim().is_empty() {
                return Err(ValidationError::required(path));
            }
            if model.id.chars().any(char::is_whitespace) {
                return Err(ValidationError::invalid_format(
                    path,
                    "model id must not contain whitespace",
                ));
            }
            if !seen.insert(model.id.as_str()) {
                return Err(ValidationError::duplicate(path, &model.id)
                    .with_context(format!("within provider '{}'", provider.id)));
            }
        }
        Ok(())
    }
}
