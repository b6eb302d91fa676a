//! Flat model listing for UI pickers
//!
//! Pure transform over a [`CatalogConfig`]; no network access and no caching.

use crate::config::CatalogConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One selectable model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogModel {
    pub id: String,
    pub display_name: String,
    pub provider: String,
    pub provider_name: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// List every model of every enabled provider, in configuration order
pub fn list_available_models(config: &CatalogConfig) -> Vec<CatalogModel> {
    config
        .providers
        .iter()
        .filter(|provider| provider.enabled)
        .flat_map(|provider| {
            let provider_name = capitalize(provider.display_name());
            provider.models.iter().map(move |model| CatalogModel {
                id: model.id.clone(),
                display_name: model.name.clone().unwrap_or_else(|| model.id.clone()),
                provider: provider.id.clone(),
                provider_name: provider_name.clone(),
                metadata: model_metadata(&model.metadata),
            })
        })
        .collect()
}

// Reserved output keys win over same-named metadata entries.
fn model_metadata(metadata: &Map<String, Value>) -> Map<String, Value> {
    metadata
        .iter()
        .filter(|(key, _)| {
            !matches!(
                key.as_str(),
                "id" | "displayName" | "provider" | "providerName"
            )
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
