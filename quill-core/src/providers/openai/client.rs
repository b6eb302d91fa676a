//! Adapter for every OpenAI-compatible vendor

use super::converter::{from_openai_response, to_openai_request};
use crate::http::RequestOptions;
use crate::protocol::{Completion, CompletionRequest};
use crate::providers::adapter::{ProviderAdapter, ProviderId, WireFamily};
use crate::providers::error::AdapterError;
use crate::providers::profiles::ProfileStore;
use crate::providers::registry::ClientRegistry;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use tracing::debug;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// One adapter, parameterized by provider, for all chat-completion vendors
pub struct OpenAICompatibleAdapter {
    provider: ProviderId,
    registry: Arc<ClientRegistry>,
    profiles: Arc<ProfileStore>,
}

impl OpenAICompatibleAdapter {
    /// Create an adapter for an OpenAI-compatible provider
    pub fn new(
        provider: ProviderId,
        registry: Arc<ClientRegistry>,
        profiles: Arc<ProfileStore>,
    ) -> Result<Self, AdapterError> {
        if provider.wire_family() != WireFamily::OpenAICompatible {
            return Err(AdapterError::Configuration(format!(
                "Provider '{}' does not speak the chat completion format",
                provider
            )));
        }

        Ok(Self {
            provider,
            registry,
            profiles,
        })
    }

    fn headers(api_key: &str) -> Result<HeaderMap, AdapterError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            AdapterError::Configuration("API key contains invalid header characters".to_string())
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAICompatibleAdapter {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &RequestOptions,
    ) -> Result<Completion, AdapterError> {
        let client = self.registry.get_client(self.provider)?;

        let model = self.provider.resolve_model(&request.model);
        let profile = self.profiles.profile_for(model);
        debug!(
            "Resolved model '{}' -> '{}' for {} [request_id: {}]",
            request.model, model, self.provider, options.request_id
        );

        let body = serde_json::to_value(to_openai_request(request, model, profile))
            .map_err(|e| {
                AdapterError::Configuration(format!("Failed to serialize request: {}", e))
            })?;
        let headers = Self::headers(client.api_key().expose_secret())?;

        let response = client
            .post_json(CHAT_COMPLETIONS_PATH, &[], headers, &body, options)
            .await?;

        from_openai_response(response)
    }
}
