//! Anthropic provider implementation
//!
//! Handles the differences in message format: the system prompt travels as a
//! top-level field, the conversation must alternate user/assistant turns, and
//! the reply is a list of typed content blocks.

use crate::http::RequestOptions;
use crate::protocol::{Completion, CompletionRequest, MessageRole};
use crate::providers::adapter::{ProviderAdapter, ProviderId};
use crate::providers::error::AdapterError;
use crate::providers::profiles::{ModelParameterProfile, ProfileStore};
use crate::providers::registry::ClientRegistry;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const MESSAGES_PATH: &str = "/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Returned when the first content block is not text
pub const NO_TEXT_PLACEHOLDER: &str = "I'm sorry, I couldn't generate a response.";

/// Messages API request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Convert a CompletionRequest to the Messages API format
pub fn to_anthropic_request(
    request: &CompletionRequest,
    model: &str,
    profile: &ModelParameterProfile,
) -> AnthropicRequest {
    let mut system_parts = Vec::new();
    if request.has_system_prompt() {
        system_parts.push(request.system_prompt.clone());
    }

    // Anthropic expects alternating user/assistant messages; system turns from
    // the history are folded into the top-level system prompt instead.
    let mut messages: Vec<AnthropicMessage> = Vec::new();
    let turns = request
        .history
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .chain(std::iter::once((MessageRole::User, request.user_message.as_str())));

    for (role, content) in turns {
        let role = match role {
            MessageRole::System => {
                system_parts.push(content.to_string());
                continue;
            }
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        match messages.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(content);
            }
            _ => messages.push(AnthropicMessage {
                role,
                content: content.to_string(),
            }),
        }
    }

    AnthropicRequest {
        model: model.to_string(),
        max_tokens: profile.max_tokens,
        temperature: profile.temperature,
        top_p: profile.top_p,
        system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
        messages,
    }
}

/// Extract the text of the first content block
///
/// A first block of any other type (or no block at all) yields
/// [`NO_TEXT_PLACEHOLDER`] instead of an error.
pub fn from_anthropic_response(body: Value) -> Result<Completion, AdapterError> {
    let response: AnthropicResponse = serde_json::from_value(body)
        .map_err(|e| AdapterError::MalformedResponse(format!("Unexpected messages body: {}", e)))?;

    match response.content.into_iter().next() {
        Some(block) if block.block_type == "text" => block.text.map(Completion::new).ok_or_else(
            || AdapterError::MalformedResponse("Text block without text".to_string()),
        ),
        Some(block) => {
            warn!(
                "First content block has type '{}', returning placeholder",
                block.block_type
            );
            Ok(Completion::new(NO_TEXT_PLACEHOLDER))
        }
        None => {
            warn!("Response has no content blocks, returning placeholder");
            Ok(Completion::new(NO_TEXT_PLACEHOLDER))
        }
    }
}

/// Anthropic provider implementation
pub struct AnthropicAdapter {
    registry: Arc<ClientRegistry>,
    profiles: Arc<ProfileStore>,
}

impl AnthropicAdapter {
    pub fn new(registry: Arc<ClientRegistry>, profiles: Arc<ProfileStore>) -> Self {
        Self { registry, profiles }
    }

    fn headers(api_key: &str) -> Result<HeaderMap, AdapterError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| {
            AdapterError::Configuration("API key contains invalid header characters".to_string())
        })?;
        headers.insert("x-api-key", key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &RequestOptions,
    ) -> Result<Completion, AdapterError> {
        let client = self.registry.get_client(ProviderId::Anthropic)?;

        let model = ProviderId::Anthropic.resolve_model(&request.model);
        let profile = self.profiles.profile_for(model);
        debug!(
            "Resolved model '{}' -> '{}' for anthropic [request_id: {}]",
            request.model, model, options.request_id
        );

        let body = serde_json::to_value(to_anthropic_request(request, model, profile))
            .map_err(|e| {
                AdapterError::Configuration(format!("Failed to serialize request: {}", e))
            })?;
        let headers = Self::headers(client.api_key().expose_secret())?;

        let response = client
            .post_json(MESSAGES_PATH, &[], headers, &body, options)
            .await?;

        from_anthropic_response(response)
    }
}
