//! Gemini provider implementation
//!
//! No SDK: a raw `generateContent` POST with the API key in the query string.
//! The reply's `candidates[0].content.parts[0].text` is re-wrapped into the
//! same [`Completion`] the other adapters return.

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
use tracing::debug;

/// `generateContent` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

/// Check that a model id can be used as a single URL path segment
pub fn validate_model_segment(model: &str) -> Result<(), AdapterError> {
    let valid = !model.is_empty()
        && model
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !model.contains("..");
    if valid {
        Ok(())
    } else {
        Err(AdapterError::Configuration(format!(
            "Model id '{}' is not a valid path segment",
            model
        )))
    }
}

/// Flatten system prompt, history and user message into one prompt text
pub fn compose_prompt(request: &CompletionRequest) -> String {
    let mut sections = Vec::new();
    if request.has_system_prompt() {
        sections.push(request.system_prompt.clone());
    }
    if !request.history.is_empty() {
        let transcript: Vec<String> = request
            .history
            .iter()
            .map(|m| {
                let speaker = match m.role {
                    MessageRole::System => "System",
                    MessageRole::User => "User",
                    MessageRole::Assistant => "Assistant",
                };
                format!("{}: {}", speaker, m.content)
            })
            .collect();
        sections.push(transcript.join("\n"));
    }
    sections.push(request.user_message.clone());
    sections.join("\n\n")
}

/// Convert a CompletionRequest to the `generateContent` format
pub fn to_gemini_request(
    request: &CompletionRequest,
    profile: &ModelParameterProfile,
) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: Some(compose_prompt(request)),
            }],
        }],
        generation_config: GeminiGenerationConfig {
            max_output_tokens: profile.max_tokens,
            temperature: profile.temperature,
            top_p: profile.top_p,
        },
    }
}

/// Extract `candidates[0].content.parts[0].text`
pub fn from_gemini_response(body: Value) -> Result<Completion, AdapterError> {
    let response: GeminiResponse = serde_json::from_value(body)
        .map_err(|e| {
            AdapterError::MalformedResponse(format!("Unexpected generateContent body: {}", e))
        })?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .map(Completion::new)
        .ok_or_else(|| {
            AdapterError::MalformedResponse("Response has no candidate text".to_string())
        })
}

/// Gemini provider implementation
pub struct GeminiAdapter {
    registry: Arc<ClientRegistry>,
    profiles: Arc<ProfileStore>,
}

impl GeminiAdapter {
    pub fn new(registry: Arc<ClientRegistry>, profiles: Arc<ProfileStore>) -> Self {
        Self { registry, profiles }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &RequestOptions,
    ) -> Result<Completion, AdapterError> {
        let client = self.registry.get_client(ProviderId::Gemini)?;

        let model = ProviderId::Gemini.resolve_model(&request.model);
        let profile = self.profiles.profile_for(model);
        debug!(
            "Resolved model '{}' -> '{}' for gemini [request_id: {}]",
            request.model, model, options.request_id
        );

        let body = serde_json::to_value(to_gemini_request(request, profile)).map_err(|e| {
            AdapterError::Configuration(format!("Failed to serialize request: {}", e))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        validate_model_segment(model)?;
        let path = format!("/models/{}:generateContent", model);
        let response = client
            .post_json(
                &path,
                &[("key", client.api_key().expose_secret())],
                headers,
                &body,
                options,
            )
            .await?;

        from_gemini_response(response)
    }
}
