//! Conversion between the normalized protocol and the OpenAI-compatible format

use super::types::{OpenAIMessage, OpenAIRequest, OpenAIResponse};
use crate::protocol::{Completion, CompletionRequest};
use crate::providers::error::AdapterError;
use crate::providers::profiles::ModelParameterProfile;
use serde_json::Value;

/// Convert a CompletionRequest to the chat completion format
pub fn to_openai_request(
    request: &CompletionRequest,
    model: &str,
    profile: &ModelParameterProfile,
) -> OpenAIRequest {
    OpenAIRequest {
        model: model.to_string(),
        messages: request
            .to_messages()
            .into_iter()
            .map(|m| OpenAIMessage {
                role: m.role.as_str().to_string(),
                content: m.content,
            })
            .collect(),
        max_tokens: profile.max_tokens,
        temperature: profile.temperature,
        top_p: profile.top_p,
        frequency_penalty: profile.frequency_penalty,
        presence_penalty: profile.presence_penalty,
        stream: Some(false),
    }
}

/// Extract `choices[0].message.content`
pub fn from_openai_response(body: Value) -> Result<Completion, AdapterError> {
    let response: OpenAIResponse = serde_json::from_value(body)
        .map_err(|e| AdapterError::MalformedResponse(format!("Unexpected chat body: {}", e)))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AdapterError::MalformedResponse("Response has no choices".to_string()))?;

    choice
        .message
        .content
        .map(Completion::new)
        .ok_or_else(|| AdapterError::MalformedResponse("First choice has no content".to_string()))
}
