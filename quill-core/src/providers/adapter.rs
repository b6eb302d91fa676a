//! Provider identities and the adapter trait
//!
//! Each [`ProviderId`] maps to exactly one [`ProviderAdapter`] and at most one
//! live client in the [`ClientRegistry`](crate::providers::ClientRegistry).

use crate::http::RequestOptions;
use crate::protocol::types::{Completion, CompletionRequest};
use crate::providers::error::{AdapterResult, RoutingError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Core adapter trait that all vendor integrations implement
///
/// An adapter performs exactly one outbound call per invocation and never
/// retries; deciding whether to try another vendor belongs to the
/// [`FallbackOrchestrator`](crate::providers::FallbackOrchestrator).
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The vendor this adapter speaks to
    fn provider(&self) -> ProviderId;

    /// Translate, send, and normalize a single completion
    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &RequestOptions,
    ) -> AdapterResult<Completion>;
}

/// Wire protocol family spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFamily {
    /// `{model, messages, ...} -> {choices:[{message:{content}}]}`
    OpenAICompatible,
    /// `{system, messages, max_tokens} -> {content:[{type, text}]}`
    AnthropicMessages,
    /// `{contents:[{parts:[{text}]}]} -> {candidates:[...]}` with the key in the URL
    GeminiGenerateContent,
}

/// Known vendor identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAI,
    Anthropic,
    Qwen,
    DeepSeek,
    Gemini,
}

impl ProviderId {
    /// Every provider, in declaration order
    pub const ALL: [ProviderId; 5] = [
        ProviderId::OpenAI,
        ProviderId::Anthropic,
        ProviderId::Qwen,
        ProviderId::DeepSeek,
        ProviderId::Gemini,
    ];

    /// Stable identifier used in configuration and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Qwen => "qwen",
            ProviderId::DeepSeek => "deepseek",
            ProviderId::Gemini => "gemini",
        }
    }

    pub fn wire_family(&self) -> WireFamily {
        match self {
            ProviderId::OpenAI | ProviderId::Qwen | ProviderId::DeepSeek => {
                WireFamily::OpenAICompatible
            }
            ProviderId::Anthropic => WireFamily::AnthropicMessages,
            ProviderId::Gemini => WireFamily::GeminiGenerateContent,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "https://api.openai.com/v1",
            ProviderId::Anthropic => "https://api.anthropic.com/v1",
            ProviderId::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1",
            ProviderId::DeepSeek => "https://api.deepseek.com/v1",
            ProviderId::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Model used when the request does not name one this vendor serves
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "gpt-4o",
            ProviderId::Anthropic => "claude-3-haiku-20240307",
            ProviderId::Qwen => "qwen-turbo",
            ProviderId::DeepSeek => "deepseek-chat",
            ProviderId::Gemini => "gemini-1.5-flash",
        }
    }

    /// Model id prefixes this vendor serves
    pub fn model_prefixes(&self) -> &'static [&'static str] {
        match self {
            ProviderId::OpenAI => &["gpt-", "o1", "o3"],
            ProviderId::Anthropic => &["claude-"],
            ProviderId::Qwen => &["qwen"],
            ProviderId::DeepSeek => &["deepseek-"],
            ProviderId::Gemini => &["gemini-"],
        }
    }

    /// Pick the model to send: the requested one if this vendor serves it,
    /// otherwise the vendor default.
    pub fn resolve_model<'a>(&self, requested: &'a str) -> &'a str {
        let requested_lower = requested.to_ascii_lowercase();
        if self
            .model_prefixes()
            .iter()
            .any(|prefix| requested_lower.starts_with(prefix))
        {
            requested
        } else {
            self.default_model()
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "OPENAI_API_KEY",
            ProviderId::Anthropic => "ANTHROPIC_API_KEY",
            ProviderId::Qwen => "DASHSCOPE_API_KEY",
            ProviderId::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderId::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn base_url_env(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "OPENAI_BASE_URL",
            ProviderId::Anthropic => "ANTHROPIC_BASE_URL",
            ProviderId::Qwen => "DASHSCOPE_BASE_URL",
            ProviderId::DeepSeek => "DEEPSEEK_BASE_URL",
            ProviderId::Gemini => "GEMINI_BASE_URL",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "gpt" | "primary-gpt" => Ok(ProviderId::OpenAI),
            "anthropic" | "claude" | "anthropic-style" => Ok(ProviderId::Anthropic),
            "qwen" | "dashscope" | "openai-compatible-secondary" => Ok(ProviderId::Qwen),
            "deepseek" => Ok(ProviderId::DeepSeek),
            "gemini" | "google" | "http-json-vendor" => Ok(ProviderId::Gemini),
            _ => Err(RoutingError::UnknownRoute(s.to_string())),
        }
    }
}
