//! Normalized request/response types shared by every provider
//!
//! Callers build a [`CompletionRequest`] once; each adapter translates it into
//! its own wire shape and hands back a [`Completion`] carrying plain text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Model name that asks the router to pick a model per provider
pub const AUTO_MODEL: &str = "auto";

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

impl MessageRole {
    /// Wire name used by the chat-style vendors
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conversation turn in the provider-agnostic shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub role: MessageRole,
    pub content: String,
}

impl NormalizedMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// A completion request before any vendor-specific shaping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System prompt; an empty string means "no system prompt"
    #[serde(default)]
    pub system_prompt: String,

    /// The new user turn
    pub user_message: String,

    /// Prior turns, oldest first
    #[serde(default)]
    pub history: Vec<NormalizedMessage>,

    /// Logical model name, `"auto"` lets each adapter choose its default
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    AUTO_MODEL.to_string()
}

impl CompletionRequest {
    /// Create a request with no history that lets each provider pick its model
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
            history: Vec::new(),
            model: default_model(),
        }
    }

    pub fn with_history(mut self, history: Vec<NormalizedMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Whether a system prompt was supplied
    pub fn has_system_prompt(&self) -> bool {
        !self.system_prompt.trim().is_empty()
    }

    /// Flatten into chat turns: system prompt, history, then the user message.
    pub fn to_messages(&self) -> Vec<NormalizedMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        if self.has_system_prompt() {
            messages.push(NormalizedMessage::system(self.system_prompt.clone()));
        }
        messages.extend(self.history.iter().cloned());
        messages.push(NormalizedMessage::user(self.user_message.clone()));
        messages
    }
}

/// The normalized result every adapter produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
