//! OpenAI-compatible providers
//!
//! OpenAI, Qwen (DashScope compatible mode) and DeepSeek share one wire format
//! and one normalization path; they differ only in base URL, key and default
//! model, all of which come from [`ProviderId`](crate::providers::ProviderId).

mod client;
pub mod converter;
pub mod types;

pub use client::OpenAICompatibleAdapter;
pub use types::{OpenAIRequest, OpenAIResponse};
