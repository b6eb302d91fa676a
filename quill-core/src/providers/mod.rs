//! Provider adapters, client registry and fallback routing
//!
//! This module implements the routing layer that turns several incompatible
//! vendor APIs into one "generate a reply" operation:
//! - [`ClientRegistry`] builds each vendor's client on first use
//! - [`ProfileStore`] supplies generation parameters per model
//! - one [`ProviderAdapter`] per wire family translates and normalizes
//! - [`FallbackOrchestrator`] picks adapters and handles failures

pub mod adapter;
pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod openai;
pub mod profiles;
pub mod registry;
pub mod routing;

pub use adapter::{ProviderAdapter, ProviderId, WireFamily};
pub use error::{AdapterError, AdapterResult, ErrorKind, RoutingError};
pub use profiles::{ModelParameterProfile, ProfileStore};
pub use registry::ClientRegistry;
pub use routing::{
    FallbackOrchestrator, OrchestratorBuilder, ProviderFailure, RouteMode, RoutingResult,
    AUTO_CHAIN,
};

// Re-export concrete adapters
pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAICompatibleAdapter;
