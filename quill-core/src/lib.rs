//! Quill Core Library
//!
//! Routes single-turn chat completions across several AI vendors. A caller
//! hands a system prompt, a user message and optional history to
//! [`FallbackOrchestrator`], which either pins one provider or walks an
//! ordered fallback chain until some vendor produces text.
//!
//! ```no_run
//! use quill_core::{FallbackOrchestrator, RouteMode};
//!
//! # async fn run() -> Result<(), quill_core::RoutingError> {
//! let orchestrator = FallbackOrchestrator::from_env();
//! let reply = orchestrator
//!     .generate(RouteMode::Auto, "You are terse.", "Say hello", &[])
//!     .await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod http;
pub mod protocol;
pub mod providers;

pub use catalog::{list_available_models, CatalogModel};
pub use config::{CatalogConfig, ConfigError, Settings};
pub use protocol::{Completion, CompletionRequest, MessageRole, NormalizedMessage};
pub use providers::{
    AdapterError, ClientRegistry, FallbackOrchestrator, ProfileStore, ProviderAdapter, ProviderId,
    RouteMode, RoutingError, RoutingResult,
};

/// Returns the version of the Quill Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
