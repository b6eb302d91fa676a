//! Provider selection and ordered fallback
//!
//! Explicit mode calls exactly one provider and surfaces its failure as-is.
//! Auto mode walks a fixed chain, one provider at a time, and stops at the
//! first success. When every provider fails the caller gets a single
//! [`RoutingError::AllProvidersExhausted`]; the per-provider causes are logged
//! and kept in nothing the caller receives.

use crate::config::Settings;
use crate::http::RequestOptions;
use crate::protocol::{Completion, CompletionRequest, NormalizedMessage};
use crate::providers::adapter::{ProviderAdapter, ProviderId};
use crate::providers::anthropic::AnthropicAdapter;
use crate::providers::error::{AdapterError, RoutingError};
use crate::providers::gemini::GeminiAdapter;
use crate::providers::openai::OpenAICompatibleAdapter;
use crate::providers::profiles::ProfileStore;
use crate::providers::registry::ClientRegistry;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Providers tried in auto mode, in order.
///
/// Gemini and DeepSeek are reachable only by explicit selection.
pub const AUTO_CHAIN: [ProviderId; 3] =
    [ProviderId::OpenAI, ProviderId::Anthropic, ProviderId::Qwen];

/// How a request is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMode {
    /// Walk the auto chain until one provider succeeds
    Auto,
    /// Call exactly this provider
    Explicit(ProviderId),
}

impl From<ProviderId> for RouteMode {
    fn from(provider: ProviderId) -> Self {
        RouteMode::Explicit(provider)
    }
}

impl FromStr for RouteMode {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(RouteMode::Auto)
        } else {
            s.parse::<ProviderId>().map(RouteMode::Explicit)
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMode::Auto => f.write_str("auto"),
            RouteMode::Explicit(provider) => write!(f, "{}", provider),
        }
    }
}

/// A provider that failed during routing
#[derive(Debug, Clone, Serialize)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub error: AdapterError,
}

/// Result of a routing operation
#[derive(Debug, Clone, Serialize)]
pub struct RoutingResult {
    /// The normalized reply
    pub completion: Completion,

    /// Which provider ultimately succeeded
    pub provider_used: ProviderId,

    /// Whether a provider other than the first in the chain answered
    pub used_fallback: bool,

    /// Number of providers called
    pub attempts: usize,

    /// Failures before the successful provider, in order
    pub provider_errors: Vec<ProviderFailure>,
}

/// Routes normalized requests to provider adapters
pub struct FallbackOrchestrator {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
    auto_chain: Vec<ProviderId>,
    request_timeout: Duration,
}

impl FallbackOrchestrator {
    /// Wire the registry, built-in profiles and every adapter from settings
    pub fn from_settings(settings: Settings) -> Self {
        let request_timeout = settings.request_timeout();
        let registry = Arc::new(ClientRegistry::new(settings));
        let profiles = Arc::new(ProfileStore::builtin());
        Self::with_components(registry, profiles, request_timeout)
    }

    /// Build from the process environment
    pub fn from_env() -> Self {
        Self::from_settings(Settings::from_env())
    }

    /// Wire every adapter around an existing registry and profile store
    pub fn with_components(
        registry: Arc<ClientRegistry>,
        profiles: Arc<ProfileStore>,
        request_timeout: Duration,
    ) -> Self {
        let mut adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>> = HashMap::new();

        for provider in [ProviderId::OpenAI, ProviderId::Qwen, ProviderId::DeepSeek] {
            // The three providers above all speak the chat completion format
            if let Ok(adapter) =
                OpenAICompatibleAdapter::new(provider, registry.clone(), profiles.clone())
            {
                adapters.insert(provider, Arc::new(adapter));
            }
        }
        adapters.insert(
            ProviderId::Anthropic,
            Arc::new(AnthropicAdapter::new(registry.clone(), profiles.clone())),
        );
        adapters.insert(
            ProviderId::Gemini,
            Arc::new(GeminiAdapter::new(registry, profiles)),
        );

        Self {
            adapters,
            auto_chain: AUTO_CHAIN.to_vec(),
            request_timeout,
        }
    }

    /// Start an orchestrator with hand-picked adapters
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// The fallback chain for a routing mode
    pub fn chain_for(&self, mode: RouteMode) -> Vec<ProviderId> {
        match mode {
            RouteMode::Auto => self.auto_chain.clone(),
            RouteMode::Explicit(provider) => vec![provider],
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Generate a reply and return only its text
    pub async fn generate(
        &self,
        mode: RouteMode,
        system_prompt: &str,
        user_message: &str,
        history: &[NormalizedMessage],
    ) -> Result<String, RoutingError> {
        let request =
            CompletionRequest::new(system_prompt, user_message).with_history(history.to_vec());
        self.route(mode, request)
            .await
            .map(|result| result.completion.into_text())
    }

    /// Route a request and report which provider answered
    pub async fn route(
        &self,
        mode: RouteMode,
        request: CompletionRequest,
    ) -> Result<RoutingResult, RoutingError> {
        match mode {
            RouteMode::Explicit(provider) => self.route_explicit(provider, &request).await,
            RouteMode::Auto => self.route_auto(&request).await,
        }
    }

    async fn route_explicit(
        &self,
        provider: ProviderId,
        request: &CompletionRequest,
    ) -> Result<RoutingResult, RoutingError> {
        let adapter = self
            .adapters
            .get(&provider)
            .ok_or(RoutingError::AdapterNotRegistered(provider))?;

        match self.attempt(adapter.as_ref(), request).await {
            Ok(completion) => Ok(RoutingResult {
                completion,
                provider_used: provider,
                used_fallback: false,
                attempts: 1,
                provider_errors: Vec::new(),
            }),
            Err(source) => {
                warn!("Provider {} failed: {}", provider, source);
                Err(RoutingError::Provider { provider, source })
            }
        }
    }

    async fn route_auto(&self, request: &CompletionRequest) -> Result<RoutingResult, RoutingError> {
        let mut provider_errors = Vec::new();

        for (idx, provider) in self.auto_chain.iter().copied().enumerate() {
            let Some(adapter) = self.adapters.get(&provider) else {
                warn!("No adapter registered for {}, skipping", provider);
                continue;
            };

            match self.attempt(adapter.as_ref(), request).await {
                Ok(completion) => {
                    if idx > 0 {
                        info!("Fallback provider {} succeeded", provider);
                    }
                    return Ok(RoutingResult {
                        completion,
                        provider_used: provider,
                        used_fallback: idx > 0,
                        attempts: provider_errors.len() + 1,
                        provider_errors,
                    });
                }
                Err(error) if !error.is_retryable() => {
                    error!(
                        "Provider {} is misconfigured: {}; trying next provider",
                        provider, error
                    );
                    provider_errors.push(ProviderFailure { provider, error });
                }
                Err(error) => {
                    warn!(
                        "Provider {} failed ({:?}): {}; trying next provider",
                        provider,
                        error.kind(),
                        error
                    );
                    provider_errors.push(ProviderFailure { provider, error });
                }
            }
        }

        error!(
            "All {} providers failed: {:?}",
            provider_errors.len(),
            provider_errors
                .iter()
                .map(|f| format!("{}: {}", f.provider, f.error))
                .collect::<Vec<_>>()
        );
        Err(RoutingError::AllProvidersExhausted)
    }

    /// One bounded call to one adapter
    async fn attempt(
        &self,
        adapter: &dyn ProviderAdapter,
        request: &CompletionRequest,
    ) -> Result<Completion, AdapterError> {
        let options = RequestOptions::new().with_timeout(self.request_timeout);
        debug!(
            "Attempting {} [request_id: {}]",
            adapter.provider(),
            options.request_id
        );

        // The transport has its own timeout; this bounds adapters that don't.
        match tokio::time::timeout(self.request_timeout, adapter.complete(request, &options)).await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Provider {} exceeded {:?} [request_id: {}]",
                    adapter.provider(),
                    self.request_timeout,
                    options.request_id
                );
                Err(AdapterError::Timeout)
            }
        }
    }
}

/// Builder for orchestrators with custom adapters
pub struct OrchestratorBuilder {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
    auto_chain: Vec<ProviderId>,
    request_timeout: Duration,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
            auto_chain: AUTO_CHAIN.to_vec(),
            request_timeout: RequestOptions::default().timeout,
        }
    }

    /// Register an adapter under its own provider id, replacing any previous one
    pub fn adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.provider(), adapter);
        self
    }

    /// Replace the auto chain
    pub fn auto_chain(mut self, chain: Vec<ProviderId>) -> Self {
        self.auto_chain = chain;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the orchestrator; every auto-chain provider needs an adapter
    pub fn build(self) -> Result<FallbackOrchestrator, RoutingError> {
        if let Some(missing) = self
            .auto_chain
            .iter()
            .find(|p| !self.adapters.contains_key(*p))
        {
            return Err(RoutingError::AdapterNotRegistered(*missing));
        }

        Ok(FallbackOrchestrator {
            adapters: self.adapters,
            auto_chain: self.auto_chain,
            request_timeout: self.request_timeout,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
