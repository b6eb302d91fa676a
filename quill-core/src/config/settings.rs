//! Process settings read from the environment
//!
//! Missing API keys never stop startup: they are replaced by a placeholder and
//! surface later as an authentication failure from the vendor.

use super::secrets::SecretString;
use crate::http::proxy::ProxyConfig;
use crate::providers::adapter::ProviderId;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tracing::warn;

/// Key sent when no key is configured for a provider
pub const PLACEHOLDER_API_KEY: &str = "missing-api-key";

/// Default per-call timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const RUN_MODE_ENV: &str = "QUILL_ENV";
pub const RUN_MODE_FALLBACK_ENV: &str = "APP_ENV";
pub const PROXY_HOST_ENV: &str = "QUILL_PROXY_HOST";
pub const PROXY_PORT_ENV: &str = "QUILL_PROXY_PORT";
pub const TIMEOUT_ENV: &str = "QUILL_REQUEST_TIMEOUT_SECS";

/// Credentials and endpoint for one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub api_key: SecretString,
    /// Overrides the provider's default base URL when set
    pub base_url: Option<String>,
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Whether a real key (not the placeholder) is configured
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty() && self.api_key.expose_secret() != PLACEHOLDER_API_KEY
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::new(PLACEHOLDER_API_KEY)
    }
}

/// Settings for the routing layer
#[derive(Debug, Clone, Default)]
pub struct Settings {
    run_mode: Option<String>,
    proxy_host: Option<String>,
    proxy_port: Option<String>,
    request_timeout: Option<Duration>,
    providers: HashMap<ProviderId, ProviderSettings>,
}

impl Settings {
    /// Create empty settings (no proxy, placeholder keys, default endpoints)
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every setting from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut settings = Settings {
            run_mode: non_empty(RUN_MODE_ENV).or_else(|| non_empty(RUN_MODE_FALLBACK_ENV)),
            proxy_host: non_empty(PROXY_HOST_ENV),
            proxy_port: non_empty(PROXY_PORT_ENV),
            request_timeout: None,
            providers: HashMap::new(),
        };

        if let Some(raw) = non_empty(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => settings.request_timeout = Some(Duration::from_secs(secs)),
                _ => warn!(
                    "Ignoring invalid {} value '{}', using {}s",
                    TIMEOUT_ENV, raw, DEFAULT_TIMEOUT_SECS
                ),
            }
        }

        for provider in ProviderId::ALL {
            let api_key = non_empty(provider.api_key_env())
                .unwrap_or_else(|| PLACEHOLDER_API_KEY.to_string());
            let base_url = non_empty(provider.base_url_env());
            settings.providers.insert(
                provider,
                ProviderSettings {
                    api_key: SecretString::new(api_key),
                    base_url,
                },
            );
        }

        settings
    }

    pub fn with_run_mode(mut self, run_mode: impl Into<String>) -> Self {
        self.run_mode = Some(run_mode.into());
        self
    }

    pub fn with_proxy(mut self, host: impl Into<String>, port: impl Into<String>) -> Self {
        self.proxy_host = Some(host.into());
        self.proxy_port = Some(port.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_provider(mut self, provider: ProviderId, settings: ProviderSettings) -> Self {
        self.providers.insert(provider, settings);
        self
    }

    pub fn run_mode(&self) -> Option<&str> {
        self.run_mode.as_deref()
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Settings for a provider, falling back to placeholder key and default URL
    pub fn provider(&self, provider: ProviderId) -> ProviderSettings {
        self.providers.get(&provider).cloned().unwrap_or_default()
    }

    /// The proxy every client should use
    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig::resolve(
            self.run_mode.as_deref(),
            self.proxy_host.as_deref(),
            self.proxy_port.as_deref(),
        )
    }
}
