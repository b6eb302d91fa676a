//! Lazily constructed, per-provider clients
//!
//! The registry owns one slot per [`ProviderId`]. The first call to
//! [`ClientRegistry::get_client`] for a provider builds its client; later
//! calls return the same `Arc`. Construction is synchronous and runs inside
//! `OnceLock::get_or_init`, so concurrent callers can never build twice.
//! A construction failure is cached in the slot as well and returned to every
//! later caller.

use crate::config::{ProviderSettings, Settings};
use crate::http::{ProviderClient, ProxyConfig};
use crate::providers::adapter::ProviderId;
use crate::providers::error::AdapterError;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Builds a client for one provider
pub type ClientFactory = dyn Fn(
    ProviderId,
    &ProviderSettings,
    &ProxyConfig,
) -> Result<ProviderClient, AdapterError>
    + Send
    + Sync;

type Slot = OnceLock<Result<Arc<ProviderClient>, AdapterError>>;

/// Get-or-create holder for provider clients
pub struct ClientRegistry {
    settings: Settings,
    proxy: ProxyConfig,
    factory: Box<ClientFactory>,
    slots: HashMap<ProviderId, Slot>,
}

impl ClientRegistry {
    /// Registry that builds real reqwest-backed clients
    pub fn new(settings: Settings) -> Self {
        Self::with_factory(settings, ProviderClient::build)
    }

    /// Registry with a custom construction function
    pub fn with_factory<F>(settings: Settings, factory: F) -> Self
    where
        F: Fn(ProviderId, &ProviderSettings, &ProxyConfig) -> Result<ProviderClient, AdapterError>
            + Send
            + Sync
            + 'static,
    {
        let proxy = settings.proxy_config();
        let slots = ProviderId::ALL
            .into_iter()
            .map(|provider| (provider, OnceLock::new()))
            .collect();

        Self {
            settings,
            proxy,
            factory: Box::new(factory),
            slots,
        }
    }

    /// Return the client for `provider`, constructing it on first use
    pub fn get_client(&self, provider: ProviderId) -> Result<Arc<ProviderClient>, AdapterError> {
        let slot = self.slots.get(&provider).ok_or_else(|| {
            AdapterError::Configuration(format!("No client slot for provider '{}'", provider))
        })?;

        slot.get_or_init(|| {
            debug!("Constructing client for {}", provider);
            let provider_settings = self.settings.provider(provider);
            (self.factory)(provider, &provider_settings, &self.proxy).map(Arc::new)
        })
        .clone()
    }

    /// Whether the slot for `provider` has been filled (successfully or not)
    pub fn is_constructed(&self, provider: ProviderId) -> bool {
        self.slots
            .get(&provider)
            .map(|slot| slot.get().is_some())
            .unwrap_or(false)
    }
}

impl fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constructed: Vec<_> = ProviderId::ALL
            .into_iter()
            .filter(|p| self.is_constructed(*p))
            .collect();
        f.debug_struct("ClientRegistry")
            .field("proxy", &self.proxy)
            .field("constructed", &constructed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_registry(counter: Arc<AtomicUsize>) -> ClientRegistry {
        ClientRegistry::with_factory(Settings::new(), move |provider, settings, proxy| {
            counter.fetch_add(1, Ordering::SeqCst);
            ProviderClient::build(provider, settings, proxy)
        })
    }

    #[test]
    fn test_same_instance_on_repeat_calls() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(counter.clone());

        for provider in ProviderId::ALL {
            let first = registry.get_client(provider).unwrap();
            let second = registry.get_client(provider).unwrap();
            assert!(Arc::ptr_eq(&first, &second));
        }
        assert_eq!(counter.load(Ordering::SeqCst), ProviderId::ALL.len());
    }

    #[test]
    fn test_lazy_until_first_use() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(counter.clone());

        assert!(!registry.is_constructed(ProviderId::Anthropic));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        registry.get_client(ProviderId::Anthropic).unwrap();
        assert!(registry.is_constructed(ProviderId::Anthropic));
        assert!(!registry.is_constructed(ProviderId::OpenAI));
    }

    #[test]
    fn test_concurrent_callers_construct_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(counter.clone());

        let clients: Vec<Arc<ProviderClient>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| scope.spawn(|| registry.get_client(ProviderId::OpenAI).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(clients.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_construction_failure_is_cached() {
        let counter = Arc::new(AtomicUsize::new(0));
        let settings = Settings::new().with_provider(
            ProviderId::Gemini,
            ProviderSettings::new("key").with_base_url("::not a url::"),
        );
        let seen = counter.clone();
        let registry = ClientRegistry::with_factory(settings, move |provider, settings, proxy| {
            seen.fetch_add(1, Ordering::SeqCst);
            ProviderClient::build(provider, settings, proxy)
        });

        for _ in 0..3 {
            assert!(matches!(
                registry.get_client(ProviderId::Gemini),
                Err(AdapterError::Configuration(_))
            ));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_independent_registries() {
        let a = ClientRegistry::new(Settings::new());
        let b = ClientRegistry::new(Settings::new());
        let client_a = a.get_client(ProviderId::Qwen).unwrap();
        let client_b = b.get_client(ProviderId::Qwen).unwrap();
        assert!(!Arc::ptr_eq(&client_a, &client_b));
    }

    #[test]
    fn test_missing_key_does_not_block_construction() {
        let registry = ClientRegistry::new(Settings::new());
        let client = registry.get_client(ProviderId::DeepSeek).unwrap();
        assert_eq!(
            client.api_key().expose_secret(),
            crate::config::PLACEHOLDER_API_KEY
        );
    }
}
