//! Outbound proxy selection for restricted networks
//!
//! The proxy is a development escape hatch. It is computed purely from the
//! run mode and the proxy host/port, and it is never active in production.

use crate::providers::error::AdapterError;
use url::Url;

/// Run-mode values that count as a production deployment
const PRODUCTION_MODES: &[&str] = &["production", "prod"];

/// Whether a run-mode flag denotes production
pub fn is_production(run_mode: Option<&str>) -> bool {
    run_mode
        .map(|mode| {
            let mode = mode.trim().to_ascii_lowercase();
            PRODUCTION_MODES.contains(&mode.as_str())
        })
        .unwrap_or(false)
}

/// Proxy configuration shared by every provider client
///
/// Either empty, or carrying a single proxy URL used for both HTTP and
/// HTTPS traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    url: Option<String>,
}

impl ProxyConfig {
    /// No proxy
    pub fn none() -> Self {
        Self::default()
    }

    /// Compute the proxy from the environment inputs.
    ///
    /// Returns an empty configuration in production, or when either host or
    /// port is missing or blank.
    pub fn resolve(run_mode: Option<&str>, host: Option<&str>, port: Option<&str>) -> Self {
        if is_production(run_mode) {
            return Self::none();
        }

        let host = host.map(str::trim).filter(|h| !h.is_empty());
        let port = port.map(str::trim).filter(|p| !p.is_empty());

        match (host, port) {
            (Some(host), Some(port)) => {
                let host = host.trim_end_matches('/');
                let url = if host.contains("://") {
                    format!("{}:{}", host, port)
                } else {
                    format!("http://{}:{}", host, port)
                };
                Self { url: Some(url) }
            }
            _ => Self::none(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.url.is_some()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Build the reqwest proxy covering HTTP and HTTPS.
    ///
    /// Malformed host or port values surface here as a configuration error,
    /// i.e. when the first client that needs the proxy is constructed.
    pub fn to_reqwest(&self) -> Result<Option<reqwest::Proxy>, AdapterError> {
        let Some(raw) = self.url.as_deref() else {
            return Ok(None);
        };

        let parsed = Url::parse(raw).map_err(|e| {
            AdapterError::Configuration(format!("Invalid proxy URL '{}': {}", raw, e))
        })?;
        if parsed.host_str().is_none() || parsed.port_or_known_default().is_none() {
            return Err(AdapterError::Configuration(format!(
                "Invalid proxy URL '{}': missing host or port",
                raw
            )));
        }

        reqwest::Proxy::all(parsed.as_str())
            .map(Some)
            .map_err(|e| AdapterError::Configuration(format!("Invalid proxy URL '{}': {}", raw, e)))
    }
}
