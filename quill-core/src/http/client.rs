//! Provider client built on reqwest

use crate::config::{ProviderSettings, SecretString};
use crate::http::error::map_http_error;
use crate::http::proxy::ProxyConfig;
use crate::http::RequestOptions;
use crate::providers::adapter::ProviderId;
use crate::providers::error::AdapterError;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// Maximum response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("quill/", env!("CARGO_PKG_VERSION"));

/// The network handle for one provider
///
/// Holds the resolved base URL, the API key and a pooled reqwest client.
/// Nothing in it changes after construction.
#[derive(Debug)]
pub struct ProviderClient {
    provider: ProviderId,
    base_url: String,
    api_key: SecretString,
    http: Client,
    max_response_size: usize,
}

impl ProviderClient {
    /// Build a client for `provider` from its settings and the shared proxy
    pub fn build(
        provider: ProviderId,
        settings: &ProviderSettings,
        proxy: &ProxyConfig,
    ) -> Result<Self, AdapterError> {
        let raw_base = settings
            .base_url
            .as_deref()
            .unwrap_or_else(|| provider.default_base_url());
        Url::parse(raw_base).map_err(|e| {
            AdapterError::Configuration(format!(
                "Invalid base URL '{}' for {}: {}",
                raw_base, provider, e
            ))
        })?;

        let mut builder = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .gzip(true);

        if let Some(reqwest_proxy) = proxy.to_reqwest()? {
            debug!(
                "Routing {} through proxy {}",
                provider,
                proxy.url().unwrap_or_default()
            );
            builder = builder.proxy(reqwest_proxy);
        } else {
            // Ambient HTTP(S)_PROXY variables are ignored
            builder = builder.no_proxy();
        }

        let http = builder.build().map_err(|e| {
            AdapterError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        info!("Constructed client for {} at {}", provider, raw_base);
        if !settings.has_api_key() {
            warn!(
                "No API key configured for {}; requests will be rejected by the vendor",
                provider
            );
        }

        Ok(Self {
            provider,
            base_url: raw_base.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            http,
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    /// POST a JSON body to `base_url + path` and return the parsed JSON body.
    ///
    /// The status code is checked before the body is parsed; non-2xx bodies
    /// have no guaranteed shape. `query` is never logged since it may carry
    /// credentials.
    pub async fn post_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
        body: &Value,
        options: &RequestOptions,
    ) -> Result<Value, AdapterError> {
        let request_id = options.request_id;
        let url = format!("{}{}", self.base_url, path);

        info!(
            "Executing HTTP request to {} [request_id: {}]",
            self.provider, request_id
        );
        debug!("Request URL: {}", url);

        let mut req_builder = self
            .http
            .post(&url)
            .timeout(options.timeout)
            .headers(headers)
            .header("X-Request-ID", request_id.to_string())
            .json(body);
        if !query.is_empty() {
            req_builder = req_builder.query(query);
        }

        let response = req_builder.send().await.map_err(|e| {
            // Strip the URL so query-string keys never reach logs or errors
            let e = e.without_url();
            if e.is_timeout() {
                warn!(
                    "Request timeout for {} [request_id: {}]",
                    self.provider, request_id
                );
                AdapterError::Timeout
            } else if e.is_connect() {
                error!(
                    "Connection error for {} [request_id: {}]: {}",
                    self.provider, request_id, e
                );
                AdapterError::Network(format!(
                    "Connection failed: {} [request_id: {}]",
                    e, request_id
                ))
            } else {
                error!(
                    "Request error for {} [request_id: {}]: {}",
                    self.provider, request_id, e
                );
                AdapterError::Network(format!("{} [request_id: {}]", e, request_id))
            }
        })?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.ok();

            warn!(
                "Request failed with status {} for {} [request_id: {}]",
                status, self.provider, request_id
            );

            return Err(map_http_error(status, Some(&headers), body, request_id));
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_size {
                return Err(AdapterError::MalformedResponse(format!(
                    "Response size {} exceeds maximum {} [request_id: {}]",
                    content_length, self.max_response_size, request_id
                )));
            }
        }

        let response_text = response.text().await.map_err(|e| {
            let e = e.without_url();
            if e.is_timeout() {
                AdapterError::Timeout
            } else {
                AdapterError::Network(format!(
                    "Failed to read response body: {} [request_id: {}]",
                    e, request_id
                ))
            }
        })?;

        if response_text.len() > self.max_response_size {
            return Err(AdapterError::MalformedResponse(format!(
                "Response size {} exceeds maximum {} [request_id: {}]",
                response_text.len(),
                self.max_response_size,
                request_id
            )));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            error!(
                "Failed to parse response from {} [request_id: {}]: {}",
                self.provider, request_id, e
            );
            AdapterError::MalformedResponse(format!(
                "Invalid JSON body: {} [request_id: {}]",
                e, request_id
            ))
        })
    }
}
