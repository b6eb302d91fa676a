//! HTTP layer for talking to vendor APIs
//!
//! This module implements the transport shared by every adapter, handling:
//! - Client construction with connection pooling and the optional proxy
//! - Per-call timeouts and request ID correlation
//! - Status checking and error mapping before any body is parsed

pub mod client;
pub mod error;
pub mod proxy;

pub use client::ProviderClient;
pub use error::map_http_error;
pub use proxy::ProxyConfig;

use std::time::Duration;
use uuid::Uuid;

/// Options for one outbound call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Unique request ID for correlation
    pub request_id: Uuid,

    /// Deadline for the whole call; expiry is reported as a retryable timeout
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RequestOptions {
    /// Create new request options with a generated request ID
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for this request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
