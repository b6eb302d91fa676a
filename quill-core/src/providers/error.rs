//! Adapter and routing error types

use crate::providers::adapter::ProviderId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Failure classes the orchestrator reasons about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Local configuration is unusable (bad proxy settings, bad base URL)
    Configuration,
    /// The vendor rejected the credentials
    Authentication,
    /// Timeouts, connection failures, rate limits and retryable statuses
    TransientNetwork,
    /// 2xx with a body the adapter could not normalize
    MalformedResponse,
}

/// Errors a single provider call can produce
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum AdapterError {
    /// Client could not be built from the current configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Credentials rejected (401/403)
    #[error("Authentication failed (HTTP {status})")]
    Authentication { status: u16 },

    /// Too many requests
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    /// The call exceeded its deadline
    #[error("Request timeout")]
    Timeout,

    /// Connection refused, reset, DNS failure, ...
    #[error("Network error: {0}")]
    Network(String),

    /// 5xx from the vendor
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-2xx status
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 2xx but the body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl AdapterError {
    /// Map onto the failure classes used for routing decisions
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::RateLimited { .. }
            | Self::Timeout
            | Self::Network(_)
            | Self::Server { .. }
            | Self::Rejected { .. } => ErrorKind::TransientNetwork,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    /// Whether the next provider in a fallback chain may be tried.
    ///
    /// Authentication failures are final for the vendor that raised them but
    /// say nothing about the next vendor's credentials.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Configuration)
    }

    /// Suggested wait before calling the same vendor again, when known
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Network(format!("Connection failed: {}", err))
        } else if err.is_builder() {
            AdapterError::Configuration(err.to_string())
        } else if err.is_decode() {
            AdapterError::MalformedResponse(err.to_string())
        } else {
            AdapterError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::MalformedResponse(err.to_string())
    }
}

/// Errors surfaced to callers of the routing layer
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Every provider in the chain failed; causes are logged, not returned
    #[error("failed to generate a response")]
    AllProvidersExhausted,

    /// The explicitly requested provider failed
    #[error("{provider}: {source}")]
    Provider {
        provider: ProviderId,
        #[source]
        source: AdapterError,
    },

    /// No adapter is registered for the provider
    #[error("No adapter registered for provider '{0}'")]
    AdapterNotRegistered(ProviderId),

    /// The routing target could not be parsed
    #[error("Unknown provider or routing mode '{0}'")]
    UnknownRoute(String),
}

impl RoutingError {
    /// The adapter failure behind an explicit-mode error, if any
    pub fn adapter_error(&self) -> Option<&AdapterError> {
        match self {
            Self::Provider { source, .. } => Some(source),
            _ => None,
        }
    }
}
