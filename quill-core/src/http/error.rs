//! HTTP error mapping utilities

use crate::providers::error::AdapterError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Map HTTP status code and response body to an AdapterError
pub fn map_http_error(
    status: StatusCode,
    headers: Option<&HeaderMap>,
    body: Option<String>,
    request_id: Uuid,
) -> AdapterError {
    // Try to parse error details from response body
    let error_details = body
        .as_ref()
        .and_then(|b| serde_json::from_str::<Value>(b).ok())
        .and_then(|v| extract_error_details(&v));

    let error_message = error_details
        .as_ref()
        .map(|d| d.message.clone())
        .or_else(|| body.clone().filter(|b| !b.trim().is_empty()))
        .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));

    let message_with_id = format!("{} [request_id: {}]", error_message, request_id);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdapterError::Authentication {
            status: status.as_u16(),
        },

        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = headers
                .and_then(|h| h.get(RETRY_AFTER))
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after)
                .or_else(|| {
                    error_details
                        .and_then(|d| d.retry_after_seconds)
                        .map(Duration::from_secs)
                });

            AdapterError::RateLimited { retry_after }
        }

        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => AdapterError::Timeout,

        status if status.is_server_error() => AdapterError::Server {
            status: status.as_u16(),
            message: message_with_id,
        },

        status => AdapterError::Rejected {
            status: status.as_u16(),
            message: message_with_id,
        },
    }
}

/// Error details extracted from response body
struct ErrorDetails {
    message: String,
    retry_after_seconds: Option<u64>,
}

/// Extract error details from JSON response
fn extract_error_details(json: &Value) -> Option<ErrorDetails> {
    // OpenAI, Anthropic and Gemini all nest under "error" with a "message"
    if let Some(error) = json.get("error") {
        if let Some(message) = error.get("message").and_then(|v| v.as_str()) {
            return Some(ErrorDetails {
                message: message.to_string(),
                retry_after_seconds: error.get("retry_after").and_then(|v| v.as_u64()),
            });
        }
        if let Some(message) = error.as_str() {
            return Some(ErrorDetails {
                message: message.to_string(),
                retry_after_seconds: None,
            });
        }
    }

    // Generic format: { "message": "..." }
    if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
        return Some(ErrorDetails {
            message: message.to_string(),
            retry_after_seconds: json.get("retry_after").and_then(|v| v.as_u64()),
        });
    }

    None
}

/// Parse Retry-After header value
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    // HTTP dates are not handled; seconds only
    header_value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_auth_statuses() {
        let id = Uuid::new_v4();
        assert!(matches!(
            map_http_error(StatusCode::UNAUTHORIZED, None, None, id),
            AdapterError::Authentication { status: 401 }
        ));
        assert!(matches!(
            map_http_error(StatusCode::FORBIDDEN, None, None, id),
            AdapterError::Authentication { status: 403 }
        ));
    }

    #[test]
    fn test_rate_limit_reads_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        let error = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            Some(&headers),
            None,
            Uuid::new_v4(),
        );
        assert_eq!(error.retry_after(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_server_error_uses_body_message() {
        let body = r#"{"error": {"message": "overloaded", "type": "server_error"}}"#;
        let error = map_http_error(
            StatusCode::SERVICE_UNAVAILABLE,
            None,
            Some(body.to_string()),
            Uuid::new_v4(),
        );
        match error {
            AdapterError::Server { status, message } => {
                assert_eq!(status, 503);
                assert!(message.starts_with("overloaded"));
            }
            other => panic!("Expected Server error, got {:?}", other),
        }
    }

    #[test]
    fn test_other_client_errors_are_rejected() {
        let error = map_http_error(
            StatusCode::BAD_REQUEST,
            None,
            Some("bad".to_string()),
            Uuid::new_v4(),
        );
        assert!(matches!(error, AdapterError::Rejected { status: 400, .. }));
        assert!(matches!(
            map_http_error(StatusCode::GATEWAY_TIMEOUT, None, None, Uuid::new_v4()),
            AdapterError::Timeout
        ));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("30"), Some(Duration::from_secs(30)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }
}
