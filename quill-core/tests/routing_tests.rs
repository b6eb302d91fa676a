//! Fallback orchestration tests with scripted adapters and mock vendors

use async_trait::async_trait;
use quill_core::config::{ProviderSettings, Settings};
use quill_core::http::RequestOptions;
use quill_core::protocol::{Completion, CompletionRequest};
use quill_core::providers::{
    AdapterError, FallbackOrchestrator, ProviderAdapter, ProviderId, RouteMode, RoutingError,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Adapter that replays a fixed outcome and records every call
struct ScriptedAdapter {
    provider: ProviderId,
    outcome: Result<&'static str, AdapterError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    log: Arc<Mutex<Vec<ProviderId>>>,
}

impl ScriptedAdapter {
    fn new(
        provider: ProviderId,
        outcome: Result<&'static str, AdapterError>,
        log: &Arc<Mutex<Vec<ProviderId>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            provider,
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
            log: log.clone(),
        })
    }

    fn slow(provider: ProviderId, delay: Duration, log: &Arc<Mutex<Vec<ProviderId>>>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            outcome: Ok("too late"),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            log: log.clone(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn complete(
        &self,
        _request: &CompletionRequest,
        _options: &RequestOptions,
    ) -> Result<Completion, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(self.provider);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map(Completion::new)
    }
}

fn server_error() -> AdapterError {
    AdapterError::Server {
        status: 500,
        message: "vendor internals: stack trace".to_string(),
    }
}

fn orchestrator(adapters: &[Arc<ScriptedAdapter>]) -> FallbackOrchestrator {
    adapters
        .iter()
        .fold(FallbackOrchestrator::builder(), |builder, adapter| {
            builder.adapter(adapter.clone() as Arc<dyn ProviderAdapter>)
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_first_provider_success_stops_the_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let openai = ScriptedAdapter::new(ProviderId::OpenAI, Ok("from openai"), &log);
    let anthropic = ScriptedAdapter::new(ProviderId::Anthropic, Ok("from anthropic"), &log);
    let qwen = ScriptedAdapter::new(ProviderId::Qwen, Ok("from qwen"), &log);
    let orchestrator = orchestrator(&[openai.clone(), anthropic.clone(), qwen.clone()]);

    let result = orchestrator
        .route(RouteMode::Auto, CompletionRequest::new("sys", "hi"))
        .await
        .unwrap();

    assert_eq!(result.completion.text, "from openai");
    assert_eq!(result.provider_used, ProviderId::OpenAI);
    assert!(!result.used_fallback);
    assert_eq!(result.attempts, 1);
    assert_eq!(anthropic.calls() + qwen.calls(), 0);
}

#[tokio::test]
async fn test_fallback_follows_chain_order_and_stops_at_success() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let openai = ScriptedAdapter::new(ProviderId::OpenAI, Err(server_error()), &log);
    let anthropic = ScriptedAdapter::new(ProviderId::Anthropic, Ok("second"), &log);
    let qwen = ScriptedAdapter::new(ProviderId::Qwen, Ok("third"), &log);
    let orchestrator = orchestrator(&[openai, anthropic, qwen.clone()]);

    let result = orchestrator
        .route(RouteMode::Auto, CompletionRequest::new("sys", "hi"))
        .await
        .unwrap();

    assert_eq!(result.completion.text, "second");
    assert_eq!(result.provider_used, ProviderId::Anthropic);
    assert!(result.used_fallback);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.provider_errors.len(), 1);
    assert_eq!(result.provider_errors[0].provider, ProviderId::OpenAI);
    assert_eq!(qwen.calls(), 0);
    assert_eq!(
        *log.lock().unwrap(),
        vec![ProviderId::OpenAI, ProviderId::Anthropic]
    );
}

#[tokio::test]
async fn test_exhaustion_returns_generic_error() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let adapters = [
        ScriptedAdapter::new(ProviderId::OpenAI, Err(server_error()), &log),
        ScriptedAdapter::new(
            ProviderId::Anthropic,
            Err(AdapterError::Authentication { status: 401 }),
            &log,
        ),
        ScriptedAdapter::new(
            ProviderId::Qwen,
            Err(AdapterError::MalformedResponse("no choices".into())),
            &log,
        ),
    ];
    let orchestrator = orchestrator(&adapters);

    let err = orchestrator
        .generate(RouteMode::Auto, "sys", "hi", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, RoutingError::AllProvidersExhausted));
    let message = err.to_string();
    assert!(!message.contains("stack trace"));
    assert!(!message.contains("401"));
    assert!(err.adapter_error().is_none());
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_explicit_mode_never_falls_back() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let openai = ScriptedAdapter::new(ProviderId::OpenAI, Ok("openai"), &log);
    let anthropic = ScriptedAdapter::new(ProviderId::Anthropic, Ok("anthropic"), &log);
    let qwen = ScriptedAdapter::new(ProviderId::Qwen, Ok("qwen"), &log);
    let gemini = ScriptedAdapter::new(ProviderId::Gemini, Err(server_error()), &log);
    let orchestrator = orchestrator(&[openai.clone(), anthropic, qwen, gemini.clone()]);

    let err = orchestrator
        .generate(RouteMode::Explicit(ProviderId::Gemini), "sys", "hi", &[])
        .await
        .unwrap_err();

    match &err {
        RoutingError::Provider { provider, source } => {
            assert_eq!(*provider, ProviderId::Gemini);
            assert!(matches!(source, AdapterError::Server { status: 500, .. }));
        }
        other => panic!("expected provider error, got {other:?}"),
    }
    assert_eq!(gemini.calls(), 1);
    assert_eq!(openai.calls(), 0);
}

#[tokio::test]
async fn test_explicit_mode_reaches_providers_outside_auto_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let adapters = [
        ScriptedAdapter::new(ProviderId::OpenAI, Ok("openai"), &log),
        ScriptedAdapter::new(ProviderId::Anthropic, Ok("anthropic"), &log),
        ScriptedAdapter::new(ProviderId::Qwen, Ok("qwen"), &log),
        ScriptedAdapter::new(ProviderId::DeepSeek, Ok("deepseek"), &log),
    ];
    let orchestrator = orchestrator(&adapters);

    let text = assert_ok!(
        orchestrator
            .generate(RouteMode::Explicit(ProviderId::DeepSeek), "sys", "hi", &[])
            .await
    );
    assert_eq!(text, "deepseek");
}

#[tokio::test]
async fn test_explicit_mode_without_adapter() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = orchestrator(&[
        ScriptedAdapter::new(ProviderId::OpenAI, Ok("a"), &log),
        ScriptedAdapter::new(ProviderId::Anthropic, Ok("b"), &log),
        ScriptedAdapter::new(ProviderId::Qwen, Ok("c"), &log),
    ]);

    let err = assert_err!(
        orchestrator
            .generate(RouteMode::Explicit(ProviderId::Gemini), "sys", "hi", &[])
            .await
    );
    assert!(matches!(
        err,
        RoutingError::AdapterNotRegistered(ProviderId::Gemini)
    ));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_misconfigured_provider_is_skipped_in_auto_mode() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let openai = ScriptedAdapter::new(
        ProviderId::OpenAI,
        Err(AdapterError::Configuration("invalid base URL".into())),
        &log,
    );
    let anthropic = ScriptedAdapter::new(ProviderId::Anthropic, Ok("from anthropic"), &log);
    let qwen = ScriptedAdapter::new(ProviderId::Qwen, Ok("never"), &log);
    let orchestrator = orchestrator(&[openai, anthropic.clone(), qwen.clone()]);

    let result = orchestrator
        .route(RouteMode::Auto, CompletionRequest::new("sys", "hi"))
        .await
        .unwrap();

    assert_eq!(result.completion.text, "from anthropic");
    assert!(result.used_fallback);
    assert!(matches!(
        result.provider_errors[0].error,
        AdapterError::Configuration(_)
    ));
    assert_eq!(anthropic.calls(), 1);
    assert_eq!(qwen.calls(), 0);
}

#[tokio::test]
async fn test_all_misconfigured_providers_exhaust_the_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let adapters = [ProviderId::OpenAI, ProviderId::Anthropic, ProviderId::Qwen].map(|p| {
        ScriptedAdapter::new(
            p,
            Err(AdapterError::Configuration(format!("bad base URL for {p}"))),
            &log,
        )
    });
    let orchestrator = orchestrator(&adapters);

    let err = orchestrator
        .generate(RouteMode::Auto, "sys", "hi", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, RoutingError::AllProvidersExhausted));
    assert!(!err.to_string().contains("base URL"));
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_explicit_mode_surfaces_configuration_error() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let adapters = [
        ScriptedAdapter::new(
            ProviderId::OpenAI,
            Err(AdapterError::Configuration("invalid base URL".into())),
            &log,
        ),
        ScriptedAdapter::new(ProviderId::Anthropic, Ok("never"), &log),
        ScriptedAdapter::new(ProviderId::Qwen, Ok("never"), &log),
    ];
    let orchestrator = orchestrator(&adapters);

    let err = orchestrator
        .generate(RouteMode::Explicit(ProviderId::OpenAI), "sys", "hi", &[])
        .await
        .unwrap_err();

    assert!(matches!(
        err.adapter_error(),
        Some(AdapterError::Configuration(_))
    ));
    assert_eq!(*log.lock().unwrap(), vec![ProviderId::OpenAI]);
}

#[tokio::test]
async fn test_slow_provider_is_bounded_and_skipped() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let openai = ScriptedAdapter::slow(ProviderId::OpenAI, Duration::from_secs(5), &log);
    let anthropic = ScriptedAdapter::new(ProviderId::Anthropic, Ok("fast"), &log);
    let qwen = ScriptedAdapter::new(ProviderId::Qwen, Ok("unused"), &log);
    let orchestrator = FallbackOrchestrator::builder()
        .adapter(openai)
        .adapter(anthropic)
        .adapter(qwen)
        .request_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let result = orchestrator
        .route(RouteMode::Auto, CompletionRequest::new("sys", "hi"))
        .await
        .unwrap();

    assert_eq!(result.completion.text, "fast");
    assert!(matches!(
        result.provider_errors[0].error,
        AdapterError::Timeout
    ));
}

#[tokio::test]
async fn test_custom_auto_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let qwen = ScriptedAdapter::new(ProviderId::Qwen, Err(server_error()), &log);
    let openai = ScriptedAdapter::new(ProviderId::OpenAI, Ok("openai"), &log);
    let orchestrator = FallbackOrchestrator::builder()
        .adapter(qwen)
        .adapter(openai)
        .auto_chain(vec![ProviderId::Qwen, ProviderId::OpenAI])
        .build()
        .unwrap();

    let text = orchestrator
        .generate(RouteMode::Auto, "sys", "hi", &[])
        .await
        .unwrap();

    assert_eq!(text, "openai");
    assert_eq!(
        *log.lock().unwrap(),
        vec![ProviderId::Qwen, ProviderId::OpenAI]
    );
}

#[tokio::test]
async fn test_unauthorized_primary_falls_back_to_anthropic_over_http() {
    let openai_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Incorrect API key provided"}})),
        )
        .expect(1)
        .mount(&openai_server)
        .await;

    let anthropic_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Hi there!"}]
        })))
        .expect(1)
        .mount(&anthropic_server)
        .await;

    let qwen_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&qwen_server)
        .await;

    let settings = Settings::new()
        .with_provider(
            ProviderId::OpenAI,
            ProviderSettings::new("sk-wrong").with_base_url(openai_server.uri()),
        )
        .with_provider(
            ProviderId::Anthropic,
            ProviderSettings::new("sk-ant").with_base_url(anthropic_server.uri()),
        )
        .with_provider(
            ProviderId::Qwen,
            ProviderSettings::new("sk-qwen").with_base_url(qwen_server.uri()),
        );
    let orchestrator = FallbackOrchestrator::from_settings(settings);

    let reply = orchestrator
        .generate(RouteMode::Auto, "You are helpful.", "Hello", &[])
        .await
        .unwrap();

    assert_eq!(reply, "Hi there!");
}

#[tokio::test]
async fn test_placeholder_key_reaches_vendor_and_fails_there() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(wiremock::matchers::header(
            "authorization",
            "Bearer missing-api-key",
        ))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings::new().with_provider(
        ProviderId::DeepSeek,
        ProviderSettings::default().with_base_url(server.uri()),
    );
    let orchestrator = FallbackOrchestrator::from_settings(settings);

    let err = orchestrator
        .generate(RouteMode::Explicit(ProviderId::DeepSeek), "", "hi", &[])
        .await
        .unwrap_err();

    assert!(matches!(
        err.adapter_error(),
        Some(AdapterError::Authentication { status: 401 })
    ));
}

async fn healthy_anthropic() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Hi there!"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_malformed_primary_base_url_falls_back_over_http() {
    let anthropic_server = healthy_anthropic().await;
    let settings = Settings::new()
        .with_provider(
            ProviderId::OpenAI,
            ProviderSettings::new("sk-openai").with_base_url("api.openai.com/v1"),
        )
        .with_provider(
            ProviderId::Anthropic,
            ProviderSettings::new("sk-ant").with_base_url(anthropic_server.uri()),
        );
    let orchestrator = FallbackOrchestrator::from_settings(settings);

    let reply = orchestrator
        .generate(RouteMode::Auto, "You are helpful.", "Hello", &[])
        .await
        .unwrap();

    assert_eq!(reply, "Hi there!");
}

#[tokio::test]
async fn test_unusable_primary_key_falls_back_over_http() {
    let anthropic_server = healthy_anthropic().await;
    let settings = Settings::new()
        .with_provider(ProviderId::OpenAI, ProviderSettings::new("sk-abc\n"))
        .with_provider(
            ProviderId::Anthropic,
            ProviderSettings::new("sk-ant").with_base_url(anthropic_server.uri()),
        );
    let orchestrator = FallbackOrchestrator::from_settings(settings);

    let reply = orchestrator
        .generate(RouteMode::Auto, "You are helpful.", "Hello", &[])
        .await
        .unwrap();

    assert_eq!(reply, "Hi there!");
}
