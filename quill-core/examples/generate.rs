//! Route one prompt through the provider chain
//!
//! Reads keys from the usual `*_API_KEY` variables and prints the reply along
//! with the provider that produced it.
//!
//! Run with:
//! `cargo run --example generate -- [auto|openai|anthropic|qwen|deepseek|gemini] "prompt"`

use anyhow::Context;
use quill_core::{
    list_available_models, CatalogConfig, CompletionRequest, FallbackOrchestrator, RouteMode,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quill_core=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let mode: RouteMode = args
        .next()
        .unwrap_or_else(|| "auto".to_string())
        .parse()
        .context("unknown route")?;
    let prompt = args.next().unwrap_or_else(|| "Say hello in five words.".to_string());

    println!("Available models:");
    for model in list_available_models(&CatalogConfig::builtin()) {
        println!("  {:<28} {} ({})", model.id, model.display_name, model.provider_name);
    }
    println!();

    let orchestrator = FallbackOrchestrator::from_env();
    println!("Routing '{}' via {:?}", mode, orchestrator.chain_for(mode));

    let request = CompletionRequest::new("You are a concise assistant.", prompt);
    let result = orchestrator
        .route(mode, request)
        .await
        .context("completion failed")?;

    println!(
        "\n[{}{}] {}",
        result.provider_used,
        if result.used_fallback { ", fallback" } else { "" },
        result.completion.text
    );
    Ok(())
}
