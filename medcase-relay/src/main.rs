use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use medcase_relay::{
    build_router, cors_layer, GeminiGenerator, RelayConfig, RelayState, SupabaseSource,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::parse();

    let source = SupabaseSource::new(
        &config.supabase_url,
        &config.supabase_key,
        config.request_timeout_secs,
    )
    .context("Failed to build Supabase client")?;
    let generator = GeminiGenerator::new(
        &config.gemini_base_url,
        &config.gemini_api_key,
        &config.gemini_model,
        config.request_timeout_secs,
    )
    .context("Failed to build Gemini client")?;

    let state = RelayState::new(Arc::new(source), Arc::new(generator), config.compare_limit);
    let cors = cors_layer(&config.allowed_origin)
        .with_context(|| format!("Invalid allowed origin {:?}", config.allowed_origin))?;
    let app = build_router(state, cors);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    tracing::info!(
        addr = %config.addr,
        model = %config.gemini_model,
        origin = %config.allowed_origin,
        "medcase relay listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("medcase relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
