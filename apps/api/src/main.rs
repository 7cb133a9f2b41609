mod config;
mod errors;
mod extraction;
mod fitment;
mod llm_client;
mod report;
mod retrieval;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::fitment::pipeline::FitmentPipeline;
use crate::llm_client::{build_completion_client, build_http_client};
use crate::report::ReportRenderer;
use crate::retrieval::embedder::{Embedder, GeminiEmbedder};
use crate::retrieval::index::VectorRetriever;
use crate::retrieval::ContextRetriever;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fitment API v{}", env!("CARGO_PKG_VERSION"));

    let http = build_http_client(config.completion_timeout_secs)?;

    // Initialize retrieval handle (index loaded once, shared read-only)
    let embedder: Arc<dyn Embedder> = Arc::new(GeminiEmbedder::new(
        http.clone(),
        &config.gemini_base_url,
        &config.gemini_api_key,
        &config.embedding_model,
    ));
    let retriever: Arc<dyn ContextRetriever> = Arc::new(
        VectorRetriever::open(&config.retrieval_index_path, embedder, config.retrieval_top_k)
            .await
            .context("Failed to open retrieval index")?,
    );

    // Initialize completion client
    let completion = build_completion_client(&config, http)?;
    info!("Completion client initialized (model: {})", completion.model());

    // Reports directory
    tokio::fs::create_dir_all(&config.reports_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.reports_dir.display()))?;
    let renderer = ReportRenderer::new(&config.reports_dir);
    info!("Writing reports to {}", renderer.output_dir().display());

    // Build app state
    let state = AppState {
        pipeline: Arc::new(FitmentPipeline::new(retriever.clone(), completion, renderer)),
    };

    // Build router
    let app = build_router(state, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    retriever.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
