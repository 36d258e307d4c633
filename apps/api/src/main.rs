mod config;
mod document;
mod errors;
mod llm_client;
mod retrieval;
mod roast;
mod routes;
mod state;
mod storage;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::document::PdfTextExtractor;
use crate::llm_client::LlmClient;
use crate::retrieval::OpenAiEmbedder;
use crate::roast::pipeline::Capabilities;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{build_s3_client, S3ObjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting roaster v{}", env!("CARGO_PKG_VERSION"));

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (region: {})", config.aws_region);

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        &config.anthropic_base_url,
        config.chat_model.clone(),
        config.http_timeout,
    )?;
    info!("LLM client initialized (model: {})", config.chat_model);

    // Initialize embedding client
    let embedder = OpenAiEmbedder::new(
        &config.embedding_api_key,
        &config.embedding_base_url,
        config.embedding_model.clone(),
        config.http_timeout,
    )?;
    info!(
        "Embedding client initialized (model: {})",
        config.embedding_model
    );

    info!(
        "Pipeline: chunk_size={} overlap={} k={} max_sections={} scratch={}",
        config.pipeline.chunker.chunk_size(),
        config.pipeline.chunker.chunk_overlap(),
        config.pipeline.results_per_query,
        config.pipeline.max_context_sections,
        config.pipeline.scratch_dir.display()
    );

    // Build app state
    let state = AppState {
        capabilities: Capabilities {
            store: Arc::new(S3ObjectStore::new(s3)),
            extractor: Arc::new(PdfTextExtractor),
            embedder: Arc::new(embedder),
            completer: Arc::new(llm),
        },
        settings: Arc::new(config.pipeline.clone()),
    };

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
