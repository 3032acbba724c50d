mod config;
mod errors;
mod job_search;
mod llm_client;
mod models;
mod rag;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::job_search::JobSearchClient;
use crate::llm_client::LlmClient;
use crate::rag::agent::{JobRagAgent, MatchSettings};
use crate::rag::embedder::OpenAiEmbedder;
use crate::rag::index::{EmbeddingIndex, IndexConfig};
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

    info!("Starting Job Finder API v{}", env!("CARGO_PKG_VERSION"));

    // Model clients: credentials are checked here, not on first request
    let embedder = OpenAiEmbedder::new(
        &config.openai_api_key,
        &config.openai_base_url,
        &config.embedding_model,
    )
    .context("failed to initialize embedding client")?;
    info!("Embedding client initialized (model: {})", embedder.model());

    let llm = LlmClient::new(
        &config.openai_api_key,
        &config.openai_base_url,
        &config.chat_model,
    )
    .context("failed to initialize LLM client")?;
    info!("LLM client initialized (model: {})", config.chat_model);

    // Open the persistent job index
    let index = EmbeddingIndex::open(
        &IndexConfig {
            dir: config.index_dir.clone(),
            collection: config.index_collection.clone(),
            metric: config.index_metric,
        },
        Arc::new(embedder),
    )
    .with_context(|| format!("failed to open job index in {}", config.index_dir.display()))?;
    info!(
        "Job index ready at {} (metric: {})",
        index.path().display(),
        index.metric().await
    );

    let agent = JobRagAgent::new(
        Arc::new(index),
        Arc::new(llm),
        MatchSettings {
            retrieval_k: config.retrieval_k,
            shortlist_size: config.shortlist_size,
            max_context_chars: config.max_context_chars,
        },
    )?;

    let job_search = JobSearchClient::new(&config.rapidapi_key, &config.rapidapi_host)
        .context("failed to initialize job search client")?;

    // Build app state
    let state = AppState {
        agent: Arc::new(agent),
        job_search,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
