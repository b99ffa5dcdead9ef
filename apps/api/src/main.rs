mod config;
mod db;
mod documents;
mod editing;
mod errors;
mod generation;
mod ingest;
mod jobs;
mod llm_client;
mod models;
mod resumes;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::generation::analyzer::LlmAnalyzer;
use crate::generation::locks::JobLocks;
use crate::ingest::fetch::ReaderFetcher;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobFit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite (schema is created if missing)
    let db = create_pool(&config.database_url).await?;
    info!("Database ready at {}", config.database_url);

    // Initialize LLM client behind the analyzer seam
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.log_ai_payloads)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let analyzer = Arc::new(LlmAnalyzer::new(llm));

    let fetcher = Arc::new(ReaderFetcher::new(config.scrape_timeout)?);

    // Build app state
    let state = AppState {
        db,
        analyzer,
        fetcher,
        config: config.clone(),
        job_locks: JobLocks::new(),
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
