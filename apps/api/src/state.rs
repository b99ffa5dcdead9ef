use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::generation::analyzer::Analyzer;
use crate::generation::locks::JobLocks;
use crate::ingest::fetch::TextFetcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// AI capability. Default: `LlmAnalyzer` over the Claude client.
    pub analyzer: Arc<dyn Analyzer>,
    /// Page-to-text fetcher for job postings and resume imports.
    pub fetcher: Arc<dyn TextFetcher>,
    pub config: Config,
    /// Serializes regeneration and document saves per job.
    pub job_locks: JobLocks,
}
