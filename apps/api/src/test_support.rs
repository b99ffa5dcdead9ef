//! Shared fixtures for unit tests: canned documents, rows, and fake
//! implementations of the analyzer and fetcher seams.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::config::Config;
use crate::db::test_pool;
use crate::documents::format::DocumentFormat;
use crate::errors::AppError;
use crate::generation::analyzer::{AnalysisMode, AnalysisOutput, AnalysisRequest, Analyzer};
use crate::generation::locks::JobLocks;
use crate::generation::orchestrator::{GeneratedDocuments, JobMetadata};
use crate::ingest::fetch::TextFetcher;
use crate::jobs::store::{insert_job, NewJob};
use crate::llm_client::LlmError;
use crate::models::job::JobRow;
use crate::models::resume::{ResumeRow, ResumeSource};
use crate::state::AppState;

pub const RESUME_DOC: &str = "<!DOCTYPE html><html><head><style>body { font-family: serif; }</style></head><body><h1>Jane Doe</h1><p>Backend engineer, 6 years of Rust and Go.</p></body></html>";

pub const COVER_DOC: &str = "<!DOCTYPE html><html><head><title>Cover letter</title></head><body><p>Dear Acme team,</p><p>I would love to build your backend.</p></body></html>";

const CLEANED_DESCRIPTION: &str =
    "Acme is hiring a backend engineer to build Rust services and own on-call.";

/// Deterministic text of exactly `len` characters.
pub fn resume_text(len: usize) -> String {
    "Experienced backend engineer. ".repeat(len / 30 + 1)[..len].to_string()
}

pub fn sample_resume() -> ResumeRow {
    let now = Utc::now();
    ResumeRow {
        id: Uuid::new_v4(),
        name: "Jane Doe".to_string(),
        content: resume_text(400),
        source: ResumeSource::PastedText,
        is_selected: true,
        created_at: now,
        updated_at: now,
    }
}

/// An in-memory job row; documents are present exactly when `score` is.
pub fn sample_job_row(score: Option<i64>) -> JobRow {
    let now = Utc::now();
    JobRow {
        id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        company: "Acme".to_string(),
        title: "Backend Engineer".to_string(),
        source_url: None,
        original_description: CLEANED_DESCRIPTION.to_string(),
        resume_id: Some(Uuid::new_v4()),
        match_score: score,
        resume_html: score.map(|_| RESUME_DOC.to_string()),
        cover_letter_html: score.map(|_| COVER_DOC.to_string()),
        document_format: score.map(|_| DocumentFormat::Html),
        is_edited: false,
        applied: false,
        revision: 0,
    }
}

/// Inserts a scored job with the given resume document and `COVER_DOC`.
pub async fn insert_scored_job(pool: &SqlitePool, resume_html: &str, score: u8) -> JobRow {
    let metadata = JobMetadata {
        company: "Acme".to_string(),
        title: "Backend Engineer".to_string(),
        description: CLEANED_DESCRIPTION.to_string(),
    };
    let documents = GeneratedDocuments {
        score,
        resume_html: resume_html.to_string(),
        cover_letter_html: COVER_DOC.to_string(),
        format: DocumentFormat::Html,
    };
    insert_job(
        pool,
        NewJob {
            metadata: &metadata,
            source_url: None,
            resume_id: None,
            documents: Some(&documents),
        },
    )
    .await
    .unwrap()
}

pub async fn test_state(analyzer: Arc<dyn Analyzer>, fetcher: FakeFetcher) -> AppState {
    AppState {
        db: test_pool().await,
        analyzer,
        fetcher: Arc::new(fetcher),
        config: Config::for_tests(),
        job_locks: JobLocks::new(),
    }
}

/// Lets a test observe an in-flight analyzer call and decide when it finishes.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Debug, Clone)]
struct RecordedCall {
    mode: AnalysisMode,
    had_resume: bool,
    instruction: Option<String>,
    description: String,
}

/// Canned analyzer. Records every request it sees.
#[derive(Default)]
pub struct FakeAnalyzer {
    output: Option<AnalysisOutput>,
    delay: Option<Duration>,
    gate: Option<Arc<Gate>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeAnalyzer {
    pub fn returning(output: AnalysisOutput) -> Self {
        Self {
            output: Some(output),
            ..Default::default()
        }
    }

    /// Replies with metadata only.
    pub fn extraction(company: &str, title: &str) -> Self {
        Self::returning(AnalysisOutput {
            company_name: company.to_string(),
            title: title.to_string(),
            cleaned_description: CLEANED_DESCRIPTION.to_string(),
            ..Default::default()
        })
    }

    /// Replies with metadata, `score`, and both canned documents.
    pub fn full(score: i64) -> Self {
        Self::returning(Self::full_output(score))
    }

    pub fn full_output(score: i64) -> AnalysisOutput {
        AnalysisOutput {
            company_name: "Acme".to_string(),
            title: "Backend Engineer".to_string(),
            cleaned_description: CLEANED_DESCRIPTION.to_string(),
            score: Some(score),
            resume_html: Some(RESUME_DOC.to_string()),
            cover_letter_html: Some(COVER_DOC.to_string()),
        }
    }

    /// Every call fails as if the model returned nothing.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Calls block until `gate.release` is notified.
    pub fn gated(output: AnalysisOutput) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::default());
        let analyzer = Self {
            gate: Some(gate.clone()),
            ..Self::returning(output)
        };
        (analyzer, gate)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn last_mode(&self) -> Option<AnalysisMode> {
        self.last().map(|c| c.mode)
    }

    pub fn last_had_resume(&self) -> bool {
        self.last().is_some_and(|c| c.had_resume)
    }

    pub fn last_instruction(&self) -> Option<String> {
        self.last().and_then(|c| c.instruction)
    }

    pub fn last_description(&self) -> Option<String> {
        self.last().map(|c| c.description)
    }

    async fn wait(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Analyzer for FakeAnalyzer {
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<AnalysisOutput, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            mode: request.mode,
            had_resume: request.resume_text.is_some(),
            instruction: request.instruction.map(str::to_string),
            description: request.description.to_string(),
        });
        self.wait().await;
        self.output.clone().ok_or(LlmError::EmptyContent)
    }

    async fn clean_resume(&self, raw: &str) -> Result<String, LlmError> {
        self.wait().await;
        match self.output {
            Some(_) => Ok(format!("# Resume\n\n{}", raw.trim())),
            None => Err(LlmError::EmptyContent),
        }
    }
}

/// Serves fixed page text per URL; unknown URLs fail like an unreachable page.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
}

impl FakeFetcher {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_page(url: &str, text: &str) -> Self {
        let mut fetcher = Self::default();
        fetcher.pages.insert(url.to_string(), text.to_string());
        fetcher
    }
}

#[async_trait]
impl TextFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, AppError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("Failed to fetch {url}")))
    }
}
