//! Job workflows: creation (extract-only or full analysis), regeneration,
//! patching, and the server side of the manual edit protocol.
//!
//! Regeneration and every document write run inside the job's critical section
//! (`JobLocks`), and each write is revision-guarded in the store.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::editing::session::{EditSession, EditView};
use crate::errors::AppError;
use crate::generation::analyzer::AnalysisMode;
use crate::generation::orchestrator::{generate, ExistingJob, Generated, GenerationInput};
use crate::ingest::fetch::validate_url;
use crate::ingest::require_min_chars;
use crate::jobs::store::{self, NewJob};
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;
use crate::resumes::store as resume_store;
use crate::state::AppState;

fn default_true() -> bool {
    true
}

/// Request body for job creation. Exactly one of `url` / `description`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRequest {
    pub url: Option<String>,
    pub description: Option<String>,
    /// Resume to analyze against; defaults to the selected resume.
    pub resume_id: Option<Uuid>,
    /// `false` is fast mode: extract metadata only.
    #[serde(default = "default_true")]
    pub generate_documents: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegenerateRequest {
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchJobRequest {
    pub applied: Option<bool>,
    pub resume_html: Option<String>,
    pub cover_letter_html: Option<String>,
}

/// Saves an edit session started with [`begin_edit`]. Omitted bodies stay as they were.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveEditRequest {
    pub base_revision: i64,
    pub resume_body: Option<String>,
    pub cover_letter_body: Option<String>,
}

/// Captures a job description and runs the first generation.
///
/// Falls back to extract-only when documents are not requested or when no
/// resume exists yet. Nothing is stored unless generation succeeds.
pub async fn create_job(state: &AppState, request: CreateJobRequest) -> Result<JobRow, AppError> {
    let (description, source_url) = match (request.url.as_deref(), request.description.as_deref()) {
        (Some(url), None) => {
            validate_url(url)?;
            let text = state.fetcher.fetch_text(url).await?;
            let text =
                require_min_chars(&text, state.config.limits.scraped_text, "Job page content")?;
            (text.to_string(), Some(url))
        }
        (None, Some(description)) => {
            // Pasted descriptions only need to be non-empty.
            let text = description.trim();
            if text.is_empty() {
                return Err(AppError::InvalidDescription(
                    "Job description is empty".to_string(),
                ));
            }
            (text.to_string(), None)
        }
        _ => {
            return Err(AppError::Validation(
                "Provide exactly one of `url` or `description`".to_string(),
            ))
        }
    };

    let resume = if request.generate_documents {
        match request.resume_id {
            Some(id) => Some(resume_store::get_resume(&state.db, id).await?),
            None => resume_store::get_selected(&state.db).await?,
        }
    } else {
        None
    };
    let mode = match resume {
        Some(_) => AnalysisMode::FullAnalysis,
        None => {
            if request.generate_documents {
                info!("No resume available yet; creating job in extract-only mode");
            }
            AnalysisMode::ExtractOnly
        }
    };

    let generated = generate(
        state.analyzer.as_ref(),
        GenerationInput {
            mode,
            description: &description,
            resume: resume.as_ref(),
            instruction: None,
            existing: None,
        },
        state.config.generation_timeout,
    )
    .await?;

    store::insert_job(
        &state.db,
        NewJob {
            metadata: generated.metadata(),
            source_url,
            resume_id: generated
                .documents()
                .and(resume.as_ref())
                .map(|r| r.id),
            documents: generated.documents(),
        },
    )
    .await
}

/// Re-runs full analysis for a job and replaces its score and documents.
///
/// Uses the job's linked resume, or the selected resume when the link is unset
/// or dangling. Manual edits are superseded.
pub async fn regenerate_job(
    state: &AppState,
    id: Uuid,
    request: RegenerateRequest,
) -> Result<JobRow, AppError> {
    let _guard = state.job_locks.try_acquire(id).await?;
    let job = store::get_job(&state.db, id).await?;
    let resume = resolve_resume(state, &job).await?;

    let generated = generate(
        state.analyzer.as_ref(),
        GenerationInput {
            mode: AnalysisMode::FullAnalysis,
            description: &job.original_description,
            resume: Some(&resume),
            instruction: request.instruction.as_deref(),
            existing: Some(ExistingJob {
                company: &job.company,
                title: &job.title,
                cover_letter_html: job.cover_letter_html.as_deref(),
            }),
        },
        state.config.generation_timeout,
    )
    .await?;

    let Generated::Analyzed { documents, .. } = generated else {
        return Err(AppError::Generation(
            "Full analysis returned no documents".to_string(),
        ));
    };

    store::record_generation(&state.db, id, job.revision, resume.id, &documents).await
}

/// Applies a partial update. Documents, when given, are full HTML written as a
/// manual edit, together with `applied` in one guarded write. An `applied`-only
/// patch just toggles the flag.
pub async fn patch_job(
    state: &AppState,
    id: Uuid,
    request: PatchJobRequest,
) -> Result<JobRow, AppError> {
    if request.resume_html.is_none() && request.cover_letter_html.is_none() {
        return match request.applied {
            Some(applied) => store::set_applied(&state.db, id, applied).await,
            None => store::get_job(&state.db, id).await,
        };
    }

    let _guard = state.job_locks.try_acquire(id).await?;
    let job = store::get_job(&state.db, id).await?;
    let documents = job.state().documents().ok_or_else(|| {
        AppError::Validation(format!("Job {id} has no generated documents to edit yet"))
    })?;

    let resume_html = request
        .resume_html
        .as_deref()
        .unwrap_or(documents.resume_html);
    let cover_letter_html = request
        .cover_letter_html
        .as_deref()
        .unwrap_or(documents.cover_letter_html);

    store::record_manual_edit(
        &state.db,
        id,
        job.revision,
        resume_html,
        cover_letter_html,
        request.applied,
    )
    .await
}

/// Enters edit mode for a job and returns its body fragments.
pub async fn begin_edit(state: &AppState, id: Uuid) -> Result<EditView, AppError> {
    let job = store::get_job(&state.db, id).await?;
    Ok(EditSession::begin(&job)?.view())
}

/// Saves edited body fragments, provided the job has not changed since `begin_edit`.
pub async fn save_edit(
    state: &AppState,
    id: Uuid,
    request: SaveEditRequest,
) -> Result<JobRow, AppError> {
    let job = store::get_job(&state.db, id).await?;
    let mut session = EditSession::begin(&job)?;
    let current_revision = session.base_revision();
    if current_revision != request.base_revision {
        session.cancel();
        return Err(AppError::Conflict(format!(
            "Job {id} changed since editing started (revision {} is now {current_revision}); reload and try again",
            request.base_revision
        )));
    }

    if let Some(body) = request.resume_body {
        session.set_resume_body(body);
    }
    if let Some(body) = request.cover_letter_body {
        session.set_cover_letter_body(body);
    }
    session.save(&state.db, &state.job_locks).await
}

pub async fn delete_job(state: &AppState, id: Uuid) -> Result<(), AppError> {
    store::delete_job(&state.db, id).await?;
    state.job_locks.forget(id).await;
    Ok(())
}

/// Name of the job's linked resume; `None` when unlinked or deleted since.
pub async fn linked_resume_name(state: &AppState, job: &JobRow) -> Result<Option<String>, AppError> {
    match job.resume_id {
        Some(resume_id) => Ok(resume_store::find_resume(&state.db, resume_id)
            .await?
            .map(|r| r.name)),
        None => Ok(None),
    }
}

async fn resolve_resume(state: &AppState, job: &JobRow) -> Result<ResumeRow, AppError> {
    if let Some(resume_id) = job.resume_id {
        if let Some(resume) = resume_store::find_resume(&state.db, resume_id).await? {
            return Ok(resume);
        }
        info!("Resume {resume_id} linked to job {} no longer exists", job.id);
    }
    resume_store::get_selected(&state.db).await?.ok_or_else(|| {
        AppError::Validation("No resume available. Add a resume before regenerating.".to_string())
    })
}
