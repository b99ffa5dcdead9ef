//! Axum route handlers for the Job API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::editing::session::EditView;
use crate::errors::AppError;
use crate::jobs::lifecycle::JobStage;
use crate::jobs::service::{
    self, CreateJobRequest, PatchJobRequest, RegenerateRequest, SaveEditRequest,
};
use crate::jobs::store;
use crate::models::job::JobRow;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

/// Full job with its derived lifecycle state and linked resume name.
#[derive(Debug, Serialize)]
pub struct JobResponse {
    #[serde(flatten)]
    pub job: JobRow,
    pub state: JobStage,
    /// `None` when no resume is linked or it has been deleted.
    pub resume_name: Option<String>,
}

/// List entry; documents omitted.
#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub company: String,
    pub title: String,
    pub source_url: Option<String>,
    pub match_score: Option<u8>,
    pub applied: bool,
    pub state: JobStage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&JobRow> for JobSummary {
    fn from(job: &JobRow) -> Self {
        Self {
            id: job.id,
            company: job.company.clone(),
            title: job.title.clone(),
            source_url: job.source_url.clone(),
            match_score: job.state().score(),
            applied: job.applied,
            state: job.state().stage(),
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

async fn respond(state: &AppState, job: JobRow) -> Result<Json<JobResponse>, AppError> {
    let resume_name = service::linked_resume_name(state, &job).await?;
    Ok(Json(JobResponse {
        state: job.state().stage(),
        job,
        resume_name,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/jobs
///
/// Newest first.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobSummary>>, AppError> {
    let jobs = store::list_jobs(&state.db).await?;
    Ok(Json(jobs.iter().map(JobSummary::from).collect()))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    let job = service::create_job(&state, request).await?;
    Ok((StatusCode::CREATED, respond(&state, job).await?))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, AppError> {
    let job = store::get_job(&state.db, id).await?;
    respond(&state, job).await
}

/// PATCH /api/jobs/:id
pub async fn handle_patch_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PatchJobRequest>,
) -> Result<Json<JobResponse>, AppError> {
    let job = service::patch_job(&state, id, request).await?;
    respond(&state, job).await
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::delete_job(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/jobs/:id/regenerate
///
/// Body is optional: `{"instruction": "..."}`.
pub async fn handle_regenerate_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<RegenerateRequest>>,
) -> Result<Json<JobResponse>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let job = service::regenerate_job(&state, id, request).await?;
    respond(&state, job).await
}

/// POST /api/jobs/:id/edit
pub async fn handle_begin_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EditView>, AppError> {
    Ok(Json(service::begin_edit(&state, id).await?))
}

/// PUT /api/jobs/:id/documents
pub async fn handle_save_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveEditRequest>,
) -> Result<Json<JobResponse>, AppError> {
    let job = service::save_edit(&state, id, request).await?;
    respond(&state, job).await
}
