//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::orchestrator::clean_resume_text;
use crate::ingest::fetch::validate_url;
use crate::ingest::pdf::{extract_pdf_text, looks_like_pdf};
use crate::ingest::require_min_chars;
use crate::models::resume::{ResumeRow, ResumeSource};
use crate::resumes::store;
use crate::state::AppState;

const PREVIEW_CHARS: usize = 200;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ImportUrlRequest {
    pub url: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ManualResumeRequest {
    pub content: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub name: String,
    pub source: ResumeSource,
    pub is_selected: bool,
    pub preview: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ResumeRow> for ResumeSummary {
    fn from(row: &ResumeRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            source: row.source,
            is_selected: row.is_selected,
            preview: row.content.chars().take(PREVIEW_CHARS).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeSummary>>, AppError> {
    let resumes = store::list_resumes(&state.db).await?;
    Ok(Json(resumes.iter().map(ResumeSummary::from).collect()))
}

/// POST /api/resumes/upload
///
/// Multipart form with a PDF in `file` and an optional `name` field.
/// The name defaults to the file stem.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeSummary>, AppError> {
    let mut file: Option<(String, bytes::Bytes)> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;
                file = Some((file_name, data));
            }
            Some("name") => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Invalid name: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("Missing `file` field".to_string()))?;
    if !looks_like_pdf(&file_name, &data) {
        return Err(AppError::Validation("Only PDF files are supported".to_string()));
    }

    let text = extract_pdf_text(data).await?;
    let name = name.unwrap_or_else(|| file_stem(&file_name));

    let resume = store::add_resume(
        &state.db,
        &state.config.limits,
        ResumeSource::UploadedFile,
        &name,
        &text,
    )
    .await?;
    Ok(Json(ResumeSummary::from(&resume)))
}

/// POST /api/resumes/import-url
pub async fn handle_import_resume_url(
    State(state): State<AppState>,
    Json(request): Json<ImportUrlRequest>,
) -> Result<Json<ResumeSummary>, AppError> {
    validate_url(&request.url)?;
    let text = state.fetcher.fetch_text(&request.url).await?;
    let name = request.name.unwrap_or_else(|| request.url.clone());

    let resume = store::add_resume(
        &state.db,
        &state.config.limits,
        ResumeSource::ScrapedUrl,
        &name,
        &text,
    )
    .await?;
    Ok(Json(ResumeSummary::from(&resume)))
}

/// POST /api/resumes/manual
///
/// Pasted text is length-checked, cleaned into Markdown by the analyzer,
/// then length-checked again before storage.
pub async fn handle_add_manual_resume(
    State(state): State<AppState>,
    Json(request): Json<ManualResumeRequest>,
) -> Result<Json<ResumeSummary>, AppError> {
    let raw = require_min_chars(
        &request.content,
        state.config.limits.pasted_resume,
        "Resume content",
    )?;
    let cleaned =
        clean_resume_text(state.analyzer.as_ref(), raw, state.config.generation_timeout).await?;

    let resume = store::add_resume(
        &state.db,
        &state.config.limits,
        ResumeSource::PastedText,
        request.name.as_deref().unwrap_or_default(),
        &cleaned,
    )
    .await?;
    Ok(Json(ResumeSummary::from(&resume)))
}

/// GET /api/resumes/selected
///
/// `null` when no resume exists yet; that is a normal state, not an error.
pub async fn handle_get_selected_resume(
    State(state): State<AppState>,
) -> Result<Json<Option<ResumeRow>>, AppError> {
    Ok(Json(store::get_selected(&state.db).await?))
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    Ok(Json(store::get_resume(&state.db, id).await?))
}

/// PATCH /api/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateResumeRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    Ok(Json(
        store::update_resume_content(&state.db, id, &request.content).await?,
    ))
}

/// POST /api/resumes/:id/select
pub async fn handle_select_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeSummary>, AppError> {
    let resume = store::select_resume(&state.db, id).await?;
    Ok(Json(ResumeSummary::from(&resume)))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    store::delete_resume(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn file_stem(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("resume")
        .to_string()
}
