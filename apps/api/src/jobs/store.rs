//! Job persistence. Every write that touches the score or documents is a single
//! statement, guarded by the row's `revision`, so a job is never half-updated and
//! a stale writer finds zero rows instead of overwriting newer content.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::orchestrator::{GeneratedDocuments, JobMetadata};
use crate::models::job::JobRow;

/// A job about to be inserted.
pub struct NewJob<'a> {
    pub metadata: &'a JobMetadata,
    pub source_url: Option<&'a str>,
    pub resume_id: Option<Uuid>,
    pub documents: Option<&'a GeneratedDocuments>,
}

pub async fn insert_job(pool: &SqlitePool, job: NewJob<'_>) -> Result<JobRow, AppError> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (id, created_at, updated_at, company, title, source_url, original_description,
             resume_id, match_score, resume_html, cover_letter_html, document_format)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(now)
    .bind(now)
    .bind(&job.metadata.company)
    .bind(&job.metadata.title)
    .bind(job.source_url)
    .bind(&job.metadata.description)
    .bind(job.resume_id)
    .bind(job.documents.map(|d| i64::from(d.score)))
    .bind(job.documents.map(|d| d.resume_html.as_str()))
    .bind(job.documents.map(|d| d.cover_letter_html.as_str()))
    .bind(job.documents.map(|d| d.format))
    .fetch_one(pool)
    .await?;

    info!(
        "Created job {} ({} at {}, score={:?})",
        row.id, row.title, row.company, row.match_score
    );
    Ok(row)
}

pub async fn find_job(pool: &SqlitePool, id: Uuid) -> Result<Option<JobRow>, AppError> {
    Ok(sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn get_job(pool: &SqlitePool, id: Uuid) -> Result<JobRow, AppError> {
    find_job(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// All jobs, newest first.
pub async fn list_jobs(pool: &SqlitePool) -> Result<Vec<JobRow>, AppError> {
    Ok(
        sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY rowid DESC")
            .fetch_all(pool)
            .await?,
    )
}

/// Writes a full-analysis result: score, both documents and format together.
/// Clears the edited flag (regeneration supersedes manual edits).
pub async fn record_generation(
    pool: &SqlitePool,
    id: Uuid,
    expected_revision: i64,
    resume_id: Uuid,
    documents: &GeneratedDocuments,
) -> Result<JobRow, AppError> {
    let row = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET match_score = ?, resume_html = ?, cover_letter_html = ?, document_format = ?,
            resume_id = ?, is_edited = 0, revision = revision + 1, updated_at = ?
        WHERE id = ? AND revision = ?
        RETURNING *
        "#,
    )
    .bind(i64::from(documents.score))
    .bind(&documents.resume_html)
    .bind(&documents.cover_letter_html)
    .bind(documents.format)
    .bind(resume_id)
    .bind(Utc::now())
    .bind(id)
    .bind(expected_revision)
    .fetch_optional(pool)
    .await
    .map_err(AppError::update)?;

    match row {
        Some(row) => {
            info!(
                "Recorded generation for job {id} (score {}, revision {})",
                documents.score, row.revision
            );
            Ok(row)
        }
        None => Err(stale_write(pool, id).await),
    }
}

/// Writes manually edited documents. Score and `resume_id` are untouched;
/// `applied` changes only when given, in the same statement as the documents.
/// Only jobs that already hold generated documents can be edited.
pub async fn record_manual_edit(
    pool: &SqlitePool,
    id: Uuid,
    expected_revision: i64,
    resume_html: &str,
    cover_letter_html: &str,
    applied: Option<bool>,
) -> Result<JobRow, AppError> {
    let row = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET resume_html = ?, cover_letter_html = ?, is_edited = 1,
            applied = COALESCE(?, applied), revision = revision + 1, updated_at = ?
        WHERE id = ? AND revision = ? AND match_score IS NOT NULL
        RETURNING *
        "#,
    )
    .bind(resume_html)
    .bind(cover_letter_html)
    .bind(applied)
    .bind(Utc::now())
    .bind(id)
    .bind(expected_revision)
    .fetch_optional(pool)
    .await
    .map_err(AppError::update)?;

    match row {
        Some(row) => {
            info!("Saved manual edit for job {id} (revision {})", row.revision);
            Ok(row)
        }
        None => Err(stale_write(pool, id).await),
    }
}

/// Toggles the `applied` flag. Documents and score are untouched.
pub async fn set_applied(pool: &SqlitePool, id: Uuid, applied: bool) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>(
        "UPDATE jobs SET applied = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(applied)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// Deletes a job permanently.
pub async fn delete_job(pool: &SqlitePool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    info!("Deleted job {id}");
    Ok(())
}

/// Explains why a guarded update matched no row.
async fn stale_write(pool: &SqlitePool, id: Uuid) -> AppError {
    match find_job(pool, id).await {
        Ok(None) => AppError::NotFound(format!("Job {id} not found")),
        Ok(Some(job)) if job.match_score.is_none() => AppError::Validation(format!(
            "Job {id} has no generated documents to edit"
        )),
        Ok(Some(_)) => AppError::Conflict(format!(
            "Job {id} changed since this operation started; reload and try again"
        )),
        Err(e) => e,
    }
}
