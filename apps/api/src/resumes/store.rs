//! Resume Store: persisted resumes with exactly one "selected" default.
//!
//! The selection invariant (at most one `is_selected = 1`) is enforced twice:
//! by the partial unique index in the schema, and by doing every selection
//! change as deselect-then-select inside a single transaction. Every write
//! path starts with a write statement, so concurrent writers queue on SQLite's
//! busy timeout rather than failing with "database is locked".

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::config::ContentLimits;
use crate::errors::AppError;
use crate::ingest::require_min_chars;
use crate::llm_client::strip_code_fences;
use crate::models::resume::{ResumeRow, ResumeSource};

const DEFAULT_RESUME_NAME: &str = "Untitled resume";

/// Minimum cleaned length accepted at ingest for a given source.
pub fn min_chars_for(limits: &ContentLimits, source: ResumeSource) -> usize {
    match source {
        ResumeSource::UploadedFile => limits.uploaded_resume,
        ResumeSource::ScrapedUrl => limits.scraped_text,
        ResumeSource::PastedText => limits.pasted_resume,
    }
}

/// Stores a new resume after cleaning and length validation.
/// The first resume in an otherwise unselected store becomes the selected one.
pub async fn add_resume(
    pool: &SqlitePool,
    limits: &ContentLimits,
    source: ResumeSource,
    name: &str,
    content: &str,
) -> Result<ResumeRow, AppError> {
    let cleaned = require_min_chars(
        strip_code_fences(content),
        min_chars_for(limits, source),
        "Resume content",
    )?;
    let name = match name.trim() {
        "" => DEFAULT_RESUME_NAME,
        trimmed => trimmed,
    };
    let now = Utc::now();

    // One statement: the selection check and the insert share the write lock.
    let resume = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (id, name, content, source, is_selected, created_at, updated_at)
        VALUES (?, ?, ?, ?, NOT EXISTS (SELECT 1 FROM resumes WHERE is_selected = 1), ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(cleaned)
    .bind(source)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    info!(
        "Added resume {} ({:?}, {} chars, selected={})",
        resume.id,
        source,
        resume.content.chars().count(),
        resume.is_selected
    );
    Ok(resume)
}

/// Makes `id` the only selected resume.
///
/// The transaction opens with a write so it takes the write lock up front
/// instead of upgrading a read lock, which SQLite refuses under contention.
pub async fn select_resume(pool: &SqlitePool, id: Uuid) -> Result<ResumeRow, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE resumes SET is_selected = 0 WHERE is_selected = 1 AND id != ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let resume = sqlx::query_as::<_, ResumeRow>(
        "UPDATE resumes SET is_selected = 1, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    // Dropping the transaction rolls back the deselect.
    let Some(resume) = resume else {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    };

    tx.commit().await?;

    info!("Selected resume {id}");
    Ok(resume)
}

/// Returns the selected resume, falling back to the oldest one when none is
/// flagged. `None` only when the store is empty.
pub async fn get_selected(pool: &SqlitePool) -> Result<Option<ResumeRow>, AppError> {
    Ok(sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes ORDER BY is_selected DESC, rowid ASC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?)
}

pub async fn find_resume(pool: &SqlitePool, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn get_resume(pool: &SqlitePool, id: Uuid) -> Result<ResumeRow, AppError> {
    find_resume(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// All resumes, oldest first.
pub async fn list_resumes(pool: &SqlitePool) -> Result<Vec<ResumeRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes ORDER BY rowid ASC")
            .fetch_all(pool)
            .await?,
    )
}

/// Replaces a resume's text. Edits are trusted: no minimum-length check.
pub async fn update_resume_content(
    pool: &SqlitePool,
    id: Uuid,
    content: &str,
) -> Result<ResumeRow, AppError> {
    sqlx::query_as::<_, ResumeRow>(
        "UPDATE resumes SET content = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(content)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// Deletes a resume. Jobs keep their (now dangling) `resume_id`.
/// Deleting the selected resume hands the selection to the oldest remaining one.
pub async fn delete_resume(pool: &SqlitePool, id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let was_selected: Option<bool> =
        sqlx::query_scalar("DELETE FROM resumes WHERE id = ? RETURNING is_selected")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(was_selected) = was_selected else {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    };

    if was_selected {
        sqlx::query(
            "UPDATE resumes SET is_selected = 1 WHERE rowid = (SELECT MIN(rowid) FROM resumes)",
        )
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!("Deleted resume {id} (was_selected={was_selected})");
    Ok(())
}
