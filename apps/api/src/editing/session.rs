//! Reconciliation of manual edits with AI-generated documents.
//!
//! `Viewing → Editing → Viewing`. Entering edit mode copies the body fragments
//! of both documents into an [`EditSession`]; every change lands in the session
//! only. `save` splices both drafts back into the documents they came from and
//! writes them in one update. `cancel` drops the session and the job is untouched.
//!
//! Drafts are saved as-is: edits are trusted, so there is no length or
//! structure check here.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::documents::body::{extract_body, rewrap_body};
use crate::errors::AppError;
use crate::generation::locks::JobLocks;
use crate::jobs::store::record_manual_edit;
use crate::models::job::JobRow;

/// An in-progress manual edit of one job's documents. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    job_id: Uuid,
    base_revision: i64,
    resume_html: String,
    cover_letter_html: String,
    draft_resume_body: String,
    draft_cover_letter_body: String,
}

/// What an editor needs to start editing: the two body fragments and the
/// revision they were taken from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditView {
    pub job_id: Uuid,
    pub base_revision: i64,
    pub resume_body: String,
    pub cover_letter_body: String,
}

impl EditSession {
    /// Enters edit mode. Only jobs with generated documents can be edited.
    pub fn begin(job: &JobRow) -> Result<Self, AppError> {
        let documents = job.state().documents().ok_or_else(|| {
            AppError::Validation(format!(
                "Job {} has no generated documents to edit yet",
                job.id
            ))
        })?;

        Ok(Self {
            job_id: job.id,
            base_revision: job.revision,
            resume_html: documents.resume_html.to_string(),
            cover_letter_html: documents.cover_letter_html.to_string(),
            draft_resume_body: extract_body(documents.resume_html).to_string(),
            draft_cover_letter_body: extract_body(documents.cover_letter_html).to_string(),
        })
    }

    pub fn base_revision(&self) -> i64 {
        self.base_revision
    }

    pub fn set_resume_body(&mut self, body: impl Into<String>) {
        self.draft_resume_body = body.into();
    }

    pub fn set_cover_letter_body(&mut self, body: impl Into<String>) {
        self.draft_cover_letter_body = body.into();
    }

    pub fn view(&self) -> EditView {
        EditView {
            job_id: self.job_id,
            base_revision: self.base_revision,
            resume_body: self.draft_resume_body.clone(),
            cover_letter_body: self.draft_cover_letter_body.clone(),
        }
    }

    /// Both drafts spliced back into their original documents.
    pub fn rewrapped(&self) -> (String, String) {
        (
            rewrap_body(&self.resume_html, &self.draft_resume_body),
            rewrap_body(&self.cover_letter_html, &self.draft_cover_letter_body),
        )
    }

    /// Writes both documents in one update and ends the session.
    ///
    /// Fails with `Conflict` if a regeneration or another save holds the job or
    /// has written it since the session began; the job then keeps its newer
    /// content.
    pub async fn save(self, pool: &SqlitePool, locks: &JobLocks) -> Result<JobRow, AppError> {
        let _guard = locks.try_acquire(self.job_id).await?;
        let (resume_html, cover_letter_html) = self.rewrapped();

        let job = record_manual_edit(
            pool,
            self.job_id,
            self.base_revision,
            &resume_html,
            &cover_letter_html,
            None,
        )
        .await?;

        info!(
            "Edit session for job {} saved (revision {} -> {})",
            self.job_id, self.base_revision, job.revision
        );
        Ok(job)
    }

    /// Leaves edit mode without writing anything.
    pub fn cancel(self) {
        info!("Edit session for job {} cancelled", self.job_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::jobs::store::{get_job, set_applied};
    use crate::test_support::{insert_scored_job, sample_job_row, COVER_DOC};

    #[test]
    fn test_begin_on_extracted_job_fails() {
        let err = EditSession::begin(&sample_job_row(None)).unwrap_err();
        assert_eq!(err.kind(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_begin_extracts_body_fragments() {
        let mut job = sample_job_row(Some(82));
        job.resume_html = Some("<html><body><p>A</p></body></html>".to_string());

        let session = EditSession::begin(&job).unwrap();

        let view = session.view();
        assert_eq!(view.resume_body, "<p>A</p>");
        assert_eq!(view.job_id, job.id);
        assert_eq!(session.base_revision(), job.revision);
    }

    #[test]
    fn test_rewrapped_without_changes_is_identity() {
        let job = sample_job_row(Some(82));
        let session = EditSession::begin(&job).unwrap();
        let (resume, cover) = session.rewrapped();
        assert_eq!(Some(resume), job.resume_html);
        assert_eq!(Some(cover), job.cover_letter_html);
    }

    #[tokio::test]
    async fn test_save_splices_draft_into_document() {
        let pool = test_pool().await;
        let locks = JobLocks::new();
        let job = insert_scored_job(&pool, "<html><body><p>A</p></body></html>", 82).await;

        let mut session = EditSession::begin(&job).unwrap();
        session.set_resume_body("<p>B</p>");
        let saved = session.save(&pool, &locks).await.unwrap();

        assert_eq!(
            saved.resume_html.as_deref(),
            Some("<html><body><p>B</p></body></html>")
        );
        assert_eq!(saved.cover_letter_html.as_deref(), Some(COVER_DOC));
        assert_eq!(saved.state().stage(), crate::jobs::lifecycle::JobStage::Edited);
    }

    #[tokio::test]
    async fn test_save_never_touches_score_applied_or_resume() {
        let pool = test_pool().await;
        let locks = JobLocks::new();
        let job = insert_scored_job(&pool, "<html><body><p>A</p></body></html>", 64).await;
        let job = set_applied(&pool, job.id, true).await.unwrap();

        let mut session = EditSession::begin(&job).unwrap();
        session.set_resume_body("<p>B</p>");
        session.set_cover_letter_body("<p>Dear team,</p>");
        let saved = session.save(&pool, &locks).await.unwrap();

        assert_eq!(saved.match_score, job.match_score);
        assert_eq!(saved.applied, job.applied);
        assert_eq!(saved.resume_id, job.resume_id);
    }

    #[tokio::test]
    async fn test_cancel_leaves_job_identical() {
        let pool = test_pool().await;
        let job = insert_scored_job(&pool, "<html><body><p>A</p></body></html>", 82).await;

        let mut session = EditSession::begin(&job).unwrap();
        session.set_resume_body("<p>thrown away</p>");
        session.cancel();

        assert_eq!(get_job(&pool, job.id).await.unwrap(), job);
    }

    #[tokio::test]
    async fn test_save_with_empty_body_is_accepted() {
        let pool = test_pool().await;
        let locks = JobLocks::new();
        let job = insert_scored_job(&pool, "<html><body><p>A</p></body></html>", 82).await;

        let mut session = EditSession::begin(&job).unwrap();
        session.set_resume_body("");
        let saved = session.save(&pool, &locks).await.unwrap();

        assert_eq!(saved.resume_html.as_deref(), Some("<html><body></body></html>"));
    }

    #[tokio::test]
    async fn test_second_session_from_same_base_conflicts() {
        let pool = test_pool().await;
        let locks = JobLocks::new();
        let job = insert_scored_job(&pool, "<html><body><p>A</p></body></html>", 82).await;

        let mut first = EditSession::begin(&job).unwrap();
        let mut second = EditSession::begin(&job).unwrap();
        first.set_resume_body("<p>first</p>");
        second.set_resume_body("<p>second</p>");

        let saved = first.save(&pool, &locks).await.unwrap();
        let err = second.save(&pool, &locks).await.unwrap_err();

        assert_eq!(err.kind(), "CONFLICT");
        assert_eq!(get_job(&pool, job.id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_save_while_job_locked_conflicts() {
        let pool = test_pool().await;
        let locks = JobLocks::new();
        let job = insert_scored_job(&pool, "<html><body><p>A</p></body></html>", 82).await;
        let _regenerating = locks.try_acquire(job.id).await.unwrap();

        let mut session = EditSession::begin(&job).unwrap();
        session.set_resume_body("<p>B</p>");
        let err = session.save(&pool, &locks).await.unwrap_err();

        assert_eq!(err.kind(), "CONFLICT");
        assert_eq!(get_job(&pool, job.id).await.unwrap(), job);
    }
}
