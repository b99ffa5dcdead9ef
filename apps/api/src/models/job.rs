use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::documents::format::DocumentFormat;

/// One job application as persisted. The nullable score/document columns are
/// interpreted through [`crate::jobs::lifecycle::JobState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub company: String,
    pub title: String,
    pub source_url: Option<String>,
    pub original_description: String,
    /// Weak reference: the resume may have been deleted since.
    pub resume_id: Option<Uuid>,
    pub match_score: Option<i64>,
    pub resume_html: Option<String>,
    pub cover_letter_html: Option<String>,
    pub document_format: Option<DocumentFormat>,
    pub is_edited: bool,
    pub applied: bool,
    /// Bumped on every document write.
    pub revision: i64,
}
