//! Job lifecycle: the explicit state behind the nullable score/document columns.
//!
//! ```text
//! Extracted ──full analysis──▶ Scored ──manual save──▶ Edited
//!                                ▲                       │
//!                                └─────regeneration──────┘
//! ```
//! `applied` is an orthogonal flag and never changes the state.

use serde::Serialize;
use tracing::warn;

use crate::documents::format::DocumentFormat;
use crate::models::job::JobRow;

/// The generated documents of a scored or edited job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Documents<'a> {
    pub resume_html: &'a str,
    pub cover_letter_html: &'a str,
    pub format: DocumentFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState<'a> {
    /// Description captured; no score or documents yet.
    Extracted,
    /// Documents exactly as last generated.
    Scored { score: u8, documents: Documents<'a> },
    /// Documents manually edited since the last generation; score retained.
    Edited { score: u8, documents: Documents<'a> },
}

/// Serializable name of a [`JobState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Extracted,
    Scored,
    Edited,
}

impl<'a> JobState<'a> {
    pub fn from_row(row: &'a JobRow) -> Self {
        let (score, resume_html, cover_letter_html) = match (
            row.match_score,
            row.resume_html.as_deref(),
            row.cover_letter_html.as_deref(),
        ) {
            (Some(score), Some(resume), Some(cover)) => (score, resume, cover),
            (None, None, None) => return JobState::Extracted,
            _ => {
                // The schema CHECK forbids this; treat it as not yet analyzed.
                warn!("Job {} has a partial score/document set", row.id);
                return JobState::Extracted;
            }
        };

        let documents = Documents {
            resume_html,
            cover_letter_html,
            format: row
                .document_format
                .unwrap_or_else(|| DocumentFormat::detect(resume_html)),
        };
        let score = score.clamp(0, 100) as u8;

        if row.is_edited {
            JobState::Edited { score, documents }
        } else {
            JobState::Scored { score, documents }
        }
    }

    pub fn stage(&self) -> JobStage {
        match self {
            JobState::Extracted => JobStage::Extracted,
            JobState::Scored { .. } => JobStage::Scored,
            JobState::Edited { .. } => JobStage::Edited,
        }
    }

    pub fn documents(&self) -> Option<Documents<'a>> {
        match self {
            JobState::Extracted => None,
            JobState::Scored { documents, .. } | JobState::Edited { documents, .. } => {
                Some(*documents)
            }
        }
    }

    pub fn score(&self) -> Option<u8> {
        match self {
            JobState::Extracted => None,
            JobState::Scored { score, .. } | JobState::Edited { score, .. } => Some(*score),
        }
    }
}

impl JobRow {
    pub fn state(&self) -> JobState<'_> {
        JobState::from_row(self)
    }
}
