use serde::{Deserialize, Serialize};

use crate::documents::body::has_body_tag;
use crate::llm_client::strip_code_fences;

/// Format of a stored generated document, recorded once at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DocumentFormat {
    Html,
    Markdown,
}

impl DocumentFormat {
    /// Classifies freshly generated content. Stored documents are never re-sniffed.
    pub fn detect(content: &str) -> Self {
        let head = content.trim_start();
        let head_lower = head
            .get(..head.len().min(64))
            .unwrap_or(head)
            .to_ascii_lowercase();
        if head_lower.starts_with("<!doctype") || head_lower.starts_with("<html") {
            DocumentFormat::Html
        } else if has_body_tag(content) {
            DocumentFormat::Html
        } else {
            DocumentFormat::Markdown
        }
    }
}

/// Normalizes model output before storage: trims and drops a wrapping code fence.
pub fn clean_generated(content: &str) -> String {
    strip_code_fences(content).to_string()
}
