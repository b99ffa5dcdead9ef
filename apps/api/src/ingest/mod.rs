//! Text ingest: fetching pages, extracting PDF text, and the minimum-content gate
//! applied before anything reaches the store or the AI.

pub mod fetch;
pub mod pdf;

use crate::errors::AppError;

/// Trims `text` and rejects it when shorter than `min_chars` characters.
pub fn require_min_chars<'a>(text: &'a str, min_chars: usize, what: &str) -> Result<&'a str, AppError> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len < min_chars {
        return Err(AppError::InsufficientContent(format!(
            "{what} is too short ({len} characters, at least {min_chars} required)"
        )));
    }
    Ok(trimmed)
}
