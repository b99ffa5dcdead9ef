use bytes::Bytes;

use crate::errors::AppError;

/// Extracts plain text from an uploaded PDF on a blocking thread.
pub async fn extract_pdf_text(bytes: Bytes) -> Result<String, AppError> {
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Validation(format!("Failed to extract text from PDF: {e}")))?;

    extracted.map_err(|e| AppError::Validation(format!("Failed to extract text from PDF: {e:?}")))
}

/// True when the upload looks like a PDF, by name or by magic bytes.
pub fn looks_like_pdf(file_name: &str, bytes: &[u8]) -> bool {
    file_name.to_ascii_lowercase().ends_with(".pdf") || bytes.starts_with(b"%PDF")
}
