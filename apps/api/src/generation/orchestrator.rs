//! Generation Orchestrator: one AI call, validated into job metadata and,
//! in full analysis, a score plus two documents.
//!
//! Flow: check description → build request → analyzer (under timeout) →
//!       validate metadata → (full analysis) validate score + documents.
//!
//! Nothing is written here. Callers persist the result in one statement, so a
//! failure at any step leaves the job exactly as it was.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::documents::body::has_unclosed_body;
use crate::documents::format::{clean_generated, DocumentFormat};
use crate::errors::AppError;
use crate::generation::analyzer::{AnalysisMode, AnalysisOutput, AnalysisRequest, Analyzer};
use crate::llm_client::{strip_code_fences, LlmError};
use crate::models::resume::ResumeRow;

const UNKNOWN_COMPANY: &str = "Unknown company";
const UNKNOWN_TITLE: &str = "Unknown role";

/// Inputs for one generation run.
#[derive(Debug, Clone, Copy)]
pub struct GenerationInput<'a> {
    pub mode: AnalysisMode,
    pub description: &'a str,
    pub resume: Option<&'a ResumeRow>,
    /// Steering text; only passed on regeneration.
    pub instruction: Option<&'a str>,
    /// Company/title/cover letter of an existing job on regeneration.
    pub existing: Option<ExistingJob<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ExistingJob<'a> {
    pub company: &'a str,
    pub title: &'a str,
    pub cover_letter_html: Option<&'a str>,
}

/// Normalized job metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMetadata {
    pub company: String,
    pub title: String,
    pub description: String,
}

/// Score and documents from a full analysis. Always complete: there is no way
/// to hold a score without both documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedDocuments {
    pub score: u8,
    pub resume_html: String,
    pub cover_letter_html: String,
    pub format: DocumentFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    Extracted(JobMetadata),
    Analyzed {
        metadata: JobMetadata,
        documents: GeneratedDocuments,
    },
}

impl Generated {
    pub fn metadata(&self) -> &JobMetadata {
        match self {
            Generated::Extracted(metadata) | Generated::Analyzed { metadata, .. } => metadata,
        }
    }

    pub fn documents(&self) -> Option<&GeneratedDocuments> {
        match self {
            Generated::Extracted(_) => None,
            Generated::Analyzed { documents, .. } => Some(documents),
        }
    }
}

/// Runs one generation. See module docs for the flow.
pub async fn generate(
    analyzer: &dyn Analyzer,
    input: GenerationInput<'_>,
    timeout: Duration,
) -> Result<Generated, AppError> {
    let description = input.description.trim();
    if description.is_empty() {
        return Err(AppError::InvalidDescription(
            "Job description is empty".to_string(),
        ));
    }

    let resume = match (input.mode, input.resume) {
        (AnalysisMode::FullAnalysis, None) => {
            return Err(AppError::Validation(
                "Full analysis needs a resume. Add or select one first.".to_string(),
            ))
        }
        (AnalysisMode::FullAnalysis, Some(resume)) => Some(resume),
        (AnalysisMode::ExtractOnly, _) => None,
    };

    let request = AnalysisRequest {
        mode: input.mode,
        description,
        resume_text: resume.map(|r| r.content.as_str()),
        instruction: input.instruction.filter(|_| input.existing.is_some()),
        known_company: input.existing.map(|e| e.company),
        known_title: input.existing.map(|e| e.title),
        current_cover_letter: input.existing.and_then(|e| e.cover_letter_html),
    };

    info!(
        "Running {:?} ({} description chars, resume={:?})",
        input.mode,
        description.chars().count(),
        resume.map(|r| r.id)
    );
    let output = with_timeout(timeout, "AI analysis", analyzer.analyze(request)).await?;

    let metadata = validate_metadata(&output)?;
    match input.mode {
        AnalysisMode::ExtractOnly => Ok(Generated::Extracted(metadata)),
        AnalysisMode::FullAnalysis => {
            let documents = validate_documents(output)?;
            info!(
                "Generated documents for {} at {} (score {})",
                metadata.title, metadata.company, documents.score
            );
            Ok(Generated::Analyzed {
                metadata,
                documents,
            })
        }
    }
}

/// Cleans pasted resume text through the analyzer, under the generation timeout.
pub async fn clean_resume_text(
    analyzer: &dyn Analyzer,
    raw: &str,
    timeout: Duration,
) -> Result<String, AppError> {
    let cleaned = with_timeout(timeout, "Resume cleaning", analyzer.clean_resume(raw)).await?;
    Ok(strip_code_fences(&cleaned).to_string())
}

/// Bounds an AI call. Dropping the future on expiry cancels the request.
async fn with_timeout<T>(
    timeout: Duration,
    what: &str,
    call: impl Future<Output = Result<T, LlmError>>,
) -> Result<T, AppError> {
    match tokio::time::timeout(timeout, call).await {
        Err(_) => Err(AppError::Timeout(format!(
            "{what} did not finish within {}s",
            timeout.as_secs()
        ))),
        Ok(Err(e)) if e.is_timeout() => Err(AppError::Timeout(format!("{what} timed out: {e}"))),
        Ok(Err(e)) => Err(AppError::Generation(format!("{what} failed: {e}"))),
        Ok(Ok(value)) => Ok(value),
    }
}

fn validate_metadata(output: &AnalysisOutput) -> Result<JobMetadata, AppError> {
    let description = strip_code_fences(&output.cleaned_description);
    if description.is_empty() || description.starts_with("Error") {
        return Err(AppError::InvalidDescription(
            "Could not extract a valid job description from the provided content".to_string(),
        ));
    }

    Ok(JobMetadata {
        company: non_empty_or(&output.company_name, UNKNOWN_COMPANY),
        title: non_empty_or(&output.title, UNKNOWN_TITLE),
        description: description.to_string(),
    })
}

fn validate_documents(output: AnalysisOutput) -> Result<GeneratedDocuments, AppError> {
    let score = match output.score {
        Some(score) if (0..=100).contains(&score) => score as u8,
        Some(score) => {
            return Err(AppError::Generation(format!(
                "AI returned match score {score}, outside 0-100"
            )))
        }
        None => return Err(AppError::Generation("AI returned no match score".to_string())),
    };

    let resume_html = required_document(output.resume_html, "resume")?;
    let cover_letter_html = required_document(output.cover_letter_html, "cover letter")?;

    let format = DocumentFormat::detect(&resume_html);
    let cover_format = DocumentFormat::detect(&cover_letter_html);
    if cover_format != format {
        warn!("Generated documents disagree on format: resume {format:?}, cover letter {cover_format:?}");
    }

    Ok(GeneratedDocuments {
        score,
        resume_html,
        cover_letter_html,
        format,
    })
}

fn required_document(document: Option<String>, what: &str) -> Result<String, AppError> {
    let document = document
        .map(|d| clean_generated(&d))
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::Generation(format!("AI returned no {what} document")))?;
    if has_unclosed_body(&document) {
        return Err(AppError::Generation(format!(
            "AI returned a malformed {what} document (unclosed <body>)"
        )));
    }
    Ok(document)
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    match value.trim() {
        "" => fallback.to_string(),
        trimmed => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_resume, FakeAnalyzer, COVER_DOC, RESUME_DOC};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn input<'a>(mode: AnalysisMode, resume: Option<&'a ResumeRow>) -> GenerationInput<'a> {
        GenerationInput {
            mode,
            description: "Backend role at Acme",
            resume,
            instruction: None,
            existing: None,
        }
    }

    #[tokio::test]
    async fn test_extract_only_returns_metadata_without_documents() {
        let analyzer = FakeAnalyzer::extraction("Acme", "Backend Engineer");
        let generated = generate(&analyzer, input(AnalysisMode::ExtractOnly, None), TIMEOUT)
            .await
            .unwrap();

        assert!(generated.documents().is_none());
        assert_eq!(generated.metadata().company, "Acme");
        assert_eq!(analyzer.calls(), 1);
        assert_eq!(analyzer.last_mode(), Some(AnalysisMode::ExtractOnly));
        assert!(!analyzer.last_had_resume());
    }

    #[tokio::test]
    async fn test_extract_only_ignores_score_returned_by_model() {
        let analyzer = FakeAnalyzer::full(82);
        let resume = sample_resume();
        let generated = generate(
            &analyzer,
            input(AnalysisMode::ExtractOnly, Some(&resume)),
            TIMEOUT,
        )
        .await
        .unwrap();
        assert!(matches!(generated, Generated::Extracted(_)));
    }

    #[tokio::test]
    async fn test_full_analysis_returns_complete_documents() {
        let analyzer = FakeAnalyzer::full(82);
        let resume = sample_resume();
        let generated = generate(
            &analyzer,
            input(AnalysisMode::FullAnalysis, Some(&resume)),
            TIMEOUT,
        )
        .await
        .unwrap();

        let documents = generated.documents().unwrap();
        assert_eq!(documents.score, 82);
        assert_eq!(documents.resume_html, RESUME_DOC);
        assert_eq!(documents.cover_letter_html, COVER_DOC);
        assert_eq!(documents.format, DocumentFormat::Html);
        assert!(analyzer.last_had_resume());
    }

    #[tokio::test]
    async fn test_empty_description_fails_before_calling_ai() {
        let analyzer = FakeAnalyzer::full(82);
        let mut inp = input(AnalysisMode::ExtractOnly, None);
        inp.description = "   \n";

        let err = generate(&analyzer, inp, TIMEOUT).await.unwrap_err();

        assert_eq!(err.kind(), "INVALID_DESCRIPTION");
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn test_full_analysis_requires_resume() {
        let analyzer = FakeAnalyzer::full(82);
        let err = generate(&analyzer, input(AnalysisMode::FullAnalysis, None), TIMEOUT)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "VALIDATION_ERROR");
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_generation_error() {
        let resume = sample_resume();
        for score in [101, -1, 250] {
            let analyzer = FakeAnalyzer::full(score);
            let err = generate(
                &analyzer,
                input(AnalysisMode::FullAnalysis, Some(&resume)),
                TIMEOUT,
            )
            .await
            .unwrap_err();
            assert_eq!(err.kind(), "GENERATION_ERROR", "score {score}");
        }
    }

    #[tokio::test]
    async fn test_missing_or_malformed_document_is_generation_error() {
        let resume = sample_resume();

        let mut output = FakeAnalyzer::full_output(70);
        output.cover_letter_html = None;
        let err = generate(
            &FakeAnalyzer::returning(output),
            input(AnalysisMode::FullAnalysis, Some(&resume)),
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "GENERATION_ERROR");

        let mut output = FakeAnalyzer::full_output(70);
        output.resume_html = Some("<html><body><p>cut".to_string());
        let err = generate(
            &FakeAnalyzer::returning(output),
            input(AnalysisMode::FullAnalysis, Some(&resume)),
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "GENERATION_ERROR");
    }

    #[tokio::test]
    async fn test_fenced_documents_are_cleaned() {
        let resume = sample_resume();
        let mut output = FakeAnalyzer::full_output(60);
        output.resume_html = Some(format!("```html\n{RESUME_DOC}\n```"));
        let generated = generate(
            &FakeAnalyzer::returning(output),
            input(AnalysisMode::FullAnalysis, Some(&resume)),
            TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(generated.documents().unwrap().resume_html, RESUME_DOC);
    }

    #[tokio::test]
    async fn test_error_description_from_ai_is_invalid_description() {
        let mut output = FakeAnalyzer::full_output(50);
        output.cleaned_description = "Error: Could not read page".to_string();
        let err = generate(
            &FakeAnalyzer::returning(output),
            input(AnalysisMode::ExtractOnly, None),
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "INVALID_DESCRIPTION");
    }

    #[tokio::test]
    async fn test_ai_failure_is_generation_error() {
        let err = generate(
            &FakeAnalyzer::failing(),
            input(AnalysisMode::ExtractOnly, None),
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "GENERATION_ERROR");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_ai_call_times_out() {
        let analyzer = FakeAnalyzer::full(80).with_delay(Duration::from_secs(600));
        let resume = sample_resume();
        let err = generate(
            &analyzer,
            input(AnalysisMode::FullAnalysis, Some(&resume)),
            Duration::from_secs(30),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "TIMEOUT");
    }

    #[tokio::test]
    async fn test_instruction_only_forwarded_on_regeneration() {
        let analyzer = FakeAnalyzer::full(75);
        let resume = sample_resume();
        let mut inp = input(AnalysisMode::FullAnalysis, Some(&resume));
        inp.instruction = Some("Shorter please");

        generate(&analyzer, inp, TIMEOUT).await.unwrap();
        assert_eq!(analyzer.last_instruction(), None);

        inp.existing = Some(ExistingJob {
            company: "Acme",
            title: "Dev",
            cover_letter_html: Some(COVER_DOC),
        });
        generate(&analyzer, inp, TIMEOUT).await.unwrap();
        assert_eq!(analyzer.last_instruction().as_deref(), Some("Shorter please"));
    }

    #[tokio::test]
    async fn test_blank_company_and_title_fall_back() {
        let mut output = FakeAnalyzer::full_output(50);
        output.company_name = "  ".to_string();
        output.title = String::new();
        let generated = generate(
            &FakeAnalyzer::returning(output),
            input(AnalysisMode::ExtractOnly, None),
            TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(generated.metadata().company, UNKNOWN_COMPANY);
        assert_eq!(generated.metadata().title, UNKNOWN_TITLE);
    }
}
