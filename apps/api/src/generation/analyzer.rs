//! Analyzer: the AI capability behind generation, as a pluggable trait.
//!
//! `AppState` holds an `Arc<dyn Analyzer>`; production uses `LlmAnalyzer`,
//! tests substitute a canned implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::generation::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM, CLEAN_RESUME_SYSTEM,
    DEFAULT_REGENERATION_INSTRUCTION, DOCUMENT_RULES, EXTRACT_PROMPT_TEMPLATE, EXTRACT_SYSTEM,
    REGENERATION_PROMPT_TEMPLATE,
};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION, TONE_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Normalize company, title and description only.
    ExtractOnly,
    /// Score the resume against the job and write both documents.
    FullAnalysis,
}

/// Everything the AI sees for one call.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub mode: AnalysisMode,
    pub description: &'a str,
    pub resume_text: Option<&'a str>,
    /// Present only on regeneration.
    pub instruction: Option<&'a str>,
    /// Known job metadata on regeneration, kept stable across runs.
    pub known_company: Option<&'a str>,
    pub known_title: Option<&'a str>,
    pub current_cover_letter: Option<&'a str>,
}

/// Raw AI reply. Field names follow the JSON schema given in the prompts.
/// Nothing here is trusted until the orchestrator validates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisOutput {
    #[serde(default)]
    pub company_name: String,
    #[serde(default, rename = "job_title")]
    pub title: String,
    #[serde(default, rename = "extracted_job_description")]
    pub cleaned_description: String,
    #[serde(default, rename = "match_score")]
    pub score: Option<i64>,
    #[serde(default)]
    pub resume_html: Option<String>,
    #[serde(default)]
    pub cover_letter_html: Option<String>,
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<AnalysisOutput, LlmError>;

    /// Turns messy pasted resume text into clean Markdown.
    async fn clean_resume(&self, raw: &str) -> Result<String, LlmError>;
}

/// Production analyzer over the Claude client.
pub struct LlmAnalyzer {
    llm: LlmClient,
}

impl LlmAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<AnalysisOutput, LlmError> {
        let (prompt, system) = build_prompt(&request);
        self.llm.call_json::<AnalysisOutput>(&prompt, system).await
    }

    async fn clean_resume(&self, raw: &str) -> Result<String, LlmError> {
        self.llm.call_text(raw, CLEAN_RESUME_SYSTEM).await
    }
}

/// Picks and fills the prompt template for a request.
fn build_prompt(request: &AnalysisRequest<'_>) -> (String, &'static str) {
    match (request.mode, request.instruction.is_some() || request.current_cover_letter.is_some()) {
        (AnalysisMode::ExtractOnly, _) => (
            EXTRACT_PROMPT_TEMPLATE
                .replace("{json_only}", JSON_ONLY_SYSTEM)
                .replace("{description}", request.description),
            EXTRACT_SYSTEM,
        ),
        (AnalysisMode::FullAnalysis, false) => (
            ANALYSIS_PROMPT_TEMPLATE
                .replace("{json_only}", JSON_ONLY_SYSTEM)
                .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
                .replace("{tone}", TONE_INSTRUCTION)
                .replace("{document_rules}", DOCUMENT_RULES)
                .replace("{description}", request.description)
                .replace("{resume}", request.resume_text.unwrap_or_default()),
            ANALYSIS_SYSTEM,
        ),
        (AnalysisMode::FullAnalysis, true) => (
            REGENERATION_PROMPT_TEMPLATE
                .replace("{json_only}", JSON_ONLY_SYSTEM)
                .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
                .replace("{tone}", TONE_INSTRUCTION)
                .replace("{document_rules}", DOCUMENT_RULES)
                .replace("{company}", request.known_company.unwrap_or("the company"))
                .replace("{title}", request.known_title.unwrap_or("this role"))
                .replace("{description}", request.description)
                .replace("{resume}", request.resume_text.unwrap_or_default())
                .replace(
                    "{current_cover_letter}",
                    request.current_cover_letter.unwrap_or("(none yet)"),
                )
                .replace(
                    "{instruction}",
                    request
                        .instruction
                        .filter(|i| !i.trim().is_empty())
                        .unwrap_or(DEFAULT_REGENERATION_INSTRUCTION),
                ),
            ANALYSIS_SYSTEM,
        ),
    }
}
