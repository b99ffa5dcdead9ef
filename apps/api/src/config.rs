use std::time::Duration;

use anyhow::{Context, Result};

/// Minimum cleaned text length for an uploaded (PDF) resume.
pub const MIN_UPLOADED_RESUME_CHARS: usize = 50;
/// Minimum cleaned text length for a resume or job page scraped from a URL.
pub const MIN_SCRAPED_CHARS: usize = 50;
/// Minimum cleaned text length for pasted resume text.
pub const MIN_PASTED_RESUME_CHARS: usize = 100;

/// Ingest thresholds. Every ingest path reads its minimum from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLimits {
    pub uploaded_resume: usize,
    pub scraped_text: usize,
    pub pasted_resume: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            uploaded_resume: MIN_UPLOADED_RESUME_CHARS,
            scraped_text: MIN_SCRAPED_CHARS,
            pasted_resume: MIN_PASTED_RESUME_CHARS,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub generation_timeout: Duration,
    pub scrape_timeout: Duration,
    /// Dump prompts and raw model replies at debug level.
    pub log_ai_payloads: bool,
    pub limits: ContentLimits,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://jobfit.db".to_string()),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            generation_timeout: Duration::from_secs(env_secs("GENERATION_TIMEOUT_SECS", 180)?),
            scrape_timeout: Duration::from_secs(env_secs("SCRAPE_TIMEOUT_SECS", 20)?),
            log_ai_payloads: std::env::var("LOG_AI_PAYLOADS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            limits: ContentLimits::default(),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_secs(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by in-process tests.
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            generation_timeout: Duration::from_secs(5),
            scrape_timeout: Duration::from_secs(5),
            log_ai_payloads: false,
            limits: ContentLimits::default(),
        }
    }
}
