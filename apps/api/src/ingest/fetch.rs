use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Reader proxy that turns any public page into readable text.
const READER_URL: &str = "https://r.jina.ai/";

/// Fetches the readable text of a web page (job posting, online profile).
///
/// Carried in `AppState` as `Arc<dyn TextFetcher>` so tests can swap it out.
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, AppError>;
}

/// Default fetcher backed by the reader proxy.
pub struct ReaderFetcher {
    client: Client,
}

impl ReaderFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl TextFetcher for ReaderFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, AppError> {
        validate_url(url)?;

        debug!("Fetching {url} through reader proxy");
        let response = self
            .client
            .get(format!("{READER_URL}{url}"))
            .send()
            .await
            .map_err(|e| map_fetch_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Reader proxy returned {status} for {url}");
            return Err(AppError::Validation(format!(
                "Failed to fetch {url} (HTTP {})",
                status.as_u16()
            )));
        }

        let text = response.text().await.map_err(|e| map_fetch_error(url, e))?;
        Ok(text.trim().to_string())
    }
}

/// Only absolute http(s) URLs are accepted.
pub fn validate_url(url: &str) -> Result<(), AppError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Invalid URL. Provide a full URL starting with http:// or https://".to_string(),
        ))
    }
}

fn map_fetch_error(url: &str, e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(format!("Fetching {url} timed out"))
    } else if e.is_connect() {
        AppError::Validation("Could not connect to the page reader service".to_string())
    } else {
        AppError::Validation(format!("Failed to fetch {url}: {e}"))
    }
}
