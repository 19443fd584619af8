//! REST client for the EazyJobs scraping service.
//!
//! The service runs scrape jobs keyed by a lowercased keyword. A job is
//! started with `POST /scrape`, its progress is read from
//! `GET /status/{keyword}`, and finished jobs are exposed under `/results`.
//!
//! # Example
//!
//! ```rust,ignore
//! use scraper_client::{ScrapeRequest, ScraperClient};
//!
//! let client = ScraperClient::new("http://localhost:8000")?;
//!
//! let started = client.start_scrape(&ScrapeRequest::new("rust developer", 50)).await?;
//! let status = client.get_status("rust developer").await?;
//! println!("{} -> {}", started.success, status.status);
//! ```

pub mod error;
pub mod types;

pub use error::{Result, ScraperError};
pub use types::{
    DeleteResponse, HealthResponse, JobStatus, KeywordsResponse, ResultsResponse, ScrapeRequest,
    ScrapeResult, ServiceInfo, StartScrapeResponse, StatusResponse,
};

use reqwest::Url;
use serde::de::DeserializeOwned;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Canonical job key: the service stores jobs under the trimmed, lowercased keyword.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// A blank key would address the collection (`/results/`) instead of a job.
fn job_key(keyword: &str) -> Result<String> {
    let key = normalize_keyword(keyword);
    if key.is_empty() {
        return Err(ScraperError::EmptyKeyword);
    }
    Ok(key)
}

#[derive(Debug, Clone)]
pub struct ScraperClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ScraperClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ScraperError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ScraperError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    /// Service banner with the list of endpoints it offers.
    pub async fn service_info(&self) -> Result<ServiceInfo> {
        let url = self.endpoint(&[])?;
        let resp = self.client.get(url).send().await?;
        read_json(resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint(&["health"])?;
        let resp = self.client.get(url).send().await?;
        read_json(resp).await
    }

    /// Every stored result, keyed by lowercased keyword.
    pub async fn list_results(&self) -> Result<ResultsResponse> {
        let url = self.endpoint(&["results"])?;
        let resp = self.client.get(url).send().await?;
        read_json(resp).await
    }

    /// A single successful result. The service answers 404 for unknown
    /// keywords and 500 for jobs that failed.
    pub async fn get_result(&self, keyword: &str) -> Result<ScrapeResult> {
        let key = job_key(keyword)?;
        let url = self.endpoint(&["results", &key])?;
        let resp = self.client.get(url).send().await?;
        read_json(resp).await
    }

    pub async fn delete_result(&self, keyword: &str) -> Result<DeleteResponse> {
        let key = job_key(keyword)?;
        let url = self.endpoint(&["results", &key])?;
        let resp = self.client.delete(url).send().await?;
        let deleted: DeleteResponse = read_json(resp).await?;
        tracing::debug!(keyword = %key, "Deleted scrape result");
        Ok(deleted)
    }

    /// Start a scrape job. Returns immediately; the job runs server-side.
    pub async fn start_scrape(&self, request: &ScrapeRequest) -> Result<StartScrapeResponse> {
        let url = self.endpoint(&["scrape"])?;
        let resp = self.client.post(url).json(request).send().await?;
        let started: StartScrapeResponse = read_json(resp).await?;
        tracing::debug!(
            keyword = %request.input_keyword,
            target_posts = request.target_posts,
            success = started.success,
            "Scrape request answered"
        );
        Ok(started)
    }

    pub async fn get_status(&self, keyword: &str) -> Result<StatusResponse> {
        let key = job_key(keyword)?;
        let url = self.endpoint(&["status", &key])?;
        let resp = self.client.get(url).send().await?;
        read_json(resp).await
    }

    pub async fn list_keywords(&self) -> Result<KeywordsResponse> {
        let url = self.endpoint(&["keywords"])?;
        let resp = self.client.get(url).send().await?;
        read_json(resp).await
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        if segments.is_empty() {
            return Ok(url);
        }
        url.path_segments_mut()
            .map_err(|_| ScraperError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ScraperError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// The service reports errors as `{"detail": "..."}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
