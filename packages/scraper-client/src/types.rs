use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Body of `POST /scrape`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub input_keyword: String,
    pub target_posts: u32,
    pub headless: bool,
}

impl ScrapeRequest {
    /// Headless is always requested; the dashboard never drives a visible browser.
    pub fn new(keyword: impl Into<String>, target_posts: u32) -> Self {
        Self {
            input_keyword: keyword.into(),
            target_posts,
            headless: true,
        }
    }
}

/// Reply to `POST /scrape`. `success: false` carries the reason in `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartScrapeResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub target_posts: Option<u32>,
}

/// Server-side state of a scrape job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    InProgress,
    Completed,
    Failed,
    NotFound,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::NotFound => "not_found",
            JobStatus::Other(s) => s,
        }
    }

    /// Only `completed` and `failed` end a job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "in_progress" => JobStatus::InProgress,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "not_found" => JobStatus::NotFound,
            _ => JobStatus::Other(s),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply to `GET /status/{keyword}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub keyword: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Outcome of one scrape job as recorded by the service.
///
/// Failed results omit the counters and links, so those default to empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub keyword: String,
    pub success: bool,
    #[serde(default)]
    pub total_posts: u64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_filename: Option<String>,
}

impl ScrapeResult {
    /// Parse `timestamp`, accepting RFC 3339 as well as the offset-less
    /// ISO-8601 form the service emits.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Reply to `GET /results`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsResponse {
    #[serde(default)]
    pub total_keywords: u64,
    #[serde(default)]
    pub results: Option<BTreeMap<String, ScrapeResult>>,
}

impl ResultsResponse {
    /// The keyword → result mapping; a null mapping is an empty one.
    pub fn into_results(self) -> BTreeMap<String, ScrapeResult> {
        self.results.unwrap_or_default()
    }
}

/// Reply to `GET /health`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub active_scraping_tasks: u64,
    #[serde(default)]
    pub total_results: u64,
}

/// Reply to `GET /keywords`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordsResponse {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub count: u64,
}

/// Reply to `DELETE /results/{keyword}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to `GET /`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}
