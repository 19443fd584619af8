// Test doubles for the scraping service.
//
// `MockScraperApi` answers from scripted state and records every call so
// tests can assert on exactly which requests the dashboard issued.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scraper_client::{
    normalize_keyword, DeleteResponse, HealthResponse, JobStatus, Result, ResultsResponse,
    ScrapeRequest, ScrapeResult, ScraperError, StartScrapeResponse, StatusResponse,
};

/// A request the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Health,
    ListResults,
    GetResult(String),
    DeleteResult(String),
    StartScrape(ScrapeRequest),
    GetStatus(String),
}

/// Endpoints that can be made to fail with a network error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    ListResults,
    GetResult,
    DeleteResult,
    StartScrape,
}

pub struct MockScraperApi {
    statuses: Arc<Mutex<VecDeque<std::result::Result<JobStatus, String>>>>,
    results: Arc<Mutex<BTreeMap<String, ScrapeResult>>>,
    start_response: Arc<Mutex<Option<StartScrapeResponse>>>,
    active_tasks: Arc<Mutex<u64>>,
    failing: Arc<Mutex<HashSet<Endpoint>>>,
    calls: Arc<Mutex<Vec<ApiCall>>>,
}

impl Default for MockScraperApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScraperApi {
    pub fn new() -> Self {
        Self {
            statuses: Arc::new(Mutex::new(VecDeque::new())),
            results: Arc::new(Mutex::new(BTreeMap::new())),
            start_response: Arc::new(Mutex::new(None)),
            active_tasks: Arc::new(Mutex::new(0)),
            failing: Arc::new(Mutex::new(HashSet::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a status answer. Once the queue is empty every poll sees `in_progress`.
    pub fn with_status(self, status: JobStatus) -> Self {
        self.statuses.lock().unwrap().push_back(Ok(status));
        self
    }

    /// Queue a failing status request.
    pub fn with_status_error(self, message: &str) -> Self {
        self.statuses.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    /// Add a successful result with the given links.
    pub fn with_result(self, keyword: &str, links: &[&str]) -> Self {
        self.insert_result(keyword, links);
        self
    }

    /// Add a failed result.
    pub fn with_failed_result(self, keyword: &str, error: &str) -> Self {
        self.results.lock().unwrap().insert(
            normalize_keyword(keyword),
            ScrapeResult {
                keyword: keyword.to_string(),
                success: false,
                timestamp: "2025-03-01T10:15:30.123456".to_string(),
                error: Some(error.to_string()),
                ..Default::default()
            },
        );
        self
    }

    /// Answer `POST /scrape` with this body instead of a plain success.
    pub fn with_start_response(self, response: StartScrapeResponse) -> Self {
        *self.start_response.lock().unwrap() = Some(response);
        self
    }

    pub fn with_active_tasks(self, count: u64) -> Self {
        *self.active_tasks.lock().unwrap() = count;
        self
    }

    pub fn failing(self, endpoint: Endpoint) -> Self {
        self.set_failing(endpoint);
        self
    }

    /// Make `endpoint` fail from now on.
    pub fn set_failing(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    /// Simulate the service finishing a job while the client is polling.
    pub fn insert_result(&self, keyword: &str, links: &[&str]) {
        self.results.lock().unwrap().insert(
            normalize_keyword(keyword),
            ScrapeResult {
                keyword: keyword.to_string(),
                success: true,
                total_posts: links.len() as u64,
                timestamp: "2025-03-01T10:15:30.123456".to_string(),
                links: links.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        );
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, matches: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn status_calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                ApiCall::GetStatus(k) => Some(k.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn start_calls(&self) -> Vec<ScrapeRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                ApiCall::StartScrape(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn list_results_calls(&self) -> usize {
        self.call_count(|c| matches!(c, ApiCall::ListResults))
    }

    pub fn health_calls(&self) -> usize {
        self.call_count(|c| matches!(c, ApiCall::Health))
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, endpoint: Endpoint) -> Result<()> {
        if self.failing.lock().unwrap().contains(&endpoint) {
            return Err(ScraperError::Network(format!("{endpoint:?} unreachable")));
        }
        Ok(())
    }

    fn not_found(keyword: &str) -> ScraperError {
        ScraperError::Api {
            status: 404,
            message: format!("No results found for {keyword}. Start scraping first."),
        }
    }
}

#[async_trait]
impl crate::api::BaseScraperApi for MockScraperApi {
    async fn health(&self) -> Result<HealthResponse> {
        self.record(ApiCall::Health);
        self.check(Endpoint::Health)?;
        Ok(HealthResponse {
            status: "healthy".to_string(),
            timestamp: None,
            active_scraping_tasks: *self.active_tasks.lock().unwrap(),
            total_results: self.results.lock().unwrap().len() as u64,
        })
    }

    async fn list_results(&self) -> Result<ResultsResponse> {
        self.record(ApiCall::ListResults);
        self.check(Endpoint::ListResults)?;
        let results = self.results.lock().unwrap().clone();
        Ok(ResultsResponse {
            total_keywords: results.len() as u64,
            results: Some(results),
        })
    }

    async fn get_result(&self, keyword: &str) -> Result<ScrapeResult> {
        let key = normalize_keyword(keyword);
        self.record(ApiCall::GetResult(key.clone()));
        self.check(Endpoint::GetResult)?;
        self.results
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| Self::not_found(&key))
    }

    async fn delete_result(&self, keyword: &str) -> Result<DeleteResponse> {
        let key = normalize_keyword(keyword);
        self.record(ApiCall::DeleteResult(key.clone()));
        self.check(Endpoint::DeleteResult)?;
        self.results.lock().unwrap().remove(&key);
        Ok(DeleteResponse {
            message: Some(format!("Results deleted for keyword: {key}")),
        })
    }

    async fn start_scrape(&self, request: &ScrapeRequest) -> Result<StartScrapeResponse> {
        self.record(ApiCall::StartScrape(request.clone()));
        self.check(Endpoint::StartScrape)?;
        let scripted = self.start_response.lock().unwrap().clone();
        Ok(scripted.unwrap_or_else(|| StartScrapeResponse {
            success: true,
            message: Some(format!(
                "Scraping started for keyword: {}",
                normalize_keyword(&request.input_keyword)
            )),
            status: Some(JobStatus::InProgress),
            keyword: Some(normalize_keyword(&request.input_keyword)),
            target_posts: Some(request.target_posts),
        }))
    }

    async fn get_status(&self, keyword: &str) -> Result<StatusResponse> {
        let key = normalize_keyword(keyword);
        self.record(ApiCall::GetStatus(key.clone()));
        let next = self.statuses.lock().unwrap().pop_front();
        match next.unwrap_or(Ok(JobStatus::InProgress)) {
            Ok(status) => Ok(StatusResponse {
                keyword: Some(key),
                status,
                timestamp: None,
            }),
            Err(message) => Err(ScraperError::Network(message)),
        }
    }
}
