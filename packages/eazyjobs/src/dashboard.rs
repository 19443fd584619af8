//! Scrape submission, status polling and view-state reconciliation.
//!
//! # Flow
//!
//! ```text
//! submit(keyword)
//!     │
//!     ├─► POST /scrape
//!     ├─► spawn StatusPoller (child of the dashboard's root token)
//!     │       └─► GET /status/{keyword} every interval
//!     │               ├─ completed → notify, reload results + stats
//!     │               ├─ failed    → notify
//!     │               └─ error / ceiling / cancel → stop, no notification
//!     └─► refresh stats
//! ```
//!
//! Every poller publishes one `DashboardEvent::PollFinished`. Results are
//! reloaded wholesale (last write wins); nothing is merged per keyword.

use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use std::sync::Arc;

use scraper_client::{normalize_keyword, ScrapeRequest, ScrapeResult, ScraperError};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::api::BaseScraperApi;
use crate::events::{DashboardEvent, EventSink};
use crate::poller::{PollConfig, PollOutcome, StatusPoller};
use crate::saved::{SavedJob, SavedJobs};
use crate::stats::Stats;
use crate::storage::StorageError;

pub const DEFAULT_TARGET_POSTS: u32 = 50;
pub const TARGET_POSTS_RANGE: RangeInclusive<u32> = 1..=200;

/// Links shown when viewing a single result.
pub const PREVIEW_LINKS: usize = 5;

const START_FAILED: &str = "Failed to start scraping";

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Please enter a keyword")]
    EmptyKeyword,

    #[error("Target posts must be between 1 and 200 (got {0})")]
    InvalidTargetPosts(u32),

    #[error("A scrape for \"{0}\" is already being tracked")]
    AlreadyInFlight(String),

    #[error("{0}")]
    Rejected(String),

    #[error("No job links to save for \"{0}\"")]
    NothingToSave(String),

    #[error(transparent)]
    Api(#[from] ScraperError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    pub poll: PollConfig,
    /// Refuse a submission while a poller for the same keyword is running.
    pub reject_duplicate_submissions: bool,
}

/// Status shown next to a keyword in the results list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultBadge {
    InProgress,
    Completed,
    Failed,
}

impl ResultBadge {
    pub fn label(&self) -> &'static str {
        match self {
            ResultBadge::InProgress => "In Progress",
            ResultBadge::Completed => "Completed",
            ResultBadge::Failed => "Failed",
        }
    }

    fn of(result: Option<&ScrapeResult>) -> Self {
        match result {
            None => ResultBadge::InProgress,
            Some(r) if r.success => ResultBadge::Completed,
            Some(_) => ResultBadge::Failed,
        }
    }
}

/// Summary of one result: counts, timestamp and the first few links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub keyword: String,
    pub total_posts: u64,
    pub timestamp: String,
    pub links: Vec<String>,
}

impl ResultView {
    fn new(keyword: &str, result: &ScrapeResult) -> Self {
        Self {
            keyword: keyword.to_string(),
            total_posts: result.total_posts,
            timestamp: result.timestamp.clone(),
            links: result.links.iter().take(PREVIEW_LINKS).cloned().collect(),
        }
    }
}

/// A running poller. Dropping the handle leaves the poller running.
#[derive(Debug)]
pub struct PollHandle {
    keyword: String,
    cancel: CancellationToken,
    join: JoinHandle<PollOutcome>,
}

impl PollHandle {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the poller and its follow-up work (notifications, reloads).
    pub async fn wait(self) -> PollOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(keyword = %self.keyword, error = %e, "Poller task aborted");
                PollOutcome::Cancelled
            }
        }
    }
}

#[derive(Default)]
struct ViewState {
    results: BTreeMap<String, ScrapeResult>,
    stats: Stats,
}

struct Inner {
    api: Arc<dyn BaseScraperApi>,
    config: DashboardConfig,
    events: EventSink,
    saved: Mutex<SavedJobs>,
    view: RwLock<ViewState>,
    /// Running pollers per job key.
    in_flight: Mutex<HashMap<String, usize>>,
    shutdown: CancellationToken,
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Inner>,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn BaseScraperApi>,
        saved: SavedJobs,
        config: DashboardConfig,
        events: EventSink,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                events,
                saved: Mutex::new(saved),
                view: RwLock::new(ViewState::default()),
                in_flight: Mutex::new(HashMap::new()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Initial load: results, then stats. Failures are logged and leave the
    /// previous state in place.
    pub async fn refresh(&self) {
        let _ = self.load_results().await;
        let _ = self.load_stats().await;
    }

    /// Start a scrape for `keyword` and begin polling its status.
    pub async fn submit(
        &self,
        keyword: &str,
        target_posts: u32,
    ) -> Result<PollHandle, DashboardError> {
        let events = &self.inner.events;
        let keyword = self.require_keyword(keyword)?;

        if !TARGET_POSTS_RANGE.contains(&target_posts) {
            let err = DashboardError::InvalidTargetPosts(target_posts);
            events.error(err.to_string());
            return Err(err);
        }

        let key = normalize_keyword(keyword);
        if !self.reserve(&key).await {
            let err = DashboardError::AlreadyInFlight(keyword.to_string());
            events.error(err.to_string());
            return Err(err);
        }

        let request = ScrapeRequest::new(keyword, target_posts);
        let response = match self.inner.api.start_scrape(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.release(&key).await;
                error!(keyword = %keyword, error = %e, "Scraping error");
                events.error(START_FAILED);
                return Err(e.into());
            }
        };

        if !response.success {
            self.release(&key).await;
            let message = response
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| START_FAILED.to_string());
            info!(keyword = %keyword, message = %message, "Scrape request refused");
            events.error(message.clone());
            return Err(DashboardError::Rejected(message));
        }

        info!(keyword = %keyword, target_posts, "Scraping started");
        events.success(format!("Scraping started for \"{keyword}\""));
        events.emit(DashboardEvent::ScrapeStarted {
            keyword: keyword.to_string(),
        });

        let handle = self.spawn_poller(keyword);
        let _ = self.load_stats().await;
        Ok(handle)
    }

    /// Trimmed keyword, or an error toast for a blank one.
    fn require_keyword<'a>(&self, keyword: &'a str) -> Result<&'a str, DashboardError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.inner
                .events
                .error(DashboardError::EmptyKeyword.to_string());
            return Err(DashboardError::EmptyKeyword);
        }
        Ok(keyword)
    }

    fn spawn_poller(&self, keyword: &str) -> PollHandle {
        let cancel = self.inner.shutdown.child_token();
        let poller = StatusPoller::new(self.inner.api.clone(), keyword, self.inner.config.poll)
            .with_cancellation(cancel.clone());

        let dashboard = self.clone();
        let display = keyword.to_string();
        let join = tokio::spawn(async move {
            let outcome = poller.run().await;
            dashboard.finish_poll(&display, &outcome).await;
            outcome
        });

        PollHandle {
            keyword: keyword.to_string(),
            cancel,
            join,
        }
    }

    async fn finish_poll(&self, keyword: &str, outcome: &PollOutcome) {
        self.release(&normalize_keyword(keyword)).await;

        let events = &self.inner.events;
        match outcome {
            PollOutcome::Completed => {
                events.success(format!("Scraping completed for \"{keyword}\""));
                self.refresh().await;
            }
            PollOutcome::Failed => {
                events.error(format!("Scraping failed for \"{keyword}\""));
            }
            // Logged by the poller; surfaced only through the event below.
            PollOutcome::TransportError(_) | PollOutcome::TimedOut | PollOutcome::Cancelled => {}
        }

        events.emit(DashboardEvent::PollFinished {
            keyword: keyword.to_string(),
            outcome: outcome.clone(),
        });
    }

    async fn reserve(&self, key: &str) -> bool {
        let mut in_flight = self.inner.in_flight.lock().await;
        let running = in_flight.entry(key.to_string()).or_insert(0);
        if *running > 0 && self.inner.config.reject_duplicate_submissions {
            return false;
        }
        *running += 1;
        true
    }

    async fn release(&self, key: &str) {
        let mut in_flight = self.inner.in_flight.lock().await;
        if let Some(running) = in_flight.get_mut(key) {
            *running = running.saturating_sub(1);
            if *running == 0 {
                in_flight.remove(key);
            }
        }
    }

    /// Replace the in-memory results with the server's full set.
    pub async fn load_results(&self) -> Result<usize, DashboardError> {
        let results = match self.inner.api.list_results().await {
            Ok(response) => response.into_results(),
            Err(e) => {
                error!(error = %e, "Failed to load results");
                return Err(e.into());
            }
        };

        let count = results.len();
        self.inner.view.write().await.results = results;
        debug!(count, "Results loaded");
        self.inner
            .events
            .emit(DashboardEvent::ResultsLoaded { count });
        Ok(count)
    }

    /// Recompute stats from loaded results, server health and saved jobs.
    pub async fn load_stats(&self) -> Result<Stats, DashboardError> {
        let health = match self.inner.api.health().await {
            Ok(health) => health,
            Err(e) => {
                error!(error = %e, "Failed to load stats");
                return Err(e.into());
            }
        };

        let saved = self.inner.saved.lock().await.len();
        let stats = {
            let mut view = self.inner.view.write().await;
            let stats = Stats::derive(&view.results, &health, saved);
            view.stats = stats;
            stats
        };
        self.inner.events.emit(DashboardEvent::StatsUpdated(stats));
        Ok(stats)
    }

    /// Stats after a local saved-jobs change. Falls back to updating only the
    /// saved count when the server can't be reached.
    async fn recompute_stats(&self) {
        if self.load_stats().await.is_ok() {
            return;
        }
        let saved = self.inner.saved.lock().await.len();
        let stats = {
            let mut view = self.inner.view.write().await;
            view.stats.saved_jobs = saved;
            view.stats
        };
        self.inner.events.emit(DashboardEvent::StatsUpdated(stats));
    }

    /// Fetch one result straight from the service.
    pub async fn view_result(&self, keyword: &str) -> Result<ResultView, DashboardError> {
        let keyword = self.require_keyword(keyword)?;
        match self.inner.api.get_result(keyword).await {
            Ok(result) => {
                self.inner.events.success(format!(
                    "Found {} jobs for \"{}\"",
                    result.total_posts, keyword
                ));
                Ok(ResultView::new(keyword, &result))
            }
            Err(e) => {
                error!(keyword = %keyword, error = %e, "View results error");
                self.inner.events.error("Failed to load results");
                Err(e.into())
            }
        }
    }

    /// Delete a result server-side, then reload results and stats.
    pub async fn delete_result(&self, keyword: &str) -> Result<(), DashboardError> {
        let keyword = self.require_keyword(keyword)?;
        if let Err(e) = self.inner.api.delete_result(keyword).await {
            error!(keyword = %keyword, error = %e, "Delete error");
            self.inner.events.error("Failed to delete results");
            return Err(e.into());
        }

        self.inner
            .events
            .success(format!("Deleted results for \"{keyword}\""));
        self.refresh().await;
        Ok(())
    }

    /// Save every link of a loaded, successful result as a saved job.
    pub async fn save_links(&self, keyword: &str) -> Result<Vec<SavedJob>, DashboardError> {
        let keyword = self.require_keyword(keyword)?;
        let links = {
            let view = self.inner.view.read().await;
            match view.results.get(&normalize_keyword(keyword)) {
                Some(result) if result.success && !result.links.is_empty() => {
                    Some(result.links.clone())
                }
                _ => None,
            }
        };
        let Some(links) = links else {
            let err = DashboardError::NothingToSave(keyword.to_string());
            self.inner.events.error(err.to_string());
            return Err(err);
        };

        let added = self.inner.saved.lock().await.append_links(keyword, &links);
        let added = match added {
            Ok(added) => added,
            Err(e) => {
                error!(keyword = %keyword, error = %e, "Failed to persist saved jobs");
                self.inner.events.error("Failed to save job links");
                return Err(e.into());
            }
        };

        info!(keyword = %keyword, count = added.len(), "Saved job links");
        self.inner
            .events
            .success(format!("Saved {} job links", added.len()));
        self.recompute_stats().await;
        Ok(added)
    }

    /// Remove one saved job. Returns `false` if no saved job has `id`.
    pub async fn delete_saved_job(&self, id: Uuid) -> Result<bool, DashboardError> {
        let removed = self.inner.saved.lock().await.remove(id);
        match removed {
            Ok(Some(_)) => {
                self.inner.events.success("Job link removed");
                self.recompute_stats().await;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                error!(id = %id, error = %e, "Failed to persist saved jobs");
                self.inner.events.error("Failed to remove job link");
                Err(e.into())
            }
        }
    }

    pub async fn results(&self) -> BTreeMap<String, ScrapeResult> {
        self.inner.view.read().await.results.clone()
    }

    pub async fn badge(&self, keyword: &str) -> ResultBadge {
        let view = self.inner.view.read().await;
        ResultBadge::of(view.results.get(&normalize_keyword(keyword)))
    }

    pub async fn stats(&self) -> Stats {
        self.inner.view.read().await.stats
    }

    pub async fn saved_jobs(&self) -> Vec<SavedJob> {
        self.inner.saved.lock().await.jobs().to_vec()
    }

    pub async fn saved_job(&self, id: Uuid) -> Option<SavedJob> {
        self.inner.saved.lock().await.get(id).cloned()
    }

    /// Job keys with a running poller.
    pub async fn in_flight(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.in_flight.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Stop every running poller. Each reports `PollOutcome::Cancelled`.
    pub fn cancel_all(&self) {
        self.inner.shutdown.cancel();
    }
}
