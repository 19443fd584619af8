//! Status polling for one in-flight scrape job.
//!
//! A `StatusPoller` asks the service for the job's status on a fixed interval
//! until the job reaches a terminal status, a request fails, the overall
//! ceiling elapses, or its cancellation token fires. There is no retry and no
//! backoff; individual requests have no timeout of their own but are raced
//! against cancellation and the ceiling.

use std::sync::Arc;
use std::time::Duration;

use scraper_client::{normalize_keyword, JobStatus};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::BaseScraperApi;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3_000);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(300_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between status requests; the first request goes out after one interval.
    pub interval: Duration,
    /// Ceiling on the whole polling loop.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Why a poller stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed,
    Failed,
    /// A status request failed; polling was abandoned without retry.
    TransportError(String),
    /// The ceiling elapsed without a terminal status. The job's real outcome
    /// is unknown.
    TimedOut,
    Cancelled,
}

impl PollOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PollOutcome::Completed => "completed",
            PollOutcome::Failed => "failed",
            PollOutcome::TransportError(_) => "transport_error",
            PollOutcome::TimedOut => "timed_out",
            PollOutcome::Cancelled => "cancelled",
        }
    }
}

pub struct StatusPoller {
    api: Arc<dyn BaseScraperApi>,
    keyword: String,
    config: PollConfig,
    cancel: CancellationToken,
}

impl StatusPoller {
    pub fn new(api: Arc<dyn BaseScraperApi>, keyword: &str, config: PollConfig) -> Self {
        Self {
            api,
            keyword: normalize_keyword(keyword),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop this poller whenever `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Poll until a stop condition is met. The token is cancelled on the way
    /// out, whatever the outcome.
    pub async fn run(self) -> PollOutcome {
        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        let mut attempts: u32 = 0;
        let outcome = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break PollOutcome::Cancelled,
                _ = &mut deadline => break PollOutcome::TimedOut,
                _ = ticker.tick() => {}
            }

            attempts += 1;
            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break PollOutcome::Cancelled,
                _ = &mut deadline => break PollOutcome::TimedOut,
                response = self.api.get_status(&self.keyword) => response,
            };

            match response {
                Ok(response) if response.status.is_terminal() => {
                    break if response.status == JobStatus::Completed {
                        PollOutcome::Completed
                    } else {
                        PollOutcome::Failed
                    };
                }
                Ok(response) => {
                    debug!(keyword = %self.keyword, status = %response.status, attempts, "Scrape still running");
                }
                Err(e) => break PollOutcome::TransportError(e.to_string()),
            }
        };

        self.cancel.cancel();

        match &outcome {
            PollOutcome::TransportError(error) => {
                warn!(keyword = %self.keyword, attempts, error = %error, "Polling abandoned after request error");
            }
            PollOutcome::TimedOut => {
                warn!(
                    keyword = %self.keyword,
                    attempts,
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "Polling ceiling reached without a terminal status"
                );
            }
            other => {
                info!(keyword = %self.keyword, attempts, outcome = other.label(), "Polling stopped");
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockScraperApi;
    use tokio::time::Instant;

    fn poller(api: &Arc<MockScraperApi>, keyword: &str) -> StatusPoller {
        StatusPoller::new(api.clone(), keyword, PollConfig::default())
    }

    #[test]
    fn test_default_config() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_millis(3000));
        assert_eq!(config.timeout, Duration::from_millis(300_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_completed() {
        let api = Arc::new(
            MockScraperApi::new()
                .with_status(JobStatus::InProgress)
                .with_status(JobStatus::InProgress)
                .with_status(JobStatus::Completed),
        );
        let start = Instant::now();

        let outcome = poller(&api, "Rust Dev").run().await;

        assert_eq!(outcome, PollOutcome::Completed);
        assert_eq!(api.status_calls(), vec!["rust dev"; 3]);
        assert!(start.elapsed() >= Duration::from_millis(9_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_failed() {
        let api = Arc::new(MockScraperApi::new().with_status(JobStatus::Failed));
        let outcome = poller(&api, "go").run().await;
        assert_eq!(outcome, PollOutcome::Failed);
        assert_eq!(api.status_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_error_abandons_without_retry() {
        let api = Arc::new(
            MockScraperApi::new()
                .with_status(JobStatus::InProgress)
                .with_status_error("connection reset")
                .with_status(JobStatus::Completed),
        );
        let outcome = poller(&api, "go").run().await;
        assert!(matches!(outcome, PollOutcome::TransportError(ref e) if e.contains("connection reset")));
        assert_eq!(api.status_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ceiling_times_out() {
        // No scripted statuses: the mock keeps answering `in_progress`.
        let api = Arc::new(MockScraperApi::new());
        let p = poller(&api, "forever");
        let token = p.cancellation_token();
        let start = Instant::now();

        let outcome = p.run().await;

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(300_000));
        let calls = api.status_calls().len();
        assert!((99..=100).contains(&calls), "unexpected call count {calls}");
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancellation() {
        let api = Arc::new(MockScraperApi::new());
        let p = poller(&api, "rust");
        let token = p.cancellation_token();
        let handle = tokio::spawn(p.run());

        tokio::time::sleep(Duration::from_millis(7_000)).await;
        token.cancel();

        assert_eq!(handle.await.unwrap(), PollOutcome::Cancelled);
        assert_eq!(api.status_calls().len(), 2);
    }
}
