//! Events the dashboard publishes for whatever is rendering it.

use scraper_client::normalize_keyword;
use tokio::sync::mpsc;

use crate::poller::PollOutcome;
use crate::stats::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// A user-facing toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    Notify(Notification),
    ScrapeStarted { keyword: String },
    /// Exactly one per poller, whatever ended it.
    PollFinished { keyword: String, outcome: PollOutcome },
    ResultsLoaded { count: usize },
    StatsUpdated(Stats),
}

impl DashboardEvent {
    pub fn as_notification(&self) -> Option<&Notification> {
        match self {
            DashboardEvent::Notify(n) => Some(n),
            _ => None,
        }
    }

    /// Poll outcome for `keyword`, compared on the normalized job key.
    pub fn poll_outcome_for(&self, keyword: &str) -> Option<&PollOutcome> {
        match self {
            DashboardEvent::PollFinished { keyword: k, outcome }
                if normalize_keyword(k) == normalize_keyword(keyword) =>
            {
                Some(outcome)
            }
            _ => None,
        }
    }
}

/// Sending half of the dashboard event stream.
///
/// Events are dropped once the receiver is gone; the dashboard keeps working
/// headless.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<DashboardEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DashboardEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: DashboardEvent) {
        let _ = self.tx.send(event);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Level::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Level::Error, message);
    }

    fn notify(&self, level: Level, message: impl Into<String>) {
        self.emit(DashboardEvent::Notify(Notification {
            level,
            message: message.into(),
        }));
    }
}
