//! EazyJobs dashboard core.
//!
//! Session handling, the login gate, saved job links and the
//! submit / poll / reconcile state machine that drives scrapes on the
//! external scraping service. The `eazyjobs` binary is a thin CLI over this
//! library.

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod events;
pub mod guard;
pub mod poller;
pub mod saved;
pub mod stats;
pub mod storage;
pub mod testing;

pub use api::BaseScraperApi;
pub use auth::{AuthRecord, AuthSession, User};
pub use config::Config;
pub use dashboard::{
    Dashboard, DashboardConfig, DashboardError, PollHandle, ResultBadge, ResultView,
};
pub use events::{DashboardEvent, EventSink, Level, Notification};
pub use guard::{guard, Admission, Route};
pub use poller::{PollConfig, PollOutcome, StatusPoller};
pub use saved::{SavedJob, SavedJobs};
pub use stats::Stats;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
