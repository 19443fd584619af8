//! Application context with shared state and output helpers

use std::fmt::Display;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use eazyjobs::storage::AUTH_KEY;
use eazyjobs::{
    guard, Admission, AuthSession, Config, Dashboard, DashboardEvent, EventSink, FileStore,
    KeyValueStore, Level, PollOutcome, SavedJobs, User,
};
use scraper_client::ScraperClient;
use tokio::sync::mpsc::UnboundedReceiver;

/// Application context passed to all commands
pub struct AppContext {
    pub config: Config,
    pub quiet: bool,
    store: Arc<dyn KeyValueStore>,
}

impl AppContext {
    pub fn new(config: Config, quiet: bool) -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.data_dir));
        Self {
            config,
            quiet,
            store,
        }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub fn session(&self) -> Result<AuthSession> {
        AuthSession::init(self.store()).with_context(|| {
            format!(
                "Could not read the saved session in {}; `eazyjobs logout` clears it",
                self.config.data_dir.display()
            )
        })
    }

    /// Remove the persisted session even when it can't be parsed.
    pub fn clear_session(&self) -> Result<()> {
        match self.session() {
            Ok(mut session) => session.logout()?,
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "Discarding unreadable session");
                self.store.remove(AUTH_KEY)?;
            }
        }
        Ok(())
    }

    /// The signed-in user, or an error pointing at the login command.
    pub fn require_user(&self) -> Result<User> {
        let session = self.session()?;
        match guard(&session, |user| user.clone()) {
            Admission::Granted(user) => Ok(user),
            Admission::Redirect(route) => {
                anyhow::bail!("Not logged in ({route}). Run `eazyjobs login` first.")
            }
        }
    }

    pub fn client(&self) -> Result<ScraperClient> {
        ScraperClient::new(&self.config.api_url)
            .with_context(|| format!("Invalid API URL: {}", self.config.api_url))
    }

    /// Build a dashboard for the signed-in user.
    pub fn dashboard(&self) -> Result<(Dashboard, UnboundedReceiver<DashboardEvent>)> {
        self.require_user()?;
        let client = self.client()?;
        let saved = SavedJobs::load(self.store()).with_context(|| {
            format!(
                "Could not read saved jobs in {}",
                self.config.data_dir.display()
            )
        })?;
        let (events, rx) = EventSink::channel();
        let dashboard = Dashboard::new(Arc::new(client), saved, self.config.dashboard(), events);
        Ok((dashboard, rx))
    }

    /// Print every event already queued.
    pub fn flush_events(&self, rx: &mut UnboundedReceiver<DashboardEvent>) {
        while let Ok(event) = rx.try_recv() {
            render_event(self.quiet, &event);
        }
    }

    pub fn print_header(&self, msg: impl Display) {
        if !self.quiet {
            println!();
            println!("{}", style(msg).bold());
        }
    }

    pub fn print_success(&self, msg: impl Display) {
        if !self.quiet {
            println!("{}", style(msg).green());
        }
    }

    pub fn print_warning(&self, msg: impl Display) {
        if !self.quiet {
            println!("{}", style(msg).yellow());
        }
    }

    pub fn print_info(&self, msg: impl Display) {
        if !self.quiet {
            println!("{}", style(msg).cyan());
        }
    }
}

/// Print notifications; other events are only traced.
pub fn render_event(quiet: bool, event: &DashboardEvent) {
    match event {
        DashboardEvent::Notify(n) => {
            if quiet && n.level != Level::Error {
                return;
            }
            match n.level {
                Level::Success => println!("{} {}", style("✓").green(), n.message),
                Level::Error => eprintln!("{} {}", style("✗").red(), n.message),
            }
        }
        DashboardEvent::PollFinished { keyword, outcome } => {
            tracing::debug!(keyword = %keyword, outcome = outcome.label(), "Poll finished");
            if *outcome == PollOutcome::TimedOut && !quiet {
                println!(
                    "{} Stopped polling \"{}\" without a final status",
                    style("!").yellow(),
                    keyword
                );
            }
        }
        other => tracing::trace!(event = ?other, "Dashboard event"),
    }
}

/// Drain events until every sender is gone.
pub async fn print_events(mut rx: UnboundedReceiver<DashboardEvent>, quiet: bool) {
    while let Some(event) = rx.recv().await {
        render_event(quiet, &event);
    }
}
