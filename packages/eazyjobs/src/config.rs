use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use scraper_client::DEFAULT_BASE_URL;

use crate::dashboard::{DashboardConfig, DEFAULT_TARGET_POSTS};
use crate::poller::{PollConfig, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    pub default_target_posts: u32,
    pub reject_duplicate_submissions: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Unset variables take defaults;
    /// malformed ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = match lookup("EAZYJOBS_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self {
            api_url: lookup("EAZYJOBS_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            data_dir,
            poll_interval: millis(&lookup, "EAZYJOBS_POLL_INTERVAL_MS")?
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            poll_timeout: millis(&lookup, "EAZYJOBS_POLL_TIMEOUT_MS")?
                .unwrap_or(DEFAULT_POLL_TIMEOUT),
            default_target_posts: lookup("EAZYJOBS_TARGET_POSTS")
                .map(|v| v.parse())
                .transpose()
                .context("EAZYJOBS_TARGET_POSTS must be a valid number")?
                .unwrap_or(DEFAULT_TARGET_POSTS),
            reject_duplicate_submissions: lookup("EAZYJOBS_REJECT_DUPLICATES")
                .map(|v| parse_flag(&v))
                .transpose()
                .context("EAZYJOBS_REJECT_DUPLICATES must be true or false")?
                .unwrap_or(false),
        })
    }

    pub fn dashboard(&self) -> DashboardConfig {
        DashboardConfig {
            poll: PollConfig {
                interval: self.poll_interval,
                timeout: self.poll_timeout,
            },
            reject_duplicate_submissions: self.reject_duplicate_submissions,
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|d| d.join("eazyjobs"))
        .context("No local data directory; set EAZYJOBS_DATA_DIR")
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<Duration>> {
    lookup(name)
        .map(|v| {
            v.parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| format!("{name} must be a number of milliseconds"))
        })
        .transpose()
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("invalid flag value '{other}'"),
    }
}
