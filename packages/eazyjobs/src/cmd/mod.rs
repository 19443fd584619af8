//! Command implementations

pub mod auth;
pub mod results;
pub mod saved;
pub mod scrape;

use chrono::{DateTime, Utc};
use scraper_client::ScrapeResult;

/// Short date for list output; falls back to the raw server string.
pub fn display_date(result: &ScrapeResult) -> String {
    result
        .parsed_timestamp()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| result.timestamp.clone())
}

pub fn display_saved_at(saved_at: &DateTime<Utc>) -> String {
    saved_at.format("%Y-%m-%d %H:%M").to_string()
}
