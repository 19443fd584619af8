use std::collections::BTreeMap;

use scraper_client::{HealthResponse, ScrapeResult};
use serde::Serialize;

/// Dashboard counters. Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_scrapes: usize,
    pub total_jobs: u64,
    pub saved_jobs: usize,
    pub active_scraping_tasks: u64,
}

impl Stats {
    pub fn derive(
        results: &BTreeMap<String, ScrapeResult>,
        health: &HealthResponse,
        saved_jobs: usize,
    ) -> Self {
        Self {
            total_scrapes: results.len(),
            total_jobs: results.values().map(|r| r.total_posts).sum(),
            saved_jobs,
            active_scraping_tasks: health.active_scraping_tasks,
        }
    }
}
