//! Saved job links, kept locally and independent of server-side results.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{KeyValueStore, Result, SAVED_JOBS_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJob {
    pub id: Uuid,
    pub url: String,
    pub keyword: String,
    pub saved_at: DateTime<Utc>,
}

/// Ordered saved-job collection, written through to the store on every change.
pub struct SavedJobs {
    store: Arc<dyn KeyValueStore>,
    jobs: Vec<SavedJob>,
}

impl SavedJobs {
    /// Load the persisted list. A corrupt list is an error, not an empty list.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let jobs: Vec<SavedJob> = store.get_json(SAVED_JOBS_KEY)?.unwrap_or_default();
        tracing::debug!(count = jobs.len(), "Loaded saved jobs");
        Ok(Self { store, jobs })
    }

    pub fn jobs(&self) -> &[SavedJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&SavedJob> {
        self.jobs.iter().find(|job| job.id == id)
    }

    /// Append one entry per link, in link order. Saving the same links again
    /// appends duplicates with fresh ids.
    pub fn append_links(&mut self, keyword: &str, links: &[String]) -> Result<Vec<SavedJob>> {
        let saved_at = Utc::now();
        let added: Vec<SavedJob> = links
            .iter()
            .map(|url| SavedJob {
                id: Uuid::new_v4(),
                url: url.clone(),
                keyword: keyword.to_string(),
                saved_at,
            })
            .collect();

        let mut updated = self.jobs.clone();
        updated.extend(added.iter().cloned());
        self.persist(updated)?;
        Ok(added)
    }

    /// Remove the entry with `id`. Returns `None`, and writes nothing, if no
    /// entry has that id.
    pub fn remove(&mut self, id: Uuid) -> Result<Option<SavedJob>> {
        let Some(pos) = self.jobs.iter().position(|job| job.id == id) else {
            return Ok(None);
        };

        let mut updated = self.jobs.clone();
        let removed = updated.remove(pos);
        self.persist(updated)?;
        Ok(Some(removed))
    }

    // In-memory list only changes once the store accepted the write.
    fn persist(&mut self, jobs: Vec<SavedJob>) -> Result<()> {
        self.store.set_json(SAVED_JOBS_KEY, &jobs)?;
        self.jobs = jobs;
        Ok(())
    }
}
