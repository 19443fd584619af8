//! Shared harness for dashboard tests.
#![allow(dead_code)]

use std::sync::Arc;

use eazyjobs::testing::MockScraperApi;
use eazyjobs::{
    Dashboard, DashboardConfig, DashboardEvent, EventSink, KeyValueStore, Level, MemoryStore,
    Notification, SavedJobs,
};
use tokio::sync::mpsc::UnboundedReceiver;

pub struct Harness {
    pub api: Arc<MockScraperApi>,
    pub store: Arc<MemoryStore>,
    pub dashboard: Dashboard,
    rx: UnboundedReceiver<DashboardEvent>,
}

impl Harness {
    pub fn new(api: MockScraperApi) -> Self {
        Self::with_config(api, DashboardConfig::default())
    }

    pub fn with_config(api: MockScraperApi, config: DashboardConfig) -> Self {
        Self::with_store(api, config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(api: MockScraperApi, config: DashboardConfig, store: Arc<MemoryStore>) -> Self {
        let api = Arc::new(api);
        let saved = SavedJobs::load(store.clone()).expect("load saved jobs");
        let (events, rx) = EventSink::channel();
        let dashboard = Dashboard::new(api.clone(), saved, config, events);
        Self {
            api,
            store,
            dashboard,
            rx,
        }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    /// Everything published so far.
    pub fn events(&mut self) -> Vec<DashboardEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn notifications(&mut self) -> Vec<Notification> {
        self.events()
            .iter()
            .filter_map(|e| e.as_notification().cloned())
            .collect()
    }
}

pub fn success(message: &str) -> Notification {
    Notification {
        level: Level::Success,
        message: message.to_string(),
    }
}

pub fn error(message: &str) -> Notification {
    Notification {
        level: Level::Error,
        message: message.to_string(),
    }
}

pub const LINKS: [&str; 7] = [
    "https://jobs.example/post/1",
    "https://jobs.example/post/2",
    "https://jobs.example/post/3",
    "https://jobs.example/post/4",
    "https://jobs.example/post/5",
    "https://jobs.example/post/6",
    "https://jobs.example/post/7",
];
