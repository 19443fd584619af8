//! Submission, polling and reconciliation against a scripted service.

mod common;

use std::time::Duration;

use common::{error, success, Harness, LINKS};
use eazyjobs::testing::{ApiCall, Endpoint, MockScraperApi};
use eazyjobs::{
    DashboardConfig, DashboardError, DashboardEvent, PollOutcome, ResultBadge,
};
use scraper_client::{JobStatus, StartScrapeResponse};

fn rejected(message: Option<&str>) -> StartScrapeResponse {
    StartScrapeResponse {
        success: false,
        message: message.map(str::to_string),
        status: None,
        keyword: None,
        target_posts: None,
    }
}

fn poll_outcomes(events: &[DashboardEvent], keyword: &str) -> Vec<PollOutcome> {
    events
        .iter()
        .filter_map(|e| e.poll_outcome_for(keyword).cloned())
        .collect()
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn blank_keyword_is_rejected_without_any_request() {
    let mut h = Harness::new(MockScraperApi::new());

    let err = h.dashboard.submit("   ", 50).await.unwrap_err();

    assert!(matches!(err, DashboardError::EmptyKeyword));
    assert!(h.api.calls().is_empty());
    assert_eq!(h.notifications(), vec![error("Please enter a keyword")]);
}

#[tokio::test(start_paused = true)]
async fn target_posts_out_of_range_is_rejected() {
    let mut h = Harness::new(MockScraperApi::new());

    assert!(matches!(
        h.dashboard.submit("rust", 0).await,
        Err(DashboardError::InvalidTargetPosts(0))
    ));
    assert!(matches!(
        h.dashboard.submit("rust", 201).await,
        Err(DashboardError::InvalidTargetPosts(201))
    ));
    assert!(h.api.calls().is_empty());
    assert_eq!(h.notifications().len(), 2);
}

// =============================================================================
// Submission and polling
// =============================================================================

#[tokio::test(start_paused = true)]
async fn completed_scrape_reloads_results_and_stats() {
    let mut h = Harness::new(
        MockScraperApi::new()
            .with_status(JobStatus::InProgress)
            .with_status(JobStatus::Completed),
    );

    let handle = h.dashboard.submit("  Rust ", 50).await.unwrap();
    assert_eq!(handle.keyword(), "Rust");
    assert_eq!(h.dashboard.in_flight().await, vec!["rust"]);

    // The service finishes the job while we poll.
    h.api.insert_result("rust", &LINKS[..3]);

    assert_eq!(handle.wait().await, PollOutcome::Completed);

    let request = &h.api.start_calls()[0];
    assert_eq!(request.input_keyword, "Rust");
    assert_eq!(request.target_posts, 50);
    assert!(request.headless);

    assert_eq!(h.api.status_calls(), vec!["rust", "rust"]);
    assert_eq!(h.api.list_results_calls(), 1);
    // Once after submission, once after completion.
    assert_eq!(h.api.health_calls(), 2);

    let events = h.events();
    let notifications: Vec<_> = events
        .iter()
        .filter_map(|e| e.as_notification().cloned())
        .collect();
    assert_eq!(
        notifications,
        vec![
            success("Scraping started for \"Rust\""),
            success("Scraping completed for \"Rust\""),
        ]
    );
    assert_eq!(poll_outcomes(&events, "rust"), vec![PollOutcome::Completed]);
    assert!(events.contains(&DashboardEvent::ScrapeStarted {
        keyword: "Rust".to_string()
    }));

    let stats = h.dashboard.stats().await;
    assert_eq!(stats.total_scrapes, 1);
    assert_eq!(stats.total_jobs, 3);
    assert_eq!(h.dashboard.badge("RUST").await, ResultBadge::Completed);
    assert!(h.dashboard.in_flight().await.is_empty());

    // No polling after the terminal status.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.api.status_calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_scrape_notifies_without_reloading() {
    let mut h = Harness::new(MockScraperApi::new().with_status(JobStatus::Failed));

    let handle = h.dashboard.submit("go", 10).await.unwrap();
    assert_eq!(handle.wait().await, PollOutcome::Failed);

    assert_eq!(
        h.notifications(),
        vec![
            success("Scraping started for \"go\""),
            error("Scraping failed for \"go\""),
        ]
    );
    assert_eq!(h.api.list_results_calls(), 0);
    assert_eq!(h.api.health_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn polling_gives_up_at_the_ceiling_silently() {
    let mut h = Harness::new(MockScraperApi::new());
    let start = tokio::time::Instant::now();

    let handle = h.dashboard.submit("forever", 50).await.unwrap();
    assert_eq!(handle.wait().await, PollOutcome::TimedOut);

    assert!(start.elapsed() >= Duration::from_secs(300));
    let events = h.events();
    let notifications: Vec<_> = events
        .iter()
        .filter_map(|e| e.as_notification().cloned())
        .collect();
    assert_eq!(notifications, vec![success("Scraping started for \"forever\"")]);
    assert_eq!(
        poll_outcomes(&events, "forever"),
        vec![PollOutcome::TimedOut]
    );
    assert_eq!(h.api.list_results_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn status_request_error_stops_polling_without_notification() {
    let mut h = Harness::new(
        MockScraperApi::new()
            .with_status(JobStatus::InProgress)
            .with_status_error("connection refused"),
    );

    let handle = h.dashboard.submit("rust", 50).await.unwrap();
    let outcome = handle.wait().await;

    assert!(matches!(outcome, PollOutcome::TransportError(_)));
    assert_eq!(h.api.status_calls().len(), 2);
    assert_eq!(
        h.notifications(),
        vec![success("Scraping started for \"rust\"")]
    );
}

#[tokio::test(start_paused = true)]
async fn unknown_status_keeps_polling() {
    let h = Harness::new(
        MockScraperApi::new()
            .with_status(JobStatus::NotFound)
            .with_status(JobStatus::Other("queued".to_string()))
            .with_status(JobStatus::Completed),
    );

    let handle = h.dashboard.submit("rust", 50).await.unwrap();

    assert_eq!(handle.wait().await, PollOutcome::Completed);
    assert_eq!(h.api.status_calls().len(), 3);
}

// =============================================================================
// Start failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn server_refusal_surfaces_its_message() {
    let mut h = Harness::new(
        MockScraperApi::new()
            .with_start_response(rejected(Some("Already scraping keyword: rust"))),
    );

    let err = h.dashboard.submit("rust", 50).await.unwrap_err();

    assert!(matches!(err, DashboardError::Rejected(ref m) if m == "Already scraping keyword: rust"));
    assert_eq!(
        h.notifications(),
        vec![error("Already scraping keyword: rust")]
    );
    assert!(h.api.status_calls().is_empty());
    assert!(h.dashboard.in_flight().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn server_refusal_without_message_uses_fallback() {
    let mut h = Harness::new(MockScraperApi::new().with_start_response(rejected(None)));

    assert!(h.dashboard.submit("rust", 50).await.is_err());
    assert_eq!(h.notifications(), vec![error("Failed to start scraping")]);
}

#[tokio::test(start_paused = true)]
async fn unreachable_service_on_submit() {
    let mut h = Harness::new(MockScraperApi::new().failing(Endpoint::StartScrape));

    let err = h.dashboard.submit("rust", 50).await.unwrap_err();

    assert!(matches!(err, DashboardError::Api(_)));
    assert_eq!(h.notifications(), vec![error("Failed to start scraping")]);
    assert!(h.api.status_calls().is_empty());
    assert!(h.dashboard.in_flight().await.is_empty());
}

// =============================================================================
// Duplicate submissions
// =============================================================================

#[tokio::test(start_paused = true)]
async fn duplicate_submissions_run_independent_pollers_by_default() {
    let h = Harness::new(MockScraperApi::new());

    let first = h.dashboard.submit("rust", 50).await.unwrap();
    let second = h.dashboard.submit("Rust", 50).await.unwrap();

    assert_eq!(h.api.start_calls().len(), 2);
    assert_eq!(h.dashboard.in_flight().await, vec!["rust"]);

    h.dashboard.cancel_all();
    assert_eq!(first.wait().await, PollOutcome::Cancelled);
    assert_eq!(second.wait().await, PollOutcome::Cancelled);
    assert!(h.dashboard.in_flight().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn duplicate_submissions_can_be_refused() {
    let config = DashboardConfig {
        reject_duplicate_submissions: true,
        ..Default::default()
    };
    let mut h = Harness::with_config(
        MockScraperApi::new().with_status(JobStatus::Completed),
        config,
    );

    let first = h.dashboard.submit("rust", 50).await.unwrap();
    let err = h.dashboard.submit(" RUST ", 50).await.unwrap_err();
    assert!(matches!(err, DashboardError::AlreadyInFlight(_)));
    assert_eq!(h.api.start_calls().len(), 1);

    assert_eq!(first.wait().await, PollOutcome::Completed);
    h.events();

    // Free again once the first poller is done.
    let again = h.dashboard.submit("rust", 50).await.unwrap();
    assert_eq!(h.api.start_calls().len(), 2);
    again.cancel();
    assert_eq!(again.wait().await, PollOutcome::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn cancel_all_stops_every_poller() {
    let mut h = Harness::new(MockScraperApi::new());

    let rust = h.dashboard.submit("rust", 50).await.unwrap();
    let go = h.dashboard.submit("go", 50).await.unwrap();
    tokio::time::sleep(Duration::from_secs(4)).await;

    h.dashboard.cancel_all();

    assert_eq!(rust.wait().await, PollOutcome::Cancelled);
    assert_eq!(go.wait().await, PollOutcome::Cancelled);
    let events = h.events();
    assert_eq!(poll_outcomes(&events, "rust"), vec![PollOutcome::Cancelled]);
    assert_eq!(poll_outcomes(&events, "go"), vec![PollOutcome::Cancelled]);
    assert_eq!(
        events.iter().filter(|e| e.as_notification().is_some()).count(),
        2
    );
}

// =============================================================================
// Results
// =============================================================================

#[tokio::test]
async fn refresh_loads_results_and_badges() {
    let h = Harness::new(
        MockScraperApi::new()
            .with_result("rust", &LINKS[..2])
            .with_failed_result("cobol", "No posts found")
            .with_active_tasks(1),
    );

    h.dashboard.refresh().await;

    let results = h.dashboard.results().await;
    assert_eq!(results.len(), 2);
    assert_eq!(h.dashboard.badge("rust").await, ResultBadge::Completed);
    assert_eq!(h.dashboard.badge("cobol").await, ResultBadge::Failed);
    assert_eq!(h.dashboard.badge("python").await, ResultBadge::InProgress);

    let stats = h.dashboard.stats().await;
    assert_eq!(stats.total_scrapes, 2);
    assert_eq!(stats.total_jobs, 2);
    assert_eq!(stats.active_scraping_tasks, 1);
}

#[tokio::test]
async fn failed_reload_keeps_previous_results() {
    let h = Harness::new(MockScraperApi::new().with_result("rust", &LINKS[..2]));
    h.dashboard.refresh().await;

    h.api.set_failing(Endpoint::ListResults);
    h.api.insert_result("go", &LINKS[..1]);

    assert!(h.dashboard.load_results().await.is_err());
    let results = h.dashboard.results().await;
    assert_eq!(results.keys().collect::<Vec<_>>(), vec!["rust"]);
}

#[tokio::test]
async fn view_result_previews_five_links() {
    let mut h = Harness::new(MockScraperApi::new().with_result("rust", &LINKS));

    let view = h.dashboard.view_result("rust").await.unwrap();

    assert_eq!(view.total_posts, 7);
    assert_eq!(view.links, LINKS[..5].to_vec());
    assert_eq!(h.notifications(), vec![success("Found 7 jobs for \"rust\"")]);
    assert_eq!(h.api.calls(), vec![ApiCall::GetResult("rust".to_string())]);
}

#[tokio::test]
async fn view_missing_result_reports_failure() {
    let mut h = Harness::new(MockScraperApi::new());

    let err = h.dashboard.view_result("haskell").await.unwrap_err();

    assert!(matches!(err, DashboardError::Api(ref e) if e.is_not_found()));
    assert_eq!(h.notifications(), vec![error("Failed to load results")]);
}

#[tokio::test]
async fn blank_keyword_is_never_viewed_or_deleted() {
    let mut h = Harness::new(MockScraperApi::new().with_result("rust", &LINKS[..2]));
    h.dashboard.refresh().await;
    h.events();

    assert!(matches!(
        h.dashboard.view_result("   ").await,
        Err(DashboardError::EmptyKeyword)
    ));
    assert!(matches!(
        h.dashboard.delete_result("").await,
        Err(DashboardError::EmptyKeyword)
    ));
    assert!(matches!(
        h.dashboard.save_links(" ").await,
        Err(DashboardError::EmptyKeyword)
    ));

    let calls = h.api.calls();
    assert!(!calls
        .iter()
        .any(|c| matches!(c, ApiCall::GetResult(_) | ApiCall::DeleteResult(_))));
    assert_eq!(h.api.list_results_calls(), 1);
    assert_eq!(
        h.notifications(),
        vec![error("Please enter a keyword"); 3]
    );
    assert_eq!(h.dashboard.results().await.len(), 1);
}

#[tokio::test]
async fn delete_result_reloads_everything() {
    let mut h = Harness::new(
        MockScraperApi::new()
            .with_result("rust", &LINKS[..2])
            .with_result("go", &LINKS[..1]),
    );
    h.dashboard.refresh().await;
    h.events();

    h.dashboard.delete_result("rust").await.unwrap();

    assert_eq!(h.notifications(), vec![success("Deleted results for \"rust\"")]);
    assert_eq!(h.api.list_results_calls(), 2);
    let results = h.dashboard.results().await;
    assert_eq!(results.keys().collect::<Vec<_>>(), vec!["go"]);
    assert_eq!(h.dashboard.stats().await.total_jobs, 1);
}

#[tokio::test]
async fn delete_failure_leaves_results_alone() {
    let mut h = Harness::new(
        MockScraperApi::new()
            .with_result("rust", &LINKS[..2])
            .failing(Endpoint::DeleteResult),
    );
    h.dashboard.refresh().await;
    h.events();

    assert!(h.dashboard.delete_result("rust").await.is_err());

    assert_eq!(h.notifications(), vec![error("Failed to delete results")]);
    assert_eq!(h.api.list_results_calls(), 1);
    assert_eq!(h.dashboard.results().await.len(), 1);
}
