//! End-to-end cache behaviour through the public API
//!
//! Drives the app shell and the dispatcher against a mock backend and checks
//! what ends up in, and drops out of, the response cache.

use std::sync::Arc;

use grok_sdr::app::App;
use grok_sdr::cache::{CacheManager, CachedResource, FileStorage, ManualClock, MemoryStorage};
use grok_sdr::data::{ApiClient, DashboardData, EvaluationReport, LeadDraft, Stage};
use grok_sdr::dispatch::{Dispatcher, Request};
use grok_sdr::settings::SettingsStore;
use grok_sdr::views::{ActiveView, Screen};
use tempfile::TempDir;

const START_MILLIS: i64 = 1_700_000_000_000;

const DASHBOARD_JSON: &str = r#"{
    "metrics": {"total_leads": 247, "qualified_leads": 89, "messages_sent": 1342, "meetings_booked": 34},
    "pipeline": [{"name": "New", "count": 40}],
    "recent_activities": []
}"#;

fn session_cache() -> CacheManager {
    CacheManager::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(ManualClock::new(START_MILLIS)),
    )
}

fn app(cache: CacheManager, initial: Screen) -> App {
    App::new(
        cache,
        SettingsStore::new(Arc::new(MemoryStorage::new())),
        initial,
    )
}

fn dispatcher_for(server: &mockito::Server) -> Dispatcher {
    Dispatcher::new(ApiClient::with_client(reqwest::Client::new(), &server.url()))
}

/// Sends everything the app queued and applies the next completion
async fn round_trip(app: &mut App, dispatcher: &mut Dispatcher) {
    dispatcher.flush(&mut app.outbox);
    let completion = dispatcher.recv().await.expect("completion");
    app.apply(completion);
}

fn draft() -> LeadDraft {
    LeadDraft {
        company: "Acme Corporation".to_string(),
        contact: "John Smith".to_string(),
        email: "john@acme.com".to_string(),
        phone: None,
        stage: Stage::New,
        value: "$0".to_string(),
        industry: None,
        employees: None,
        website: None,
        location: None,
        job_title: None,
        linkedin: None,
        notes: None,
        tags: Vec::new(),
    }
}

#[tokio::test]
async fn test_dashboard_is_fetched_once_then_served_from_cache() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/dashboard")
        .with_status(200)
        .with_body(DASHBOARD_JSON)
        .expect(1)
        .create_async()
        .await;
    let mut dispatcher = dispatcher_for(&server);
    let mut app = app(session_cache(), Screen::Dashboard);

    round_trip(&mut app, &mut dispatcher).await;

    let cached: Option<DashboardData> = app.cache.get_resource(CachedResource::Dashboard);
    assert_eq!(cached.map(|d| d.metrics.total_leads), Some(247));

    app.navigate(Screen::Settings, None);
    app.navigate(Screen::Dashboard, None);

    assert!(app.outbox.queued().is_empty(), "cache hit should not refetch");
    match &app.view {
        ActiveView::Dashboard(view) => {
            assert_eq!(view.data.data.as_ref().map(|d| d.metrics.meetings_booked), Some(34))
        }
        _ => panic!("dashboard not mounted"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_created_lead_invalidates_dashboard_and_starts_enrichment() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/leads")
        .with_status(200)
        .with_body(
            r#"{"id": "42", "company": "Acme Corporation", "contact": "John Smith",
                "email": "john@acme.com", "updated_at": "2025-01-01T10:00:00"}"#,
        )
        .create_async()
        .await;
    let mut dispatcher = dispatcher_for(&server);
    let cache = session_cache();
    cache
        .set("dashboard_data", &serde_json::json!({"metrics": {"total_leads": 1}}))
        .unwrap();
    let mut app = app(cache, Screen::Leads);
    let _ = app.outbox.drain();

    app.outbox.send(Request::CreateLead(draft()));
    round_trip(&mut app, &mut dispatcher).await;

    assert!(app
        .cache
        .get_resource::<DashboardData>(CachedResource::Dashboard)
        .is_none());
    assert_eq!(app.pollers.len(), 1);
    assert_eq!(app.pollers[0].lead_id(), "42");
    assert_eq!(
        app.status.as_deref(),
        Some("Lead created. Enriching Acme Corporation...")
    );
}

#[tokio::test]
async fn test_failed_delete_keeps_cached_dashboard() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/leads/9")
        .with_status(404)
        .with_body(r#"{"detail": "Lead not found"}"#)
        .create_async()
        .await;
    let mut dispatcher = dispatcher_for(&server);
    let cache = session_cache();
    cache
        .set("dashboard_data", &serde_json::json!({"metrics": {"total_leads": 3}}))
        .unwrap();
    let mut app = app(cache, Screen::Settings);

    app.outbox.send(Request::DeleteLead("9".to_string()));
    round_trip(&mut app, &mut dispatcher).await;

    let cached: Option<DashboardData> = app.cache.get_resource(CachedResource::Dashboard);
    assert_eq!(cached.map(|d| d.metrics.total_leads), Some(3));
}

#[test]
fn test_persistent_cache_survives_restart_until_cleared() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(START_MILLIS));
    let report: EvaluationReport = serde_json::from_str(
        r#"{"results": {"grok-3": {"accuracy": 94.2, "failure_rate": 2.1, "avg_latency": 1.8}}}"#,
    )
    .unwrap();

    let first_run = CacheManager::new(
        Arc::new(FileStorage::new(temp_dir.path().to_path_buf())),
        clock.clone(),
    );
    first_run
        .set_resource(CachedResource::ModelEvaluation, &report)
        .unwrap();
    drop(first_run);

    let second_run = CacheManager::new(
        Arc::new(FileStorage::new(temp_dir.path().to_path_buf())),
        clock,
    );
    let app = app(second_run, Screen::Evaluation);

    match &app.view {
        ActiveView::Evaluation(view) => {
            assert_eq!(view.report.data.as_ref(), Some(&report));
            assert!(!view.report.is_loading());
        }
        _ => panic!("evaluation not mounted"),
    }
    assert!(app.outbox.queued().is_empty());

    app.cache.clear(None).unwrap();
    assert!(app
        .cache
        .get_resource::<EvaluationReport>(CachedResource::ModelEvaluation)
        .is_none());
}
