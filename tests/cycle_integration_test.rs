use chrono::{DateTime, Duration as ChronoDuration, Offset, TimeZone, Utc};
use contest_notifier::core::clock::FixedClock;
use contest_notifier::domain::ports::SeenStore;
use contest_notifier::{
    CycleOrchestrator, FeedClient, FeedFormat, JsonFileStore, Notifier, NotifierError, WebhookChannel, WebhookStyle,
};
use httpmock::prelude::*;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

/// Collects formatted log lines so tests can assert on them.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap()
}

fn kenkoooo_entry(id: &str, title: &str, starts_in: ChronoDuration) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "start_epoch_second": (now() + starts_in).timestamp(),
        "duration_second": 6000,
        "title": title,
        "rate_change": " ~ 1999"
    })
}

fn feed_body() -> serde_json::Value {
    serde_json::json!([
        kenkoooo_entry("abc405", "AtCoder Beginner Contest 405", ChronoDuration::days(-7)),
        kenkoooo_entry("arc199", "AtCoder Regular Contest 199", ChronoDuration::days(2)),
        kenkoooo_entry("abc407", "AtCoder Beginner Contest 407", ChronoDuration::hours(9)),
    ])
}

fn orchestrator(
    feed_url: String,
    hook_url: String,
    state: &std::path::Path,
) -> CycleOrchestrator<FeedClient, JsonFileStore, WebhookChannel, FixedClock> {
    let feed = FeedClient::new(feed_url, FeedFormat::KenkooooV1, Duration::from_secs(5)).unwrap();
    let channel = WebhookChannel::new(hook_url, WebhookStyle::Content);
    CycleOrchestrator::new(
        feed,
        JsonFileStore::new(state),
        Notifier::new(channel, Utc.fix()),
        FixedClock(now()),
    )
}

#[tokio::test]
async fn test_cycle_announces_new_contests_once() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("data/seen_contests.json");

    let feed_server = MockServer::start_async().await;
    let feed_mock = feed_server
        .mock_async(|when, then| {
            when.method(GET).path("/contests.json");
            then.status(200).json_body(feed_body());
        })
        .await;

    let hook_server = MockServer::start_async().await;
    let first = hook_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/hook")
                .body_contains("New contest: AtCoder Beginner Contest 407");
            then.status(204);
        })
        .await;
    let second = hook_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/hook")
                .body_contains("New contest: AtCoder Regular Contest 199");
            then.status(204);
        })
        .await;

    let mut orch = orchestrator(feed_server.url("/contests.json"), hook_server.url("/hook"), &state_path);

    let report = orch.run_cycle().await.unwrap();
    assert_eq!(report.fetched, 3);
    assert_eq!(report.upcoming, 2);
    assert_eq!(report.notified, vec!["abc407".to_string(), "arc199".to_string()]);
    assert!(report.persisted);
    first.assert_hits_async(1).await;
    second.assert_hits_async(1).await;

    let saved = JsonFileStore::new(&state_path).load().await.unwrap();
    assert_eq!(saved.ids().collect::<Vec<_>>(), vec!["abc407", "arc199"]);

    let report = orch.run_cycle().await.unwrap();
    assert!(report.notified.is_empty());
    assert!(!report.persisted);
    first.assert_hits_async(1).await;
    second.assert_hits_async(1).await;
    feed_mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_feed_outage_leaves_state_untouched() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("seen.json");
    let original = r#"{"version":1,"contests":{}}"#;
    std::fs::write(&state_path, original).unwrap();

    let feed_server = MockServer::start_async().await;
    feed_server
        .mock_async(|when, then| {
            when.method(GET).path("/contests.json");
            then.status(502);
        })
        .await;
    let hook_server = MockServer::start_async().await;
    let hook = hook_server
        .mock_async(|when, then| {
            when.method(POST).path("/hook");
            then.status(204);
        })
        .await;

    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::ERROR)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut orch = orchestrator(feed_server.url("/contests.json"), hook_server.url("/hook"), &state_path);
    let err = orch.run_cycle().await.unwrap_err();

    let errors: Vec<String> = logs.lines().into_iter().filter(|l| l.contains("ERROR")).collect();
    assert_eq!(errors.len(), 1, "expected one error event, got {:?}", errors);
    assert!(errors[0].contains("502"));

    assert_eq!(
        err.user_friendly_message(),
        "❌ Error fetching contest information. Please try again later."
    );
    assert!(matches!(err, NotifierError::Fetch(_)));
    hook.assert_hits_async(0).await;
    assert_eq!(std::fs::read_to_string(&state_path).unwrap(), original);
}

#[tokio::test]
async fn test_rejected_announcement_is_retried_next_cycle() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("seen.json");

    let feed_server = MockServer::start_async().await;
    feed_server
        .mock_async(|when, then| {
            when.method(GET).path("/contests.json");
            then.status(200).json_body(feed_body());
        })
        .await;

    let hook_server = MockServer::start_async().await;
    let mut rejecting = hook_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/hook")
                .body_contains("AtCoder Regular Contest 199");
            then.status(429).body("rate limited");
        })
        .await;
    let accepting = hook_server
        .mock_async(|when, then| {
            when.method(POST).path("/hook");
            then.status(204);
        })
        .await;

    let mut orch = orchestrator(feed_server.url("/contests.json"), hook_server.url("/hook"), &state_path);

    let report = orch.run_cycle().await.unwrap();
    assert_eq!(report.notified, vec!["abc407".to_string()]);
    assert_eq!(report.failed, vec!["arc199".to_string()]);
    let saved = JsonFileStore::new(&state_path).load().await.unwrap();
    assert!(saved.contains("abc407"));
    assert!(!saved.contains("arc199"));

    rejecting.delete_async().await;
    let report = orch.run_cycle().await.unwrap();
    assert_eq!(report.notified, vec!["arc199".to_string()]);
    assert!(report.failed.is_empty());
    accepting.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_corrupt_state_aborts_before_any_delivery() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("seen.json");
    std::fs::write(&state_path, "not json").unwrap();

    let feed_server = MockServer::start_async().await;
    let feed_mock = feed_server
        .mock_async(|when, then| {
            when.method(GET).path("/contests.json");
            then.status(200).json_body(feed_body());
        })
        .await;
    let hook_server = MockServer::start_async().await;
    let hook = hook_server
        .mock_async(|when, then| {
            when.method(POST).path("/hook");
            then.status(204);
        })
        .await;

    let mut orch = orchestrator(feed_server.url("/contests.json"), hook_server.url("/hook"), &state_path);
    let err = orch.run_cycle().await.unwrap_err();

    assert!(matches!(err, NotifierError::Load(_)));
    feed_mock.assert_hits_async(0).await;
    hook.assert_hits_async(0).await;
    assert_eq!(std::fs::read_to_string(&state_path).unwrap(), "not json");
}
