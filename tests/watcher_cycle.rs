// tests/watcher_cycle.rs
// Drives single cycles with scripted pollers and a recording notifier.
// No timers, no network.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::anyhow;
use creator_watch::watcher::run_cycle;
use creator_watch::{
    ChannelSnapshot, ContentRef, EventKind, LastSeenState, NotificationEvent, Notifier,
    Platform, PlatformPoller, PollError, StateStore, StatusRegistry,
};

struct ScriptedPoller {
    results: Mutex<VecDeque<Result<ChannelSnapshot, PollError>>>,
}

impl ScriptedPoller {
    fn new(results: Vec<Result<ChannelSnapshot, PollError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
        }
    }
}

#[async_trait::async_trait]
impl PlatformPoller for ScriptedPoller {
    async fn poll(&self) -> Result<ChannelSnapshot, PollError> {
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted poller ran out of results")
    }

    fn platform(&self) -> Platform {
        Platform::YouTube
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<NotificationEvent>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, ev: &NotificationEvent) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(ev.clone());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _ev: &NotificationEvent) -> anyhow::Result<()> {
        Err(anyhow!("permission denied"))
    }
}

fn content(id: &str) -> ContentRef {
    ContentRef {
        id: id.to_string(),
        title: format!("title {id}"),
        url: format!("https://example.com/{id}"),
    }
}

fn upload_snapshot(id: &str) -> ChannelSnapshot {
    ChannelSnapshot {
        latest_upload: Some(content(id)),
        ..Default::default()
    }
}

#[tokio::test]
async fn fetch_failure_leaves_state_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path(), Platform::YouTube);
    let status = StatusRegistry::new();
    let notifier = RecordingNotifier::default();

    let poller = ScriptedPoller::new(vec![Err(PollError::Unavailable(anyhow!("dns")))]);
    let mut state = Some(LastSeenState {
        latest_upload_id: Some("v1".into()),
        ..Default::default()
    });

    run_cycle(&poller, &notifier, &store, &status, &mut state).await;

    assert_eq!(state.unwrap().latest_upload_id.as_deref(), Some("v1"));
    assert!(notifier.sent.lock().unwrap().is_empty());
    assert_eq!(store.load().await, None); // nothing persisted either
    assert!(!status.last_poll(Platform::YouTube).unwrap().ok);
}

#[tokio::test]
async fn rate_limit_skips_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path(), Platform::YouTube);
    let status = StatusRegistry::new();
    let notifier = RecordingNotifier::default();

    let poller = ScriptedPoller::new(vec![Err(PollError::RateLimited)]);
    let mut state = None;

    run_cycle(&poller, &notifier, &store, &status, &mut state).await;

    assert!(state.is_none());
    assert!(notifier.sent.lock().unwrap().is_empty());
    let rec = status.last_poll(Platform::YouTube).unwrap();
    assert!(!rec.ok);
    assert!(rec.detail.contains("rate limited"));
}

#[tokio::test]
async fn cold_start_seeds_and_persists_without_notifying() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path(), Platform::YouTube);
    let status = StatusRegistry::new();
    let notifier = RecordingNotifier::default();

    let poller = ScriptedPoller::new(vec![Ok(upload_snapshot("v1"))]);
    let mut state = None;

    run_cycle(&poller, &notifier, &store, &status, &mut state).await;

    assert!(notifier.sent.lock().unwrap().is_empty());
    assert_eq!(
        state.as_ref().unwrap().latest_upload_id.as_deref(),
        Some("v1")
    );
    // persisted, so a restart will not re-seed
    let persisted = store.load().await.unwrap();
    assert_eq!(persisted.latest_upload_id.as_deref(), Some("v1"));
    assert!(status.last_poll(Platform::YouTube).unwrap().ok);
}

#[tokio::test]
async fn new_upload_is_notified_then_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path(), Platform::YouTube);
    let status = StatusRegistry::new();
    let notifier = RecordingNotifier::default();

    let poller = ScriptedPoller::new(vec![Ok(upload_snapshot("v1")), Ok(upload_snapshot("v2"))]);
    let mut state = None;

    run_cycle(&poller, &notifier, &store, &status, &mut state).await;
    run_cycle(&poller, &notifier, &store, &status, &mut state).await;

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, EventKind::NewVideo);
    assert_eq!(sent[0].title, "title v2");

    let persisted = store.load().await.unwrap();
    assert_eq!(persisted.latest_upload_id.as_deref(), Some("v2"));
}

#[tokio::test]
async fn failed_delivery_still_commits_state() {
    // A dropped notification for an id that later gets superseded is lost;
    // the state must advance anyway so it is not re-sent forever.
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path(), Platform::YouTube);
    let status = StatusRegistry::new();

    let poller = ScriptedPoller::new(vec![Ok(upload_snapshot("v1")), Ok(upload_snapshot("v2"))]);
    let mut state = None;

    run_cycle(&poller, &FailingNotifier, &store, &status, &mut state).await;
    run_cycle(&poller, &FailingNotifier, &store, &status, &mut state).await;

    assert_eq!(
        state.as_ref().unwrap().latest_upload_id.as_deref(),
        Some("v2")
    );
    // the cycle still counts as a successful poll
    let rec = status.last_poll(Platform::YouTube).unwrap();
    assert!(rec.ok);
    assert!(rec.detail.contains("0 delivered"));
}
