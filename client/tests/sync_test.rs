//! Integration tests for the sync protocol.
//!
//! Each test runs an in-process mock of the remote endpoint on an ephemeral
//! port and drives a real widget against it.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use quotesync_client::{
    BlobStore, FileStore, MemoryStore, PersistenceAdapter, QuoteApp, RemoteSyncClient,
    StatusKind, SyncScheduler, SyncState, SyncStatus,
};
use quotesync_engine::{Quote, REMOTE_CATEGORY};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const QUOTES_KEY: &str = "dynamic_quote_generator_quotes";

/// Mock of the remote endpoint.
#[derive(Default)]
struct MockRemote {
    posts: Mutex<Vec<Value>>,
    received: Mutex<Vec<Value>>,
    failing: AtomicBool,
    delay: Mutex<Duration>,
    fetches: AtomicUsize,
    last_limit: Mutex<Option<String>>,
}

impl MockRemote {
    fn with_posts(posts: Value) -> Arc<Self> {
        let remote = Self::default();
        *remote.posts.lock().unwrap() = posts.as_array().unwrap().clone();
        Arc::new(remote)
    }

    fn set_posts(&self, posts: Value) {
        *self.posts.lock().unwrap() = posts.as_array().unwrap().clone();
    }
}

async fn list_posts(
    State(remote): State<Arc<MockRemote>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    remote.fetches.fetch_add(1, Ordering::SeqCst);
    *remote.last_limit.lock().unwrap() = params.get("_limit").cloned();

    let delay = *remote.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if remote.failing.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response();
    }

    let posts = remote.posts.lock().unwrap().clone();
    Json(posts).into_response()
}

async fn create_post(State(remote): State<Arc<MockRemote>>, Json(body): Json<Value>) -> Response {
    if remote.failing.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    remote.received.lock().unwrap().push(body.clone());
    let mut created = body;
    created["id"] = json!(101);
    (StatusCode::CREATED, Json(created)).into_response()
}

/// Serve `remote` on an ephemeral port and return the endpoint URL.
async fn spawn_remote(remote: Arc<MockRemote>) -> String {
    let app = Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .with_state(remote);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/posts", addr)
}

struct Widget {
    app: Arc<QuoteApp>,
    scheduler: Arc<SyncScheduler>,
}

fn widget(endpoint: &str, durable: Arc<dyn BlobStore>, period: Duration) -> Widget {
    let persistence = PersistenceAdapter::new(durable, Arc::new(MemoryStore::new()));
    let remote =
        Arc::new(RemoteSyncClient::new(endpoint, 5, 1, Duration::from_secs(5)).unwrap());
    let app = Arc::new(QuoteApp::hydrate(persistence, remote.clone()));
    let scheduler = Arc::new(SyncScheduler::new(app.clone(), remote, period));
    Widget { app, scheduler }
}

fn three_posts() -> Value {
    json!([
        {"userId": 1, "id": 1, "title": "sunt aut facere", "body": "quia et suscipit"},
        {"userId": 1, "id": 2, "title": "qui est esse", "body": "est rerum tempore"},
        {"userId": 1, "id": 3, "title": "ea molestias quasi", "body": "et iusto sed"}
    ])
}

#[tokio::test]
async fn fetch_maps_items_to_server_quotes() {
    let posts: Vec<Value> = (1..=7)
        .map(|id| json!({"userId": 1, "id": id, "title": format!("title {}", id), "body": "b"}))
        .collect();
    let remote = MockRemote::with_posts(Value::Array(posts));
    let endpoint = spawn_remote(remote.clone()).await;

    let client = RemoteSyncClient::new(&endpoint, 5, 1, Duration::from_secs(5)).unwrap();
    let quotes = client.fetch_remote().await.unwrap();

    assert_eq!(quotes.len(), 5);
    assert_eq!(quotes[0], Quote::from_remote(1, "title 1"));
    assert!(quotes.iter().all(|q| q.category == REMOTE_CATEGORY));
    assert_eq!(remote.last_limit.lock().unwrap().as_deref(), Some("5"));
}

#[tokio::test]
async fn fetch_rejects_error_status() {
    let remote = MockRemote::with_posts(three_posts());
    remote.failing.store(true, Ordering::SeqCst);
    let endpoint = spawn_remote(remote).await;

    let client = RemoteSyncClient::new(&endpoint, 5, 1, Duration::from_secs(5)).unwrap();
    let err = client.fetch_remote().await.unwrap_err();

    assert!(err.is_network());
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn sync_appends_new_remote_quotes() {
    let remote = MockRemote::with_posts(three_posts());
    let endpoint = spawn_remote(remote).await;
    let w = widget(&endpoint, Arc::new(MemoryStore::new()), Duration::from_secs(60));

    let report = w.scheduler.sync_now().await;

    assert_eq!(report.status, SyncStatus::Clean);
    assert_eq!(report.fetched, 3);
    assert_eq!(report.appended, 3);
    assert_eq!(w.app.quotes().await.len(), 7);
    assert!(w.app.categories().await.contains(&"Server".to_string()));
}

#[tokio::test]
async fn sync_conflict_prefers_server() {
    let durable = Arc::new(MemoryStore::new());
    durable
        .set(QUOTES_KEY, r#"[{"id": 1, "text": "A", "category": "Server"}]"#)
        .unwrap();
    let remote = MockRemote::with_posts(json!([{"id": 1, "title": "B"}]));
    let endpoint = spawn_remote(remote).await;
    let w = widget(&endpoint, durable.clone(), Duration::from_secs(60));
    let mut notices = w.app.subscribe();

    let report = w.scheduler.sync_now().await;

    assert_eq!(report.status, SyncStatus::Conflicts(1));
    assert_eq!(report.conflicts[0].id, 1);
    assert_eq!(report.conflicts[0].local.text, "A");
    assert_eq!(report.conflicts[0].server.text, "B");
    assert_eq!(w.app.quotes().await, vec![Quote::from_remote(1, "B")]);
    assert!(durable.get(QUOTES_KEY).unwrap().unwrap().contains("\"B\""));

    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.kind, StatusKind::Warning);
}

#[tokio::test]
async fn resync_of_same_snapshot_is_clean() {
    let remote = MockRemote::with_posts(three_posts());
    let endpoint = spawn_remote(remote).await;
    let w = widget(&endpoint, Arc::new(MemoryStore::new()), Duration::from_secs(60));

    w.scheduler.sync_now().await;
    let after_first = w.app.quotes().await;
    let second = w.scheduler.sync_now().await;

    assert_eq!(second.status, SyncStatus::Clean);
    assert_eq!(second.appended, 0);
    assert_eq!(w.app.quotes().await, after_first);
}

#[tokio::test]
async fn remote_edit_overwrites_on_next_sync() {
    let remote = MockRemote::with_posts(three_posts());
    let endpoint = spawn_remote(remote.clone()).await;
    let w = widget(&endpoint, Arc::new(MemoryStore::new()), Duration::from_secs(60));

    w.scheduler.sync_now().await;
    remote.set_posts(json!([{"id": 2, "title": "edited upstream"}]));
    let report = w.scheduler.sync_now().await;

    assert_eq!(report.status, SyncStatus::Conflicts(1));
    let quotes = w.app.quotes().await;
    assert_eq!(quotes.len(), 7);
    assert_eq!(
        quotes.iter().find(|q| q.id == Some(2)).unwrap().text,
        "edited upstream"
    );
}

#[tokio::test]
async fn failed_sync_keeps_local_state() {
    let remote = MockRemote::with_posts(three_posts());
    remote.failing.store(true, Ordering::SeqCst);
    let endpoint = spawn_remote(remote).await;
    let w = widget(&endpoint, Arc::new(MemoryStore::new()), Duration::from_secs(60));
    let before = w.app.quotes().await;
    let mut notices = w.app.subscribe();

    let report = w.scheduler.sync_now().await;

    assert!(matches!(report.status, SyncStatus::Failed(_)));
    assert_eq!(w.app.quotes().await, before);
    assert_eq!(w.scheduler.state(), SyncState::Idle);
    assert_eq!(notices.recv().await.unwrap().kind, StatusKind::Error);
}

#[tokio::test]
async fn overlapping_syncs_do_not_run_twice() {
    let remote = MockRemote::with_posts(three_posts());
    *remote.delay.lock().unwrap() = Duration::from_millis(300);
    let endpoint = spawn_remote(remote.clone()).await;
    let w = widget(&endpoint, Arc::new(MemoryStore::new()), Duration::from_secs(60));

    let (first, second) = tokio::join!(w.scheduler.sync_now(), w.scheduler.sync_now());

    assert_eq!(first.status, SyncStatus::Clean);
    assert_eq!(second.status, SyncStatus::Skipped);
    assert_eq!(remote.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(w.app.quotes().await.len(), 7);
}

#[tokio::test]
async fn state_transitions_through_syncing() {
    let remote = MockRemote::with_posts(three_posts());
    *remote.delay.lock().unwrap() = Duration::from_millis(200);
    let endpoint = spawn_remote(remote).await;
    let w = widget(&endpoint, Arc::new(MemoryStore::new()), Duration::from_secs(60));
    let mut states = w.scheduler.subscribe();

    let scheduler = w.scheduler.clone();
    let task = tokio::spawn(async move { scheduler.sync_now().await });

    states.changed().await.unwrap();
    assert_eq!(*states.borrow_and_update(), SyncState::Syncing);

    task.await.unwrap();
    assert_eq!(w.scheduler.state(), SyncState::Idle);
}

#[tokio::test]
async fn add_quote_posts_in_background() {
    let remote = MockRemote::with_posts(json!([]));
    let endpoint = spawn_remote(remote.clone()).await;
    let w = widget(&endpoint, Arc::new(MemoryStore::new()), Duration::from_secs(60));

    let quote = w.app.add_quote("Stay curious.", "Motivation").await.unwrap();
    assert_eq!(quote.id, None);

    let mut received = Vec::new();
    for _ in 0..250 {
        received = remote.received.lock().unwrap().clone();
        if !received.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(
        received,
        vec![json!({"title": "Stay curious.", "body": "Motivation", "userId": 1})]
    );
}

#[tokio::test]
async fn add_quote_succeeds_while_remote_down() {
    let remote = MockRemote::with_posts(json!([]));
    remote.failing.store(true, Ordering::SeqCst);
    let endpoint = spawn_remote(remote).await;
    let w = widget(&endpoint, Arc::new(MemoryStore::new()), Duration::from_secs(60));

    let quote = w.app.add_quote("Offline thought", "Notes").await.unwrap();

    assert!(w.app.quotes().await.contains(&quote));
}

#[tokio::test]
async fn scheduled_sync_runs_periodically() {
    let remote = MockRemote::with_posts(three_posts());
    let endpoint = spawn_remote(remote.clone()).await;
    let w = widget(&endpoint, Arc::new(MemoryStore::new()), Duration::from_millis(100));

    let handle = w.scheduler.clone().spawn();

    for _ in 0..100 {
        if remote.fetches.load(Ordering::SeqCst) >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    handle.abort();

    assert!(remote.fetches.load(Ordering::SeqCst) >= 2);
    assert_eq!(w.app.quotes().await.len(), 7);
}

#[tokio::test]
async fn merged_collection_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let remote = MockRemote::with_posts(three_posts());
    let endpoint = spawn_remote(remote).await;

    let first = widget(
        &endpoint,
        Arc::new(FileStore::open(dir.path()).unwrap()),
        Duration::from_secs(60),
    );
    first.scheduler.sync_now().await;
    first.app.filter_quotes("Server").await;
    let merged = first.app.quotes().await;

    let restarted = widget(
        &endpoint,
        Arc::new(FileStore::open(dir.path()).unwrap()),
        Duration::from_secs(60),
    );

    assert_eq!(restarted.app.quotes().await, merged);
    assert_eq!(restarted.app.active_filter().await, "Server");
}
