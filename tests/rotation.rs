mod common;

use common::test_service;
use std::io::Write;
use std::sync::{Arc, Mutex};
use session_auth::error::AuthError;
use session_auth::store::MemorySessionStore;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .expect("Logs should be UTF-8")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn login_then_refresh_returns_distinct_pair() {
    let service = test_service(Arc::new(MemorySessionStore::new()));

    for subject in ["alice", "user:42", "ünïcödé", "a"] {
        let first = service.login(subject, "10.0.0.1").await.unwrap();
        let second = service
            .refresh(&first.access_token, &first.refresh_token, "10.0.0.1")
            .await
            .unwrap();

        assert_ne!(first, second, "Rotation for {} returned the same pair", subject);
        assert_ne!(first.refresh_token, second.refresh_token);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_refreshes_have_single_winner() {
    let store = Arc::new(MemorySessionStore::new());
    let service = test_service(store.clone());
    let pair = service.login("alice", "10.0.0.1").await.unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let service = service.clone();
            let pair = pair.clone();
            tokio::spawn(async move {
                service
                    .refresh(&pair.access_token, &pair.refresh_token, "10.0.0.1")
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.expect("Refresh task panicked") {
            Ok(_) => winners += 1,
            Err(AuthError::Unauthorized(_)) | Err(AuthError::Conflict) => losers += 1,
            Err(other) => panic!("Unexpected error: {:?}", other),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(losers, 1);

    // One consumed record plus exactly one freshly minted one
    let records = store.records_for("alice");
    assert_eq!(records.len(), 2);
    assert_eq!(records.iter().filter(|r| r.used).count(), 1);
}

#[tokio::test]
async fn newest_session_wins_when_several_are_active() {
    let store = Arc::new(MemorySessionStore::new());
    let service = test_service(store.clone());

    let older = service.login("alice", "10.0.0.1").await.unwrap();
    let newer = service.login("alice", "10.0.0.2").await.unwrap();
    assert_eq!(store.records_for("alice").iter().filter(|r| !r.used).count(), 2);

    let stale = service
        .refresh(&older.access_token, &older.refresh_token, "10.0.0.1")
        .await;
    assert!(matches!(stale, Err(AuthError::Unauthorized(_))));

    service
        .refresh(&newer.access_token, &newer.refresh_token, "10.0.0.2")
        .await
        .expect("Newest session should rotate");
}

#[tokio::test]
async fn origin_change_logs_one_warning() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::WARN)
        .json()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let service = test_service(Arc::new(MemorySessionStore::new()));
    let pair = service.login("carol", "10.0.0.1").await.unwrap();
    service
        .refresh(&pair.access_token, &pair.refresh_token, "172.16.0.5")
        .await
        .expect("Origin change must not block refresh");

    let warnings: Vec<String> = logs
        .lines()
        .into_iter()
        .filter(|line| line.contains("Origin changed"))
        .collect();

    assert_eq!(warnings.len(), 1, "Expected one origin warning, got {:?}", warnings);
    let warning = &warnings[0];
    assert!(warning.contains("\"level\":\"WARN\""));
    assert!(warning.contains("carol"));
    assert!(warning.contains("10.0.0.1"));
    assert!(warning.contains("172.16.0.5"));
}
