//! Shared helpers for integration tests
#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;
use session_auth::auth::{AuthService, TokenCodec};
use session_auth::clock::SystemClock;
use session_auth::startup::run;
use session_auth::store::MemorySessionStore;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemorySessionStore>,
}

pub fn test_service(store: Arc<MemorySessionStore>) -> AuthService {
    let clock = Arc::new(SystemClock);
    let codec = TokenCodec::new(TEST_SECRET, clock.clone()).expect("Failed to build codec");
    AuthService::new(codec, store, clock)
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let store = Arc::new(MemorySessionStore::new());
    let server = run(listener, test_service(store.clone())).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
    }
}
