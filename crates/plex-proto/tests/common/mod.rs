//! Local axum server standing in for a Plex player, media server or plex.tv.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub type Responder = fn(&str) -> (StatusCode, String);

#[derive(Debug, Clone)]
pub struct Seen {
    pub path_and_query: String,
    pub token: Option<String>,
}

#[derive(Clone)]
struct MockState {
    seen: Arc<Mutex<Vec<Seen>>>,
    respond: Responder,
}

async fn handle(State(state): State<MockState>, headers: HeaderMap, uri: Uri) -> (StatusCode, String) {
    let pq = uri
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let token = headers
        .get("x-plex-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.seen.lock().unwrap().push(Seen {
        path_and_query: pq.clone(),
        token,
    });
    (state.respond)(&pq)
}

/// Starts a mock on an ephemeral port; every request is recorded.
pub async fn spawn_mock(respond: Responder) -> (SocketAddr, Arc<Mutex<Vec<Seen>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        seen: seen.clone(),
        respond,
    };
    let app = Router::new().fallback(handle).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, seen)
}
