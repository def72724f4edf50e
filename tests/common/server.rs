//! Fixture server lifecycle management
//!
//! Each test gets an isolated server on a random port. When dropped, the
//! server shuts down.

use super::constants::*;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone)]
struct FixtureState {
    base_url: String,
    /// User-Agent of the last artifact request
    last_user_agent: Arc<Mutex<Option<String>>>,
}

/// Fixture server serving a catalog and artifacts
pub struct TestServer {
    /// Base URL (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    last_user_agent: Arc<Mutex<Option<String>>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new fixture server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound.
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().expect("Failed to get local address");
        let base_url = format!("http://{}", addr);

        let last_user_agent = Arc::new(Mutex::new(None));
        let state = FixtureState {
            base_url: base_url.clone(),
            last_user_agent: last_user_agent.clone(),
        };

        let app = Router::new()
            .route(CATALOG_PATH, get(catalog))
            .route(EMPTY_CATALOG_PATH, get(|| async { "[]" }))
            .route(BLANK_CATALOG_PATH, get(|| async { "  " }))
            .route(BROKEN_CATALOG_PATH, get(|| async { "{not json" }))
            .route(
                ERROR_CATALOG_PATH,
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .route("/artifacts/{file}", get(artifact))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fixture server failed");
        });

        Self {
            base_url,
            last_user_agent,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn catalog_url(&self) -> String {
        self.url(CATALOG_PATH)
    }

    /// User-Agent header of the most recent artifact request
    pub fn last_user_agent(&self) -> Option<String> {
        self.last_user_agent.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn entry(name: &str, package_name: &str, category: &str, download_url: String) -> Value {
    json!({
        "name": name,
        "packageName": package_name,
        "version": "1.0.0",
        "versionCode": 100,
        "downloadUrl": download_url,
        "iconUrl": "https://example.com/icon.png",
        "category": category,
        "size": 1234
    })
}

async fn catalog(State(state): State<FixtureState>) -> Json<Value> {
    let base = &state.base_url;
    Json(json!([
        entry(
            GAME_NAME,
            GAME_PACKAGE,
            "Games",
            format!("{}/artifacts/{}.apk", base, GAME_PACKAGE)
        ),
        entry(
            "Toolbox",
            TOOL_PACKAGE,
            "Tools",
            format!("{}/artifacts/{}.apk", base, TOOL_PACKAGE)
        ),
        entry(
            "Broken",
            BROKEN_PACKAGE,
            "Tools",
            format!("{}/missing/{}.apk", base, BROKEN_PACKAGE)
        ),
        entry(
            "Old Protocol",
            FTP_PACKAGE,
            "Games",
            "ftp://example.com/old.apk".to_string()
        ),
    ]))
}

async fn artifact(
    State(state): State<FixtureState>,
    Path(_file): Path<String>,
    headers: HeaderMap,
) -> Vec<u8> {
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_user_agent.lock().unwrap() = user_agent;
    artifact_bytes()
}
