//! Test utilities for csiweb-client
//!
//! Provides an in-process device stub that speaks the logger's query-string
//! dialect, plus a server harness for integration tests. The stub records
//! every request it sees (hit counter, last raw query string) so tests can
//! assert both "no network call was made" and exact query ordering.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use crate::Result;

/// One captured program upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

/// In-process stand-in for a data logger's web API.
#[derive(Debug, Default)]
pub struct MockLogger {
    tables: Mutex<HashMap<String, serde_json::Value>>,
    clock: Mutex<String>,
    hits: AtomicUsize,
    last_query: Mutex<Option<String>>,
    uploads: Mutex<HashMap<String, Upload>>,
}

impl MockLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            clock: Mutex::new("2024-06-01T12:00:00.000000".to_string()),
            ..Self::default()
        })
    }

    /// Register a table with the raw `dataquery` JSON payload it serves.
    pub fn insert_table(&self, name: &str, payload: serde_json::Value) {
        self.tables.lock().unwrap().insert(name.to_string(), payload);
    }

    /// Set the value `ClockCheck` reports.
    pub fn set_clock(&self, time: &str) {
        *self.clock.lock().unwrap() = time.to_string();
    }

    /// Number of HTTP requests observed so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw query string of the most recent GET, verbatim.
    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }

    /// Captured upload for a filename, if any.
    pub fn upload(&self, filename: &str) -> Option<Upload> {
        self.uploads.lock().unwrap().get(filename).cloned()
    }

    /// Build the axum router serving this stub.
    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/", get(device_query))
            .route("/CPU/{filename}", put(put_program))
            .with_state(self.clone())
    }
}

async fn device_query(
    State(logger): State<Arc<MockLogger>>,
    RawQuery(query): RawQuery,
) -> Response {
    logger.hits.fetch_add(1, Ordering::SeqCst);
    let raw = query.unwrap_or_default();
    *logger.last_query.lock().unwrap() = Some(raw.clone());

    let params: HashMap<String, String> = url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect();

    match params.get("command").map(String::as_str) {
        Some("dataquery") => {
            let table = params
                .get("uri")
                .and_then(|uri| uri.strip_prefix("dl:"))
                .unwrap_or_default()
                .to_string();
            match logger.tables.lock().unwrap().get(&table) {
                Some(payload) => Json(payload.clone()).into_response(),
                None => {
                    (StatusCode::NOT_FOUND, format!("unknown table '{table}'")).into_response()
                }
            }
        }
        Some("browsesymbols") => {
            let symbols: Vec<serde_json::Value> = logger
                .tables
                .lock()
                .unwrap()
                .keys()
                .map(|name| json!({"name": name, "uri": format!("dl:{name}"), "type": 8}))
                .collect();
            Json(json!({ "symbols": symbols })).into_response()
        }
        Some("ClockCheck") => {
            let time = logger.clock.lock().unwrap().clone();
            Json(json!({ "time": time })).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "unknown command").into_response(),
    }
}

async fn put_program(
    State(logger): State<Arc<MockLogger>>,
    Path(filename): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    logger.hits.fetch_add(1, Ordering::SeqCst);
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    logger.uploads.lock().unwrap().insert(
        filename,
        Upload {
            authorization,
            body: body.to_vec(),
        },
    );
    StatusCode::NO_CONTENT
}

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub logger: Arc<MockLogger>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Start serving a [`MockLogger`] on an ephemeral local port.
    pub async fn start(logger: Arc<MockLogger>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let router = logger.router();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        Ok(Self {
            addr,
            logger,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// `host:port` string suitable for a [`CsiClient`](crate::CsiClient)
    /// address argument.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
