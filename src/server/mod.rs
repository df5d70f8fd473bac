//! HTTP server: routes, state wiring, and graceful shutdown
//!
//! ```text
//! GET  /                     greeting
//! GET  /samples/             HTML listing of records and events
//! POST /sample/              stream of JSON record arrays
//! POST /query_handle_event/  single audit event object
//! *                          404
//! ```
//!
//! Wrong methods on a known path get 405 from the method router. Write
//! routes take bodies of any size; batches are never refused for length.

mod error;
mod handlers;
mod state;

pub use state::AppState;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the router with all routes and request logging
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/samples/", get(handlers::list_samples))
        .route(
            "/sample/",
            post(handlers::ingest_samples).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/query_handle_event/",
            post(handlers::query_handle_event).layer(DefaultBodyLimit::disable()),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(handlers::log_request))
        .with_state(state)
}

/// Bind and serve until `shutdown_rx` fires
pub async fn start_server(
    bind_addr: SocketAddr,
    state: AppState,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<()> {
    let app = app(state);

    tracing::info!("Starting server on {}", bind_addr);

    // Bind and serve
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    tracing::info!("Listening at http://{}/", bind_addr);

    // Stop accepting connections on shutdown, finish in-flight requests
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .await
        .context("Server error")?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::ingest::tests::MemoryStore;
    use crate::storage::{SampleStore, SqliteStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn sqlite_state() -> (tempfile::TempDir, Arc<SqliteStore>, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            db_path: dir.path().join("samples.sqlite3"),
            ..Default::default()
        };
        let store = Arc::new(SqliteStore::open(&config).unwrap());
        let state = AppState::new(store.clone());
        (dir, store, state)
    }

    async fn send(state: AppState, method: &str, uri: &str, body: &str) -> Response {
        app(state)
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const VALID: &str =
        r#"{"time": 1700000000, "category_name": "steps", "source": "watch", "value": "42"}"#;

    #[tokio::test]
    async fn test_home_returns_greeting() {
        let (_dir, _store, state) = sqlite_state();
        let response = send(state, "GET", "/", "").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, handlers::GREETING);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (_dir, _store, state) = sqlite_state();
        let response = send(state, "GET", "/nope", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_single_record_round_trip() {
        let (_dir, store, state) = sqlite_state();

        let response = send(state.clone(), "POST", "/sample/", &format!("[{VALID}]")).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let records = store.fetch_all_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category_name, "steps");
        assert_eq!(records[0].source, "watch");
        assert_eq!(records[0].value, "42");
        assert_eq!(records[0].sample_time.timestamp(), 1_700_000_000);

        let listing = send(state, "GET", "/samples/", "").await;
        assert_eq!(listing.status(), StatusCode::OK);
        let html = body_text(listing).await;
        assert!(html.contains("<td>42</td>"));
        assert!(html.contains("2023-11-14 22:13:20 UTC"));
    }

    #[tokio::test]
    async fn test_empty_array_creates_nothing() {
        let (_dir, store, state) = sqlite_state();
        let response = send(state, "POST", "/sample/", "[]").await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(store.fetch_all_records().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_two_arrays_create_two_records_in_order() {
        let (_dir, store, state) = sqlite_state();
        let body = r#"[{"time": 1, "category_name": "c", "source": "s", "value": "first"}]
[{"time": 2, "category_name": "c", "source": "s", "value": "second"}]"#;

        let response = send(state, "POST", "/sample/", body).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let records = store.fetch_all_records().unwrap();
        assert_eq!(records.len(), 2);
        // Listing is most recent first; ids follow submission order
        assert_eq!(records[0].value, "second");
        assert_eq!(records[1].value, "first");
        assert!(records[0].id > records[1].id);
    }

    #[tokio::test]
    async fn test_malformed_tail_is_400_and_keeps_first_array() {
        let (_dir, store, state) = sqlite_state();
        let body = format!("[{VALID}] {{malformed");

        let response = send(state, "POST", "/sample/", &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!body_text(response).await.is_empty());

        assert_eq!(store.fetch_all_records().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_batch_larger_than_two_mib_is_accepted() {
        let store = Arc::new(MemoryStore::default());
        let state = AppState::new(store.clone());

        let value = "x".repeat(1024);
        let record =
            format!(r#"{{"time": 1700000000, "category_name": "c", "source": "s", "value": "{value}"}}"#);
        let count = 3000;
        let body = format!("[{}]", vec![record; count].join(","));
        assert!(body.len() > 2 * 1024 * 1024);

        let response = send(state, "POST", "/sample/", &body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(store.records.lock().unwrap().len(), count);
    }

    #[tokio::test]
    async fn test_null_body_and_null_fields_are_201() {
        let (_dir, store, state) = sqlite_state();

        let response = send(state.clone(), "POST", "/sample/", "null").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(store.fetch_all_records().unwrap().is_empty());

        let body = r#"[{"time": 1, "category_name": null, "source": null, "value": "v"}]"#;
        let response = send(state, "POST", "/sample/", body).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let records = store.fetch_all_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category_name, "");
        assert_eq!(records[0].source, "");
    }

    #[tokio::test]
    async fn test_get_on_sample_is_405() {
        let (_dir, store, state) = sqlite_state();
        let response = send(state, "GET", "/sample/", "").await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(store.fetch_all_records().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_on_event_is_405() {
        let (_dir, _store, state) = sqlite_state();
        let response = send(state, "GET", "/query_handle_event/", "").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let store = Arc::new(MemoryStore {
            fail_records_after: Some(1),
            ..Default::default()
        });
        let state = AppState::new(store.clone());
        let body = format!("[{VALID}, {VALID}] [{VALID}]");

        let response = send(state, "POST", "/sample/", &body).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_event_is_stored() {
        let (_dir, store, state) = sqlite_state();
        let response = send(
            state.clone(),
            "POST",
            "/query_handle_event/",
            r#"{"category_name": "heart_rate", "values_count": 17}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let events = store.fetch_all_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category_name, "heart_rate");
        assert_eq!(events[0].values_count, 17);

        let html = body_text(send(state, "GET", "/samples/", "").await).await;
        assert!(html.contains("<td>heart_rate</td><td>17</td>"));
    }

    #[tokio::test]
    async fn test_malformed_event_is_400() {
        let (_dir, store, state) = sqlite_state();
        let response = send(state, "POST", "/query_handle_event/", "{nope").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.fetch_all_events().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_write_failure_still_201() {
        let store = Arc::new(MemoryStore {
            fail_events: true,
            ..Default::default()
        });
        let response = send(
            AppState::new(store),
            "POST",
            "/query_handle_event/",
            r#"{"category_name": "steps", "values_count": 1}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_empty_listing_renders() {
        let (_dir, _store, state) = sqlite_state();
        let response = send(state, "GET", "/samples/", "").await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Records (0)"));
        assert!(!html.contains("<td>"));
    }

    #[tokio::test]
    async fn test_listing_survives_read_failure() {
        let store = Arc::new(MemoryStore {
            fail_reads: true,
            ..Default::default()
        });
        let response = send(AppState::new(store), "GET", "/samples/", "").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Records (0)"));
    }
}
