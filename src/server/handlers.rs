//! HTTP handlers
//!
//! Storage calls are synchronous SQLite work, so each handler moves them onto
//! the blocking pool and awaits the result.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use bytes::Bytes;
use std::time::Instant;

use super::error::ServerError;
use super::state::AppState;
use crate::ingest;
use crate::render;

/// Body served at `/`
pub const GREETING: &str = "Купил мужик шляпу, а она ему как раз.";

/// `GET /`
pub async fn home() -> &'static str {
    GREETING
}

/// Any path without a route
pub async fn not_found(req: Request) -> StatusCode {
    tracing::info!("Page not found (404): {}", req.uri().path());
    StatusCode::NOT_FOUND
}

/// `GET /samples/` - render every stored record and event
///
/// Read failures are logged and the page is rendered with whatever was
/// fetched, possibly nothing.
pub async fn list_samples(State(state): State<AppState>) -> Response {
    let store = state.store.clone();
    let fetched = tokio::task::spawn_blocking(move || {
        let records = store.fetch_all_records().unwrap_or_else(|e| {
            tracing::error!("Failed to fetch records: {}", e);
            Vec::new()
        });
        let events = store.fetch_all_events().unwrap_or_else(|e| {
            tracing::error!("Failed to fetch query handle events: {}", e);
            Vec::new()
        });
        (records, events)
    })
    .await;

    let (records, events) = fetched.unwrap_or_else(|e| {
        tracing::error!("Listing task failed: {}", e);
        (Vec::new(), Vec::new())
    });

    Html(render::render(&records, &events)).into_response()
}

/// `POST /sample/` - persist a stream of record arrays
pub async fn ingest_samples(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ServerError> {
    let store = state.store.clone();
    let summary =
        tokio::task::spawn_blocking(move || ingest::ingest_samples(store.as_ref(), &body))
            .await??;

    tracing::info!(
        "Stored {} record(s) from {} array(s)",
        summary.records,
        summary.arrays
    );
    Ok(StatusCode::CREATED)
}

/// `POST /query_handle_event/` - persist one audit event
///
/// A failed write is logged but still answered with 201.
pub async fn query_handle_event(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ServerError> {
    let payload = ingest::decode_event(&body)?;

    let store = state.store.clone();
    tokio::task::spawn_blocking(move || ingest::record_event(store.as_ref(), payload)).await?;

    Ok(StatusCode::CREATED)
}

/// Request logging middleware: method, path, status, latency
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "{} {}",
        method,
        path
    );
    response
}
