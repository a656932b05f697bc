// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::error::InspectError;
use crate::models::inspect::{Headings, InspectRequest, InspectResponse, Link};
use crate::models::version::VersionResponse;
use crate::services::inspector::{Inspection, Inspector};
use crate::services::logging::redact_url;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::OpenApi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `INSPECT_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("INSPECT_VERSION");

/// Request header a client sets to `true` to receive intermediate reports.
pub const STREAMABLE_HEADER: &str = "inspector-response-streamable";

/// Content type of a streamed response: one JSON report per line.
pub const STREAM_CONTENT_TYPE: &str = "application/x-ndjson";

const MIN_STREAM_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub inspector: Arc<Inspector>,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/version",
    responses((status = 200, description = "Agent name and version", body = VersionResponse))
)]
pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        agent: "inspect-agent".to_string(),
        version: VERSION.to_string(),
    })
}

/// Inspect a page and its links.
///
/// With `inspector-response-streamable: true` the body is a stream of reports,
/// one per line: the page analysis first, periodic updates while links are
/// probed, and the final report last.
#[utoipa::path(
    post,
    path = "/inspect",
    request_body = InspectRequest,
    responses(
        (status = 200, description = "Inspection report", body = InspectResponse),
        (status = 400, description = "Malformed request or empty URL")
    )
)]
pub async fn inspect_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<InspectRequest>,
) -> Result<Response, (StatusCode, String)> {
    let deadline = Instant::now() + state.inspector.config().max_request_duration;

    let inspection = state
        .inspector
        .inspect(&payload.url, Some(deadline))
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if wants_stream(&headers) {
        let config = state.inspector.config();
        return Ok(stream_reports(
            inspection,
            config.stream_initial_delay,
            config.stream_interval,
        ));
    }

    let report = inspection.finish().await;
    info!("Final report returned for {}", redact_url(&report.url));
    Ok(Json(report).into_response())
}

pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(InspectApiDoc::openapi())
}

fn wants_stream(headers: &HeaderMap) -> bool {
    headers
        .get(STREAMABLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

// ---------------------------------------------------------------------------
// Streaming
// ---------------------------------------------------------------------------

fn stream_reports(inspection: Inspection, initial_delay: Duration, interval: Duration) -> Response {
    let (tx, rx) = mpsc::channel::<String>(4);
    tokio::spawn(feed_reports(inspection, tx, initial_delay, interval));

    let chunks = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|chunk| (Ok::<_, Infallible>(chunk), rx))
    });

    (
        [(header::CONTENT_TYPE, STREAM_CONTENT_TYPE)],
        Body::from_stream(chunks),
    )
        .into_response()
}

/// Push reports into `tx` until the inspection completes or the client goes away.
async fn feed_reports(
    mut inspection: Inspection,
    tx: mpsc::Sender<String>,
    initial_delay: Duration,
    interval: Duration,
) {
    let url = redact_url(&inspection.report().url);

    if !send_report(&tx, &inspection.snapshot()).await {
        return;
    }
    info!("Initial report returned for {}", url);

    let interval = interval.max(MIN_STREAM_INTERVAL);
    let mut ticker = tokio::time::interval_at(Instant::now() + initial_delay + interval, interval);
    loop {
        let ticked = tokio::select! {
            _ = ticker.tick() => true,
            more = inspection.next_update() => {
                if !more {
                    break;
                }
                false
            }
        };

        if ticked {
            if !send_report(&tx, &inspection.snapshot()).await {
                info!("Client left before inspection of {} completed", url);
                return;
            }
            info!(
                "Interim report returned for {} ({} probes pending)",
                url,
                inspection.pending()
            );
        }
    }

    let report = inspection.finish().await;
    if send_report(&tx, &report).await {
        info!("Final report returned for {}", url);
    }
}

fn encode_report(report: &InspectResponse) -> Result<String, InspectError> {
    let mut chunk = serde_json::to_string(report)?;
    chunk.push('\n');
    Ok(chunk)
}

async fn send_report(tx: &mpsc::Sender<String>, report: &InspectResponse) -> bool {
    match encode_report(report) {
        Ok(chunk) => tx.send(chunk).await.is_ok(),
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(version_handler, inspect_handler),
    components(schemas(InspectRequest, InspectResponse, Headings, Link, VersionResponse))
)]
pub struct InspectApiDoc;

/// Build the Axum application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version_handler))
        .route("/inspect", post(inspect_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
