// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use inspect_agent::app::{create_router, AppState, STREAMABLE_HEADER, STREAM_CONTENT_TYPE, VERSION};
use inspect_agent::models::config::InspectorConfig;
use inspect_agent::models::inspect::{InspectResponse, LinkStatus};
use inspect_agent::models::version::VersionResponse;
use inspect_agent::services::inspector::Inspector;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn create_test_app(config: InspectorConfig) -> Router {
    let inspector = Inspector::new(config).expect("Failed to build inspector");
    create_router(AppState {
        inspector: Arc::new(inspector),
    })
}

fn inspect_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/inspect")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_version_endpoint_response() {
    let app = create_test_app(InspectorConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert_eq!(content_type, "application/json");

    let version_response: VersionResponse =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(version_response.agent, "inspect-agent");
    assert_eq!(version_response.version, VERSION);

    let parts: Vec<&str> = version_response.version.split('.').collect();
    assert_eq!(parts.len(), 3);
    assert!(parts.iter().all(|part| part.parse::<u32>().is_ok()));
}

#[tokio::test]
async fn test_invalid_route_returns_404() {
    let app = create_test_app(InspectorConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/invalid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inspect_rejects_empty_url() {
    let app = create_test_app(InspectorConfig::default());

    let response = app
        .oneshot(inspect_request(r#"{"url": "   "}"#.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "URL must not be empty");
}

#[tokio::test]
async fn test_inspect_rejects_malformed_body() {
    let app = create_test_app(InspectorConfig::default());

    let response = app
        .clone()
        .oneshot(inspect_request("{not json".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(inspect_request(r#"{"address": "go.dev"}"#.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_inspect_returns_final_report() {
    let site = common::spawn_site().await;
    let app = create_test_app(InspectorConfig {
        max_request_duration: Duration::from_secs(20),
        ..InspectorConfig::default()
    });

    let response = app
        .oneshot(inspect_request(format!(r#"{{"url": "{site}/"}}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let report: InspectResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(report.page_title, "Fixture Home");
    assert_eq!(report.total_link_count, 6);
    assert_eq!(report.not_analysed_link_count, 2);
    report.check_counts().expect("Counters disagree");
}

#[tokio::test]
async fn test_inspect_streams_interim_reports() {
    let site = common::spawn_site().await;
    let app = create_test_app(InspectorConfig {
        max_request_duration: Duration::from_secs(3),
        stream_initial_delay: Duration::ZERO,
        stream_interval: Duration::from_secs(1),
        ..InspectorConfig::default()
    });

    let mut request = inspect_request(format!(r#"{{"url": "{site}/slow-links"}}"#));
    request
        .headers_mut()
        .insert(STREAMABLE_HEADER, "true".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        STREAM_CONTENT_TYPE
    );

    let body = body_string(response).await;
    let reports: Vec<InspectResponse> = body
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    // Initial report, at least one interim report, final report
    assert!(reports.len() >= 3, "got {} reports", reports.len());

    let initial = &reports[0];
    assert_eq!(initial.page_title, "Slow links");
    assert_eq!(initial.not_analysed_link_count, 2);

    let last = reports.last().unwrap();
    assert_eq!(last.links[0].status, LinkStatus::NotAnalysed);
    assert_eq!(last.links[1].status, LinkStatus::Analysed(200));
    assert_eq!(last.accessible_link_count, 1);
    last.check_counts().expect("Counters disagree");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = create_test_app(InspectorConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(doc["paths"]["/inspect"]["post"].is_object());
    assert!(doc["components"]["schemas"]["InspectResponse"].is_object());
}
