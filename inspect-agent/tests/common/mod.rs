// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! A small local site for inspection tests, so no test depends on the public internet.

use axum::{http::StatusCode, response::Html, routing::get, Router};
use std::time::Duration;

pub const HOME_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head><title>Fixture Home</title></head>
<body>
    <h1>Welcome</h1>
    <h2>Sign in</h2>
    <h2>Links</h2>
    <form><input type="email" name="user"><input type="password" name="pass"></form>
    <a href="/ok">Working page</a>
    <a href="missing">Missing page</a>
    <a href="/bot">Bot wall</a>
    <a href="#top">Top</a>
    <a href="mailto:team@example.com">Mail</a>
    <a href="http://127.0.0.1:9/closed">Closed port</a>
</body>
</html>"##;

pub const SLOW_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Slow links</title></head>
<body><a href="/slow">Slow</a><a href="/ok">Fast</a></body></html>"#;

/// Serve the fixture site on an ephemeral port and return its base URL.
pub async fn spawn_site() -> String {
    let app = Router::new()
        .route("/", get(|| async { Html(HOME_PAGE) }))
        .route("/slow-links", get(|| async { Html(SLOW_PAGE) }))
        .route("/ok", get(|| async { "ok" }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/bot",
            get(|| async { StatusCode::from_u16(999).unwrap_or(StatusCode::FORBIDDEN) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "late"
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fixture site");
    let addr = listener.local_addr().expect("Fixture site has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fixture site stopped");
    });

    format!("http://{addr}")
}
