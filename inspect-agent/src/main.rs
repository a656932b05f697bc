// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::Context;
use clap::Parser;
use inspect_agent::app::{create_router, AppState, VERSION};
use inspect_agent::models::config::{
    default_request_duration, is_serverless, InspectorConfig, DEFAULT_MAX_CONCURRENT_LINK_ANALYSIS,
};
use inspect_agent::services::inspector::Inspector;
use inspect_agent::services::logging::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// Every option falls back to the environment variable named in its help text.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineArgs {
    /// Address to serve the HTTP API on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    listen: SocketAddr,

    /// Seconds one request may spend analysing links [default: 600, 9 on Vercel]
    #[arg(long, env = "MAX_REQUEST_SECS")]
    max_request_secs: Option<u64>,

    /// Link probes allowed in flight at once, across all requests
    #[arg(long, env = "MAX_CONCURRENT_LINK_ANALYSIS", default_value_t = DEFAULT_MAX_CONCURRENT_LINK_ANALYSIS)]
    max_concurrent_links: usize,

    /// User agent for page fetches and link probes
    #[arg(long, env = "USER_AGENT")]
    user_agent: Option<String>,

    /// Timeout in seconds for a single HTTP request
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Seconds between interim reports on streamed responses
    #[arg(long, env = "STREAM_INTERVAL_SECS", default_value_t = 20)]
    stream_interval_secs: u64,

    /// Inspect this URL, print the report as JSON and exit instead of serving
    #[arg(long, value_name = "URL")]
    inspect: Option<String>,
}

impl CommandLineArgs {
    fn inspector_config(&self) -> InspectorConfig {
        let defaults = InspectorConfig::default();
        InspectorConfig {
            max_request_duration: self
                .max_request_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| default_request_duration(is_serverless())),
            max_concurrent_link_analysis: self.max_concurrent_links,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            stream_initial_delay: defaults.stream_initial_delay,
            stream_interval: Duration::from_secs(self.stream_interval_secs),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CommandLineArgs::parse();
    let config = args.inspector_config();
    info!(
        "Link analysis limited to {} concurrent probes, {:?} per request",
        config.max_concurrent_link_analysis, config.max_request_duration
    );

    let inspector = Arc::new(Inspector::new(config).context("Failed to build HTTP client")?);

    if let Some(url) = args.inspect.as_deref() {
        return inspect_once(&inspector, url).await;
    }

    let app = create_router(AppState { inspector });

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;

    info!("inspect-agent v{} listening on {}", VERSION, args.listen);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn inspect_once(inspector: &Inspector, url: &str) -> anyhow::Result<()> {
    let deadline = Instant::now() + inspector.config().max_request_duration;
    let report = inspector.inspect(url, Some(deadline)).await?.finish().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
