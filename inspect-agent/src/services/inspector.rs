// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Page inspection: fetch, parse, then probe links in the background.
//!
//! [`Inspector::inspect`] returns as soon as the page itself is parsed. Link
//! probes keep running inside the returned [`Inspection`], which owns the
//! report and folds probe results into it as they arrive, so callers can take
//! snapshots while analysis is still in progress.

use crate::error::InspectError;
use crate::models::config::InspectorConfig;
use crate::models::inspect::{InspectResponse, LinkStatus, LinkType};
use crate::services::link_analyser::{LinkAnalyser, ProbeOutcome};
use crate::services::logging::redact_url;
use crate::services::parser::parse_document;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// Status reported for a page that could not be fetched at all.
const FETCH_FAILED_STATUS: u16 = 400;

/// Prefix `https://` unless the address already names an HTTP scheme.
pub fn normalize_url(raw: &str) -> Result<String, InspectError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(InspectError::EmptyUrl);
    }

    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Ok(format!("https://{url}"))
    }
}

pub struct Inspector {
    client: reqwest::Client,
    analyser: Arc<LinkAnalyser>,
    config: InspectorConfig,
}

impl Inspector {
    pub fn new(config: InspectorConfig) -> Result<Self, InspectError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout)
            .build()?;
        let analyser = Arc::new(LinkAnalyser::new(
            client.clone(),
            config.max_concurrent_link_analysis,
        ));

        Ok(Self {
            client,
            analyser,
            config,
        })
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Fetch and parse `raw_url`, then start probing its links.
    ///
    /// Probes run until `deadline`. With no deadline, links are left unanalysed.
    /// A page that cannot be fetched still yields a report, with status 400
    /// and the fetch error as the status message.
    pub async fn inspect(
        &self,
        raw_url: &str,
        deadline: Option<Instant>,
    ) -> Result<Inspection, InspectError> {
        let url = normalize_url(raw_url)?;
        let mut report = InspectResponse::new(url.as_str());
        info!("Inspecting {}", redact_url(&url));

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch {}: {}", redact_url(&url), e);
                report.status_code = e
                    .status()
                    .map(|status| status.as_u16())
                    .unwrap_or(FETCH_FAILED_STATUS);
                report.status_msg = e.to_string();
                return Ok(Inspection::completed(report));
            }
        };

        report.status_code = response.status().as_u16();
        report.status_msg = response.status().to_string();
        let base = response.url().clone();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read body of {}: {}", redact_url(&url), e);
                String::new()
            }
        };

        let targets = parse_document(&mut report, &body, Some(&base));
        report.count_links();
        info!(
            "Parsed {}: {} links, {} to probe",
            redact_url(&url),
            report.total_link_count,
            targets.len()
        );

        let mut inspection = Inspection {
            report,
            probes: JoinSet::new(),
            deadline,
        };

        if deadline.is_some() {
            for target in targets {
                let analyser = Arc::clone(&self.analyser);
                inspection.probes.spawn(async move {
                    let outcome = analyser.probe(&target.url).await;
                    (target.index, outcome)
                });
            }
        }

        Ok(inspection)
    }
}

/// A report together with the link probes still running for it.
///
/// Dropping an inspection aborts its outstanding probes.
pub struct Inspection {
    report: InspectResponse,
    probes: JoinSet<(usize, ProbeOutcome)>,
    deadline: Option<Instant>,
}

impl Inspection {
    fn completed(report: InspectResponse) -> Self {
        Self {
            report,
            probes: JoinSet::new(),
            deadline: None,
        }
    }

    /// Probes that have not reported back yet.
    pub fn pending(&self) -> usize {
        self.probes.len()
    }

    pub fn report(&self) -> &InspectResponse {
        &self.report
    }

    /// Current state of the report with counters brought up to date.
    pub fn snapshot(&mut self) -> InspectResponse {
        self.report.count_links();
        self.report.clone()
    }

    /// Wait for the next probe and fold its result into the report.
    ///
    /// Returns `false` once there is nothing left to wait for: every probe has
    /// finished, or the deadline passed and the rest were aborted.
    pub async fn next_update(&mut self) -> bool {
        if self.probes.is_empty() {
            return false;
        }
        let Some(deadline) = self.deadline else {
            return false;
        };

        match timeout_at(deadline, self.probes.join_next()).await {
            Ok(Some(Ok((index, outcome)))) => {
                self.apply(index, outcome);
                true
            }
            Ok(Some(Err(e))) => {
                warn!("Link probe task failed: {}", e);
                true
            }
            Ok(None) => false,
            Err(_) => {
                warn!(
                    "Deadline reached for {}, abandoning {} link probes",
                    redact_url(&self.report.url),
                    self.probes.len()
                );
                self.probes.shutdown().await;
                false
            }
        }
    }

    /// Wait for the remaining probes (up to the deadline) and return the final report.
    pub async fn finish(mut self) -> InspectResponse {
        while self.next_update().await {}
        self.report.count_links();
        self.report
    }

    fn apply(&mut self, index: usize, outcome: ProbeOutcome) {
        let Some(link) = self.report.links.get_mut(index) else {
            return;
        };

        match outcome {
            ProbeOutcome::Status(code) => link.status = LinkStatus::Analysed(code),
            ProbeOutcome::Unscannable => {
                link.kind = LinkType::Unscannable;
                link.status = LinkStatus::Analysed(200);
            }
            ProbeOutcome::BadTarget => {
                link.kind = LinkType::Error;
                link.status = LinkStatus::Analysed(500);
            }
        }
        debug!("Link {} analysed: {:?}", index, link.status);
    }
}
