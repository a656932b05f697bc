// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Reachability probes for links found on an inspected page.

use crate::services::logging::redact_url;
use reqwest::header::{HeaderMap, HeaderValue};
use tokio::sync::Semaphore;
use tracing::debug;

/// Status recorded when a target never answered.
const NO_RESPONSE_STATUS: u16 = 408;

/// Statuses above this are not HTTP; sites such as LinkedIn use them to turn bots away.
const MAX_STANDARD_STATUS: u16 = 600;

/// What a single probe learned about a link target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The target answered (or failed) with this HTTP status
    Status(u16),
    /// The target answered with a bot-blocking pseudo status
    Unscannable,
    /// The target address could not be turned into a request
    BadTarget,
}

impl ProbeOutcome {
    pub fn from_status(status: u16) -> Self {
        if status > MAX_STANDARD_STATUS {
            ProbeOutcome::Unscannable
        } else {
            ProbeOutcome::Status(status)
        }
    }
}

/// Issues probe requests. One analyser, and so one permit pool, serves all inspections.
pub struct LinkAnalyser {
    client: reqwest::Client,
    permits: Semaphore,
    headers: HeaderMap,
}

impl LinkAnalyser {
    pub fn new(client: reqwest::Client, max_concurrent: usize) -> Self {
        Self {
            client,
            permits: Semaphore::new(max_concurrent.max(1)),
            headers: browser_headers(),
        }
    }

    /// Request `target` and classify the answer. Waits for a free permit first.
    pub async fn probe(&self, target: &str) -> ProbeOutcome {
        let Ok(url) = url::Url::parse(target) else {
            return ProbeOutcome::BadTarget;
        };

        let Ok(_permit) = self.permits.acquire().await else {
            return ProbeOutcome::Status(NO_RESPONSE_STATUS);
        };

        let outcome = match self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
        {
            Ok(response) => ProbeOutcome::from_status(response.status().as_u16()),
            Err(e) if e.is_builder() => ProbeOutcome::BadTarget,
            Err(e) => ProbeOutcome::Status(
                e.status()
                    .map(|status| status.as_u16())
                    .unwrap_or(NO_RESPONSE_STATUS),
            ),
        };

        debug!("Probed {} -> {:?}", redact_url(target), outcome);
        outcome
    }
}

/// Headers a desktop Chrome sends on navigation, so probes are not rejected as bots.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(
            "\" Not A;Brand\";v=\"99\", \"Chromium\";v=\"100\", \"Google Chrome\";v=\"100\"",
        ),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Linux\""));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers
}
