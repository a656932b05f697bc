// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use std::env;
use std::time::Duration;

/// Browser user agent sent with every request; some sites refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/100.0.4896.127 Safari/537.36";

/// Upper bound on link probes in flight across all inspections.
pub const DEFAULT_MAX_CONCURRENT_LINK_ANALYSIS: usize = 256;

/// Tunables for the inspector and the `/inspect` endpoint.
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// How long one `/inspect` request may spend analysing links
    pub max_request_duration: Duration,
    pub max_concurrent_link_analysis: usize,
    pub user_agent: String,
    /// Timeout for a single HTTP request (the page or one link)
    pub fetch_timeout: Duration,
    /// Pause after the first streamed report before periodic reports begin
    pub stream_initial_delay: Duration,
    pub stream_interval: Duration,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            max_request_duration: default_request_duration(is_serverless()),
            max_concurrent_link_analysis: DEFAULT_MAX_CONCURRENT_LINK_ANALYSIS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: Duration::from_secs(30),
            stream_initial_delay: Duration::from_secs(2),
            stream_interval: Duration::from_secs(20),
        }
    }
}

/// Serverless platforms cut requests off after a few seconds.
pub fn default_request_duration(serverless: bool) -> Duration {
    if serverless {
        Duration::from_secs(9)
    } else {
        Duration::from_secs(10 * 60)
    }
}

/// True when running on Vercel, which sets `VERCEL` in every function.
pub fn is_serverless() -> bool {
    env::var_os("VERCEL").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_duration_depends_on_platform() {
        assert_eq!(default_request_duration(true), Duration::from_secs(9));
        assert_eq!(default_request_duration(false), Duration::from_secs(600));
    }

    #[test]
    fn test_default_config() {
        let config = InspectorConfig::default();
        assert_eq!(config.max_concurrent_link_analysis, 256);
        assert_eq!(config.stream_interval, Duration::from_secs(20));
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }
}
