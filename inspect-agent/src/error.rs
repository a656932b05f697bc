// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Errors raised by the inspection engine.
//!
//! A page that cannot be fetched is not an error here: the failure is recorded
//! in the report's own `status_code` and `status_msg`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to encode report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Link count mismatch: {0}")]
    CountMismatch(String),
}
