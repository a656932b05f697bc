// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Wire types for the `/inspect` endpoint.
//!
//! Every field is required on both sides of the boundary: a producer must
//! populate all of them and a consumer rejects a payload missing any of them.

use crate::error::InspectError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use utoipa::ToSchema;

/// Placeholder for the version and title of a page that declares neither.
pub const NOT_DEFINED: &str = "Not defined";

/// Request to inspect a single URL
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InspectRequest {
    /// Address to inspect. `https://` is assumed when no scheme is given.
    pub url: String,
}

/// Full result of inspecting one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InspectResponse {
    /// The analysed address, after normalisation
    pub url: String,
    /// HTTP status of the page itself (400 when it could not be fetched)
    pub status_code: u16,
    /// Status line such as `200 OK`, or the fetch error
    pub status_msg: String,
    pub html_version: String,
    pub page_title: String,
    pub headings: Headings,
    /// Number of password inputs on the page
    pub login_field_count: usize,
    /// Links in document order
    pub links: Vec<Link>,
    pub accessible_link_count: usize,
    pub inaccessible_link_count: usize,
    pub not_analysed_link_count: usize,
    pub total_link_count: usize,
    pub external_link_count: usize,
    pub internal_link_count: usize,
}

impl InspectResponse {
    /// Empty report for `url`, before anything has been fetched.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code: 0,
            status_msg: String::new(),
            html_version: NOT_DEFINED.to_string(),
            page_title: NOT_DEFINED.to_string(),
            headings: Headings::default(),
            login_field_count: 0,
            links: Vec::new(),
            accessible_link_count: 0,
            inaccessible_link_count: 0,
            not_analysed_link_count: 0,
            total_link_count: 0,
            external_link_count: 0,
            internal_link_count: 0,
        }
    }

    /// Recompute every link counter from `links`.
    pub fn count_links(&mut self) {
        let mut accessible = 0;
        let mut inaccessible = 0;
        let mut not_analysed = 0;
        let mut external = 0;
        let mut internal = 0;

        for link in &self.links {
            match link.status {
                LinkStatus::NotAnalysed => not_analysed += 1,
                LinkStatus::Analysed(code) if code < 400 => accessible += 1,
                LinkStatus::Analysed(_) => inaccessible += 1,
            }
            match link.scope() {
                LinkScope::External => external += 1,
                LinkScope::Internal => internal += 1,
            }
        }

        self.accessible_link_count = accessible;
        self.inaccessible_link_count = inaccessible;
        self.not_analysed_link_count = not_analysed;
        self.total_link_count = self.links.len();
        self.external_link_count = external;
        self.internal_link_count = internal;
    }

    /// Verify that the counters agree with each other and with `links`.
    pub fn check_counts(&self) -> Result<(), InspectError> {
        if self.total_link_count != self.links.len() {
            return Err(InspectError::CountMismatch(format!(
                "total_link_count {} but {} links",
                self.total_link_count,
                self.links.len()
            )));
        }

        let by_status =
            self.accessible_link_count + self.inaccessible_link_count + self.not_analysed_link_count;
        if by_status != self.total_link_count {
            return Err(InspectError::CountMismatch(format!(
                "status buckets sum to {} but total_link_count is {}",
                by_status, self.total_link_count
            )));
        }

        let by_scope = self.internal_link_count + self.external_link_count;
        if by_scope != self.total_link_count {
            return Err(InspectError::CountMismatch(format!(
                "internal + external is {} but total_link_count is {}",
                by_scope, self.total_link_count
            )));
        }

        Ok(())
    }
}

/// Heading text grouped by level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

impl Headings {
    /// Headings at `level` (1 to 6).
    pub fn level(&self, level: u8) -> Option<&[String]> {
        let headings = match level {
            1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            4 => &self.h4,
            5 => &self.h5,
            6 => &self.h6,
            _ => return None,
        };
        Some(headings)
    }

    /// Append a heading; returns false for a level outside 1..=6.
    pub fn push(&mut self, level: u8, text: String) -> bool {
        let headings = match level {
            1 => &mut self.h1,
            2 => &mut self.h2,
            3 => &mut self.h3,
            4 => &mut self.h4,
            5 => &mut self.h5,
            6 => &mut self.h6,
            _ => return false,
        };
        headings.push(text);
        true
    }

    pub fn total(&self) -> usize {
        (1..=6).filter_map(|level| self.level(level)).map(<[String]>::len).sum()
    }
}

/// One hyperlink found on the inspected page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    /// Target exactly as written in the `href` attribute
    pub url: String,
    /// Visible anchor text
    pub text: String,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "external")]
    pub kind: LinkType,
    /// HTTP status of the target, `0` while not analysed
    #[serde(rename = "status_code")]
    #[schema(value_type = u16)]
    pub status: LinkStatus,
}

impl Link {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        let url = url.into();
        let kind = LinkType::classify(&url);
        Self {
            url,
            text: text.into(),
            kind,
            status: LinkStatus::NotAnalysed,
        }
    }

    /// Whether the link stays on the inspected site.
    ///
    /// Derived from `url` rather than `kind`, which a probe may relabel.
    pub fn scope(&self) -> LinkScope {
        match LinkType::classify(&self.url) {
            LinkType::External | LinkType::Telephone | LinkType::Email | LinkType::Scheme(_) => {
                LinkScope::External
            }
            _ => LinkScope::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScope {
    Internal,
    External,
}

/// Classification label of a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkType {
    /// `http://`, `https://` or protocol-relative `//` target
    External,
    /// `#anchor` within the same page
    Fragment,
    /// `tel:` link
    Telephone,
    /// `mailto:` link
    Email,
    /// Site-rooted path such as `/about`
    Absolute,
    /// Path relative to the current page
    Relative,
    /// Site-rooted path that could not be resolved against the page URL
    Invalid,
    /// Target could not be requested at all
    Error,
    /// Target answered with a non-standard status, typically a bot wall
    Unscannable,
    /// Any other `scheme:` link, e.g. `javascript:`; holds the lower-case scheme
    Scheme(String),
}

impl LinkType {
    /// Classify an `href` by its prefix.
    pub fn classify(href: &str) -> Self {
        let href = href.trim();
        let lower = href.to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") || href.starts_with("//")
        {
            LinkType::External
        } else if href.starts_with('#') {
            LinkType::Fragment
        } else if lower.starts_with("tel:") {
            LinkType::Telephone
        } else if lower.starts_with("mailto:") {
            LinkType::Email
        } else if let Some(scheme) = leading_scheme(href) {
            LinkType::Scheme(scheme.to_ascii_lowercase())
        } else if href.starts_with('/') {
            LinkType::Absolute
        } else {
            LinkType::Relative
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LinkType::External => "external",
            LinkType::Fragment => "fragment",
            LinkType::Telephone => "telephone",
            LinkType::Email => "email",
            LinkType::Absolute => "absolute",
            LinkType::Relative => "relative",
            LinkType::Invalid => "invalid",
            LinkType::Error => "error",
            LinkType::Unscannable => "unscannable",
            LinkType::Scheme(scheme) => scheme.as_str(),
        }
    }

    /// Parse a wire label. Unknown labels are protocol names.
    pub fn parse(label: &str) -> Self {
        match label {
            "external" => LinkType::External,
            "fragment" => LinkType::Fragment,
            "telephone" => LinkType::Telephone,
            "email" => LinkType::Email,
            "absolute" => LinkType::Absolute,
            "relative" => LinkType::Relative,
            "invalid" => LinkType::Invalid,
            "error" => LinkType::Error,
            "unscannable" => LinkType::Unscannable,
            other => LinkType::Scheme(other.to_string()),
        }
    }

    /// Whether a link of this kind is worth requesting.
    pub fn is_probeable(&self) -> bool {
        matches!(
            self,
            LinkType::External | LinkType::Absolute | LinkType::Relative
        )
    }
}

/// `javascript:void(0)` -> `javascript`. The scheme must be non-empty ASCII alphanumerics.
fn leading_scheme(href: &str) -> Option<&str> {
    let (scheme, _) = href.split_once(':')?;
    (!scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric())).then_some(scheme)
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LinkType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LinkType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(LinkType::parse(&label))
    }
}

/// Reachability of a link target.
///
/// Serialised as the bare HTTP status, with `0` standing for `NotAnalysed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkStatus {
    #[default]
    NotAnalysed,
    Analysed(u16),
}

impl LinkStatus {
    const NOT_ANALYSED_CODE: u16 = 0;

    pub fn code(&self) -> u16 {
        match self {
            LinkStatus::NotAnalysed => Self::NOT_ANALYSED_CODE,
            LinkStatus::Analysed(code) => *code,
        }
    }

    pub fn from_code(code: u16) -> Self {
        if code == Self::NOT_ANALYSED_CODE {
            LinkStatus::NotAnalysed
        } else {
            LinkStatus::Analysed(code)
        }
    }
}

impl Serialize for LinkStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

impl<'de> Deserialize<'de> for LinkStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u16::deserialize(deserializer).map(LinkStatus::from_code)
    }
}
