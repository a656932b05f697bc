// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! HTML extraction for inspection reports, built on the `scraper` crate.

use crate::models::html_version::detect_html_version;
use crate::models::inspect::{InspectResponse, Link, LinkStatus, LinkType};
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// A link the analyser should request, by position in `InspectResponse::links`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub index: usize,
    pub url: String,
}

/// Fill `report` from an HTML document and return the links worth probing.
///
/// `base` is the address the document was served from; site-rooted and
/// relative links are resolved against it.
pub fn parse_document(
    report: &mut InspectResponse,
    html: &str,
    base: Option<&Url>,
) -> Vec<ProbeTarget> {
    let document = Html::parse_document(html);

    if let Some(doctype) = doctype_text(&document) {
        report.html_version = detect_html_version(&doctype);
    }
    if let Some(title) = extract_title(&document) {
        report.page_title = title;
    }
    extract_headings(&document, report);
    report.login_field_count = count_login_fields(&document);

    extract_links(&document, report, base)
}

fn doctype_text(document: &Html) -> Option<String> {
    document
        .tree
        .root()
        .children()
        .find_map(|node| match node.value() {
            Node::Doctype(doctype) => Some(format!(
                "{} {} {}",
                doctype.name(),
                doctype.public_id(),
                doctype.system_id()
            )),
            _ => None,
        })
}

fn extract_title(document: &Html) -> Option<String> {
    let Ok(selector) = Selector::parse("title") else {
        return None;
    };

    document
        .select(&selector)
        .map(|title| element_text(&title))
        .find(|title| !title.is_empty())
}

fn extract_headings(document: &Html, report: &mut InspectResponse) {
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return;
    };

    for heading in document.select(&selector) {
        let Some(level) = heading_level(heading.value().name()) else {
            continue;
        };
        let text = element_text(&heading);
        if !text.is_empty() {
            report.headings.push(level, text);
        }
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    tag.strip_prefix('h')?.parse().ok()
}

/// Password inputs are the one reliable marker of a login form.
fn count_login_fields(document: &Html) -> usize {
    let Ok(selector) = Selector::parse("input[type]") else {
        return 0;
    };

    document
        .select(&selector)
        .filter(|input| {
            input
                .value()
                .attr("type")
                .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("password"))
        })
        .count()
}

fn extract_links(
    document: &Html,
    report: &mut InspectResponse,
    base: Option<&Url>,
) -> Vec<ProbeTarget> {
    let mut targets = Vec::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return targets;
    };

    for anchor in document.select(&selector) {
        let href = anchor.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() {
            continue;
        }

        let mut link = Link::new(href, element_text(&anchor));
        if link.kind.is_probeable() {
            match probe_url(&link.kind, href, base) {
                Some(url) => targets.push(ProbeTarget {
                    index: report.links.len(),
                    url,
                }),
                None => {
                    link.kind = LinkType::Invalid;
                    link.status = LinkStatus::Analysed(400);
                }
            }
        }
        report.links.push(link);
    }

    targets
}

/// Absolute address to request for a probeable link.
fn probe_url(kind: &LinkType, href: &str, base: Option<&Url>) -> Option<String> {
    match kind {
        LinkType::External if href.starts_with("//") => {
            base.map(|base| format!("{}:{}", base.scheme(), href))
        }
        LinkType::External => Some(href.to_string()),
        _ => base?.join(href).ok().map(String::from),
    }
}

/// Text content with whitespace runs collapsed to single spaces.
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(|text| text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
