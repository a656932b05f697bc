// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Doctype to HTML version label mapping.

use super::inspect::NOT_DEFINED;

/// Known versions and the fragment each one's doctype must contain.
/// Checked in order, so `HTML 5` has to stay last: its needle matches
/// every doctype that names the `html` root element.
pub const HTML_VERSIONS: &[(&str, &str)] = &[
    ("XHTML 1.1", "/dtd xhtml 1.1/"),
    ("XHTML 1.0 Strict", "/dtd xhtml 1.0 strict/"),
    ("XHTML 1.0 Transitional", "/dtd xhtml 1.0 transitional/"),
    ("XHTML 1.0 Frameset", "/dtd xhtml 1.0 frameset/"),
    ("HTML 4.01 Strict", "/dtd html 4.01/"),
    ("HTML 4.01 Transitional", "/dtd html 4.01 transitional/"),
    ("HTML 4.01 Frameset", "/dtd html 4.01 frameset/"),
    ("HTML 5", "html"),
];

/// Label for a doctype such as `html PUBLIC "-//W3C//DTD HTML 4.01//EN"`.
///
/// An unrecognised doctype is returned normalised rather than discarded.
pub fn detect_html_version(doctype: &str) -> String {
    let normalized = doctype
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if normalized.is_empty() {
        return NOT_DEFINED.to_string();
    }

    HTML_VERSIONS
        .iter()
        .find(|(_, needle)| normalized.contains(needle))
        .map(|(label, _)| label.to_string())
        .unwrap_or(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html5() {
        assert_eq!(detect_html_version("html"), "HTML 5");
        assert_eq!(detect_html_version("HTML"), "HTML 5");
    }

    #[test]
    fn test_html401_variants() {
        assert_eq!(
            detect_html_version(r#"HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd""#),
            "HTML 4.01 Strict"
        );
        assert_eq!(
            detect_html_version(
                r#"HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd""#
            ),
            "HTML 4.01 Transitional"
        );
        assert_eq!(
            detect_html_version(r#"html public "-//w3c//dtd html 4.01 frameset//en""#),
            "HTML 4.01 Frameset"
        );
    }

    #[test]
    fn test_xhtml_variants() {
        assert_eq!(
            detect_html_version(r#"html PUBLIC "-//W3C//DTD XHTML 1.1//EN""#),
            "XHTML 1.1"
        );
        assert_eq!(
            detect_html_version(r#"html PUBLIC "-//W3C//DTD XHTML 1.0  Strict//EN""#),
            "XHTML 1.0 Strict"
        );
        assert_eq!(
            detect_html_version(r#"html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN""#),
            "XHTML 1.0 Transitional"
        );
    }

    #[test]
    fn test_empty_doctype_is_not_defined() {
        assert_eq!(detect_html_version(""), NOT_DEFINED);
        assert_eq!(detect_html_version("   "), NOT_DEFINED);
    }

    #[test]
    fn test_unknown_doctype_is_echoed() {
        assert_eq!(detect_html_version("svg  PUBLIC  x"), "svg public x");
    }
}
