//! Span merging and the public lookup entry points.
//!
//! Per-class lookups filter the merged per-file scan, so asking for one class
//! and asking for every class in a file always agree on spans.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::html::html_class_tokens;
use super::matchers::default_matchers;
use super::{ClassSpan, MatchKind, Reference, ReferenceMatcher};

/// Ordered matcher list plus the overlap merge.
pub struct ReferenceScanner {
    matchers: Vec<Box<dyn ReferenceMatcher>>,
}

impl Default for ReferenceScanner {
    fn default() -> Self {
        Self::new(default_matchers())
    }
}

impl ReferenceScanner {
    pub fn new(matchers: Vec<Box<dyn ReferenceMatcher>>) -> Self {
        Self { matchers }
    }

    /// All references in `text`, ordered by offset.
    ///
    /// When spans from different matchers overlap, the higher-priority one is
    /// kept and the other dropped; no two returned spans overlap.
    pub fn scan(&self, file: &str, text: &str) -> Vec<Reference> {
        let mut candidates: Vec<(u8, ClassSpan, MatchKind)> = Vec::new();
        for matcher in &self.matchers {
            let (priority, kind) = (matcher.priority(), matcher.kind());
            candidates.extend(
                matcher
                    .find_spans(text)
                    .into_iter()
                    .map(|span| (priority, span, kind)),
            );
        }
        candidates.sort_by_key(|(priority, span, _)| (*priority, span.start, span.end));

        // start → (span, kind)
        let mut kept: BTreeMap<usize, (ClassSpan, MatchKind)> = BTreeMap::new();
        for (_, span, kind) in candidates {
            let clashes_before = kept
                .range(..=span.start)
                .next_back()
                .is_some_and(|(_, (prev, _))| prev.end > span.start);
            let clashes_after = kept
                .range(span.start..)
                .next()
                .is_some_and(|(&next_start, _)| next_start < span.end);
            if !clashes_before && !clashes_after {
                kept.insert(span.start, (span, kind));
            }
        }

        kept.into_values()
            .map(|(span, kind)| Reference {
                file: file.to_string(),
                class: text[span.start..span.end].to_string(),
                start: span.start,
                end: span.end,
                kind,
                context: text[span.context_start..span.context_end].to_string(),
            })
            .collect()
    }

    /// References to exactly `class`.
    pub fn find_references(&self, file: &str, text: &str, class: &str) -> Vec<Reference> {
        self.scan(file, text)
            .into_iter()
            .filter(|r| r.class == class)
            .collect()
    }

    /// Distinct class names referenced anywhere in `text`.
    pub fn referenced_classes(&self, text: &str) -> BTreeSet<String> {
        self.scan("", text).into_iter().map(|r| r.class).collect()
    }
}

fn default_scanner() -> &'static ReferenceScanner {
    static SCANNER: OnceLock<ReferenceScanner> = OnceLock::new();
    SCANNER.get_or_init(ReferenceScanner::default)
}

/// References to `class` in `text` using the built-in categories.
pub fn find_references(file: &str, text: &str, class: &str) -> Vec<Reference> {
    default_scanner().find_references(file, text, class)
}

/// Every class referenced in `text` by the built-in categories.
pub fn referenced_classes(text: &str) -> BTreeSet<String> {
    default_scanner().referenced_classes(text)
}

/// Classes a source file counts as using: pattern references, plus every
/// `class` attribute token when the file is HTML.
pub fn source_classes(file: &str, text: &str) -> BTreeSet<String> {
    let mut classes = referenced_classes(text);
    if is_html(file) {
        classes.extend(html_class_tokens(text));
    }
    classes
}

fn is_html(file: &str) -> bool {
    Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

fn regex_kebab_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"["']([A-Za-z0-9]+-[A-Za-z0-9-]+)["']"#).expect("valid regex literal")
    })
}

/// Quoted kebab-case literals. Advisory only; never counted as usage.
pub fn advisory_literals(text: &str) -> BTreeSet<String> {
    regex_kebab_literal()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_boundary_on_hyphenated_class() {
        let text = r#"<button className="btn-primary">"#;
        assert!(find_references("a.jsx", text, "btn").is_empty());
        assert_eq!(find_references("a.jsx", text, "btn-primary").len(), 1);
    }

    #[test]
    fn test_exactly_one_reference_in_class_list() {
        let text = r#"<button className="btn primary">"#;
        let refs = find_references("a.jsx", text, "btn");
        assert_eq!(refs.len(), 1);
        assert_eq!(&text[refs[0].start..refs[0].end], "btn");
        assert_eq!(refs[0].kind, MatchKind::ClassAttribute);
    }

    #[test]
    fn test_overlap_keeps_higher_priority() {
        // matched by the attribute, alias-variable and property categories
        let text = r#"el.className = "card";"#;
        let refs = find_references("a.js", text, "card");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, MatchKind::ClassAttribute);
    }

    #[test]
    fn test_per_class_agrees_with_per_file() {
        let text = r#"
            el.classList.add("open");
            document.querySelector(".menu .open");
            const s = '.menu';
        "#;
        let all = ReferenceScanner::default().scan("a.js", text);
        for class in referenced_classes(text) {
            let single = find_references("a.js", text, &class);
            let filtered: Vec<_> = all.iter().filter(|r| r.class == class).cloned().collect();
            assert_eq!(single, filtered);
        }
        assert_eq!(
            referenced_classes(text).into_iter().collect::<Vec<_>>(),
            vec!["menu", "open"]
        );
    }

    #[test]
    fn test_references_ordered_and_disjoint() {
        let text = r#"<div class="a b"></div><span class='c'></span>"#;
        let refs = ReferenceScanner::default().scan("x.html", text);
        assert_eq!(refs.len(), 3);
        for pair in refs.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        assert!(refs[0].context.starts_with("class="));
    }

    #[test]
    fn test_source_classes_html_walk() {
        let text = "<div CLASS=panel></div>";
        assert!(source_classes("page.html", text).contains("panel"));
        assert!(!source_classes("page.js", text).contains("panel"));
    }

    #[test]
    fn test_advisory_literals_not_counted() {
        let text = r#"const state = "is-active"; setMode('dark-mode-on');"#;
        let advisory = advisory_literals(text);
        assert!(advisory.contains("is-active"));
        assert!(advisory.contains("dark-mode-on"));
        assert!(referenced_classes(text).is_empty());
    }

    #[test]
    fn test_custom_matcher_list() {
        let scanner = ReferenceScanner::new(Vec::new());
        assert!(scanner.scan("a.js", r#"class="x""#).is_empty());
    }
}
