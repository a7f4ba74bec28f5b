//! Regex-backed reference matchers.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{ClassSpan, MatchKind, ReferenceMatcher};
use crate::css::extract::is_class_byte;

/// How the captured value is turned into class-name tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Whitespace-separated class list (`"btn primary"`).
    Words,
    /// Quoted string literals inside an argument list, each a class list.
    QuotedWords,
    /// A CSS selector; every `.name` is a token.
    SelectorClasses,
    /// The value is a single class name.
    Whole,
}

/// A matcher owning one compiled pattern.
///
/// The value is the last capture group that participated in the match.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    kind: MatchKind,
    priority: u8,
    regex: &'static Regex,
    mode: MatchMode,
}

impl RegexMatcher {
    pub fn new(kind: MatchKind, regex: &'static Regex, mode: MatchMode) -> Self {
        Self {
            kind,
            priority: kind.priority(),
            regex,
            mode,
        }
    }

    fn value_spans(&self, caps: &Captures<'_>) -> Vec<(usize, usize)> {
        let Some(value) = caps.iter().skip(1).flatten().last() else {
            return Vec::new();
        };
        let base = value.start();
        let local = match self.mode {
            MatchMode::Words => word_spans(value.as_str()),
            MatchMode::QuotedWords => quoted_word_spans(value.as_str()),
            MatchMode::SelectorClasses => selector_class_spans(value.as_str()),
            MatchMode::Whole => vec![(0, value.as_str().len())],
        };
        local
            .into_iter()
            .filter(|&(s, e)| is_class_name(&value.as_str()[s..e]))
            .map(|(s, e)| (base + s, base + e))
            .collect()
    }
}

impl ReferenceMatcher for RegexMatcher {
    fn kind(&self) -> MatchKind {
        self.kind
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn find_spans(&self, text: &str) -> Vec<ClassSpan> {
        let mut spans = Vec::new();
        for caps in self.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            for (start, end) in self.value_spans(&caps) {
                spans.push(ClassSpan {
                    start,
                    end,
                    context_start: whole.start(),
                    context_end: whole.end(),
                });
            }
        }
        spans
    }
}

/// The nine built-in categories, highest priority first.
pub fn default_matchers() -> Vec<Box<dyn ReferenceMatcher>> {
    vec![
        Box::new(RegexMatcher::new(
            MatchKind::ClassAttribute,
            regex_class_attribute(),
            MatchMode::Words,
        )),
        Box::new(RegexMatcher::new(
            MatchKind::ClassExpression,
            regex_class_expression(),
            MatchMode::Words,
        )),
        Box::new(RegexMatcher::new(
            MatchKind::ClassList,
            regex_class_list(),
            MatchMode::QuotedWords,
        )),
        Box::new(RegexMatcher::new(
            MatchKind::QuerySelector,
            regex_query_selector(),
            MatchMode::SelectorClasses,
        )),
        Box::new(RegexMatcher::new(
            MatchKind::ElementsByClassName,
            regex_elements_by_class_name(),
            MatchMode::Words,
        )),
        Box::new(RegexMatcher::new(
            MatchKind::ClassVariable,
            regex_class_variable(),
            MatchMode::Words,
        )),
        Box::new(RegexMatcher::new(
            MatchKind::SelectorMethod,
            regex_selector_method(),
            MatchMode::SelectorClasses,
        )),
        Box::new(RegexMatcher::new(
            MatchKind::ClassNameProperty,
            regex_class_name_property(),
            MatchMode::Words,
        )),
        Box::new(RegexMatcher::new(
            MatchKind::SelectorString,
            regex_selector_string(),
            MatchMode::Whole,
        )),
    ]
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex literal")
}

fn regex_class_attribute() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r#"\b(?:class|className)\s*=\s*(?:"([^"]*)"|'([^']*)')"#))
}

fn regex_class_expression() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex(r#"\b(?:class|className)\s*=\s*\{\s*(?:"([^"]*)"|'([^']*)'|`([^`]*)`)"#)
    })
}

fn regex_class_list() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex(
            r#"classList\.(?:add|remove|toggle|contains|replace)\(\s*((?:(?:"[^"]*"|'[^']*')\s*,?\s*)+)"#,
        )
    })
}

fn regex_query_selector() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex(r#"querySelector(?:All)?\(\s*(?:"([^"]*)"|'([^']*)'|`([^`]*)`)"#)
    })
}

fn regex_elements_by_class_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r#"getElementsByClassName\(\s*(?:"([^"]*)"|'([^']*)')"#))
}

fn regex_class_variable() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex(r#"\b(?:className|cssClass|klass|cls)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
    })
}

fn regex_selector_method() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex(r#"\b(?:matchesSelector|matches|closest)\(\s*(?:"([^"]*)"|'([^']*)')"#)
    })
}

fn regex_class_name_property() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r#"\.className\s*=\s*(?:"([^"]*)"|'([^']*)')"#))
}

fn regex_selector_string() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r#"(?:"\.([A-Za-z0-9_-]+)"|'\.([A-Za-z0-9_-]+)')"#))
}

pub(crate) fn is_class_name(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(is_class_byte)
}

/// Byte ranges of whitespace-separated words.
pub(crate) fn word_spans(s: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, b) in s.bytes().enumerate() {
        match (b.is_ascii_whitespace(), start) {
            (true, Some(st)) => {
                spans.push((st, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(st) = start {
        spans.push((st, s.len()));
    }
    spans
}

/// Word ranges inside every `"…"` / `'…'` literal of `s`.
fn quoted_word_spans(s: &str) -> Vec<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let quote = bytes[i];
        if quote != b'"' && quote != b'\'' {
            i += 1;
            continue;
        }
        let open = i + 1;
        let Some(rel) = bytes[open..].iter().position(|&b| b == quote) else {
            break;
        };
        let close = open + rel;
        spans.extend(
            word_spans(&s[open..close])
                .into_iter()
                .map(|(a, b)| (open + a, open + b)),
        );
        i = close + 1;
    }
    spans
}

/// Ranges of class names following `.` in a selector. A name running into a
/// `${` interpolation is only part of a class and is left out.
fn selector_class_spans(s: &str) -> Vec<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b']')
                    .map_or(bytes.len(), |rel| i + rel + 1);
            }
            b'.' => {
                let start = i + 1;
                let len = bytes[start..].iter().take_while(|&&b| is_class_byte(b)).count();
                let end = start + len;
                if len > 0 && bytes.get(end) != Some(&b'$') {
                    spans.push((start, end));
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(matcher: &RegexMatcher, text: &str) -> Vec<String> {
        matcher
            .find_spans(text)
            .into_iter()
            .map(|s| text[s.start..s.end].to_string())
            .collect()
    }

    fn matcher(kind: MatchKind) -> RegexMatcher {
        let (regex, mode) = match kind {
            MatchKind::ClassAttribute => (regex_class_attribute(), MatchMode::Words),
            MatchKind::ClassExpression => (regex_class_expression(), MatchMode::Words),
            MatchKind::ClassList => (regex_class_list(), MatchMode::QuotedWords),
            MatchKind::QuerySelector => (regex_query_selector(), MatchMode::SelectorClasses),
            MatchKind::ElementsByClassName => (regex_elements_by_class_name(), MatchMode::Words),
            MatchKind::ClassVariable => (regex_class_variable(), MatchMode::Words),
            MatchKind::SelectorMethod => (regex_selector_method(), MatchMode::SelectorClasses),
            MatchKind::ClassNameProperty => (regex_class_name_property(), MatchMode::Words),
            MatchKind::SelectorString => (regex_selector_string(), MatchMode::Whole),
        };
        RegexMatcher::new(kind, regex, mode)
    }

    #[test]
    fn test_class_attribute_words() {
        let m = matcher(MatchKind::ClassAttribute);
        assert_eq!(tokens(&m, r#"<div class="btn primary">"#), vec!["btn", "primary"]);
        assert_eq!(tokens(&m, r#"<a className='nav-link'>"#), vec!["nav-link"]);
    }

    #[test]
    fn test_class_expression_template_literal() {
        let m = matcher(MatchKind::ClassExpression);
        assert_eq!(
            tokens(&m, "<div className={`card ${open ? 'is-open' : ''}`}>"),
            vec!["card"]
        );
        assert_eq!(tokens(&m, r#"<div className={"a b"}>"#), vec!["a", "b"]);
    }

    #[test]
    fn test_class_list_arguments() {
        let m = matcher(MatchKind::ClassList);
        assert_eq!(
            tokens(&m, r#"el.classList.replace("old-a", 'new-b');"#),
            vec!["old-a", "new-b"]
        );
    }

    #[test]
    fn test_query_selector_classes() {
        let m = matcher(MatchKind::QuerySelector);
        assert_eq!(
            tokens(&m, r#"document.querySelectorAll(".list > .list-item:hover")"#),
            vec!["list", "list-item"]
        );
    }

    #[test]
    fn test_query_selector_skips_interpolated_names() {
        let m = matcher(MatchKind::QuerySelector);
        assert_eq!(
            tokens(&m, "document.querySelector(`.btn${size} .card`)"),
            vec!["card"]
        );
        assert!(tokens(&m, "el.querySelectorAll(`.${prefix}-item`)").is_empty());
    }

    #[test]
    fn test_selector_method_and_string() {
        let m = matcher(MatchKind::SelectorMethod);
        assert_eq!(tokens(&m, r#"el.closest('.modal')"#), vec!["modal"]);
        let m = matcher(MatchKind::SelectorString);
        assert_eq!(tokens(&m, r#"const sel = '.tab-pane';"#), vec!["tab-pane"]);
    }

    #[test]
    fn test_alias_variable_and_property() {
        let m = matcher(MatchKind::ClassVariable);
        assert_eq!(tokens(&m, r#"const cls = "a b";"#), vec!["a", "b"]);
        let m = matcher(MatchKind::ClassNameProperty);
        assert_eq!(tokens(&m, r#"node.className = 'x';"#), vec!["x"]);
    }

    #[test]
    fn test_last_participating_group() {
        // single-quoted value lives in the second group
        let m = matcher(MatchKind::ElementsByClassName);
        assert_eq!(tokens(&m, "getElementsByClassName('row')"), vec!["row"]);
    }

    #[test]
    fn test_word_spans() {
        assert_eq!(word_spans("  a bc\td "), vec![(2, 3), (4, 6), (7, 8)]);
        assert!(word_spans("   ").is_empty());
    }

    #[test]
    fn test_non_class_tokens_dropped() {
        let m = matcher(MatchKind::ClassAttribute);
        assert_eq!(tokens(&m, r#"<p class="{{dyn}} ok">"#), vec!["ok"]);
    }

    #[test]
    fn test_default_matchers_cover_every_kind_in_order() {
        let kinds: Vec<MatchKind> = default_matchers().iter().map(|m| m.kind()).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert_eq!(kinds.len(), 9);
    }
}
