//! Class reference detection in markup and script sources.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐     ┌─────────────────────┐
//! │    matchers.rs      │     │      html.rs        │
//! │  ─────────────────  │     │  ─────────────────  │
//! │  One matcher per    │     │  Tag walk collecting│
//! │  pattern category   │     │  class attributes   │
//! └──────────┬──────────┘     └──────────┬──────────┘
//!            │                           │
//!            ▼                           │
//! ┌─────────────────────┐                │
//! │     scanner.rs      │                │
//! │  ─────────────────  │ ◀──────────────┘
//! │  Merge overlapping  │   (usage only)
//! │  spans by priority  │
//! └─────────────────────┘
//! ```
//!
//! Offsets always refer to the original text. A span is a single class-name
//! token; tokens are whitespace-delimited, so `btn` is never found inside
//! `btn-primary`.

pub mod html;
pub mod matchers;
pub mod scanner;

use serde::Serialize;
use std::fmt;

pub use matchers::{default_matchers, MatchMode, RegexMatcher};
pub use scanner::{
    advisory_literals, find_references, referenced_classes, source_classes, ReferenceScanner,
};

/// Pattern category, in priority order (earlier wins on overlap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// `class="…"` / `className="…"`
    ClassAttribute,
    /// `className={"…"}` / ``className={`…`}``
    ClassExpression,
    /// `classList.add(…)` and friends
    ClassList,
    /// `querySelector(".x")` / `querySelectorAll`
    QuerySelector,
    /// `getElementsByClassName("x")`
    ElementsByClassName,
    /// `cssClass = "x"` and other alias variables
    ClassVariable,
    /// `matches(".x")` / `closest(".x")`
    SelectorMethod,
    /// `el.className = "x"`
    ClassNameProperty,
    /// bare `'.x'` string
    SelectorString,
}

impl MatchKind {
    /// 1-based priority; lower wins.
    pub fn priority(self) -> u8 {
        self as u8 + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchKind::ClassAttribute => "class attribute",
            MatchKind::ClassExpression => "class expression",
            MatchKind::ClassList => "classList method",
            MatchKind::QuerySelector => "querySelector",
            MatchKind::ElementsByClassName => "getElementsByClassName",
            MatchKind::ClassVariable => "class assignment",
            MatchKind::SelectorMethod => "matches method",
            MatchKind::ClassNameProperty => "className property",
            MatchKind::SelectorString => "class selector string",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A class-name token located by one matcher, before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSpan {
    pub start: usize,
    pub end: usize,
    pub context_start: usize,
    pub context_end: usize,
}

/// One located class reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub file: String,
    pub class: String,
    /// Byte offset of the class-name token.
    pub start: usize,
    pub end: usize,
    pub kind: MatchKind,
    /// Full matched span, for display only.
    pub context: String,
}

/// A reference pattern category.
pub trait ReferenceMatcher: Send + Sync {
    fn kind(&self) -> MatchKind;

    /// Lower wins when spans from different matchers overlap.
    fn priority(&self) -> u8;

    /// Every class-name token this matcher recognises in `text`.
    fn find_spans(&self, text: &str) -> Vec<ClassSpan>;
}
