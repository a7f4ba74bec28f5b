//! Stylesheet extraction.
//!
//! Turns stylesheet text into a partial [`DeclarationModel`](crate::model::DeclarationModel).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐     ┌─────────────────────┐
//! │     parser.rs       │     │    extract.rs       │
//! │  ─────────────────  │     │  ─────────────────  │
//! │  Text → StyleRules  │ ──▶ │  Selector classes → │
//! │  (at-rules skipped) │     │  model entries      │
//! └─────────────────────┘     └─────────────────────┘
//! ```
//!
//! The parser is deliberately shallow: it keeps declaration values exactly as
//! written (edges trimmed) so that duplicate detection compares raw strings.

pub mod extract;
pub mod parser;

pub use extract::{class_tokens, extract_stylesheet};
pub use parser::{parse_stylesheet, StyleRule, Stylesheet};
