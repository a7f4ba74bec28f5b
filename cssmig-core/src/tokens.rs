//! Design-token (CSS custom property) analysis and migration.
//!
//! Tokens are defined inside `:root { … }` blocks and referenced through
//! `var(--name)`. The usage report answers three questions: which tokens are
//! used most, which mapped tokens are no longer used anywhere, and which
//! tokens are referenced but never defined (orphans).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::{CssmigError, CssmigResult};

/// Entries shown in `most_used_tokens`.
pub const MOST_USED_LIMIT: usize = 20;

const DEFAULT_TOKEN_MAPPINGS: &[(&str, &str)] = &[
    ("--theme-background", "--surface-background"),
    ("--theme-surface", "--surface-default"),
    ("--theme-surface-alt", "--surface-alt"),
    ("--theme-surface-raised", "--surface-default"),
    ("--theme-surface-hover", "--surface-dropdown-hover"),
    ("--theme-primary", "--color-primary"),
    ("--theme-primary-light", "--color-primary-light"),
    ("--theme-text-muted", "--text-muted"),
    ("--theme-border", "--border-subtle"),
    ("--table-header-cell-bg", "--table-header-bg"),
    ("--table-header-cell-text", "--table-header-text"),
    ("--input-background", "--input-bg"),
    ("--overlay-background", "--overlay-bg"),
    ("--button-secondary-hover", "#0f4c65"),
    ("--button-negative-hover", "#bb242f"),
    ("--text-on-accent", "--text-on-primary"),
    ("--background-color-content", "--background-subtle"),
];

fn regex_root_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":root\s*\{([^}]+)\}").expect("valid regex literal"))
}

fn regex_token_definition() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(--[A-Za-z0-9_-]+)\s*:").expect("valid regex literal"))
}

fn regex_var_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"var\(\s*(--[A-Za-z0-9_-]+)\s*[,)]").expect("valid regex literal")
    })
}

/// Custom properties declared inside `:root` blocks.
pub fn defined_tokens(css: &str) -> BTreeSet<String> {
    regex_root_block()
        .captures_iter(css)
        .filter_map(|caps| caps.get(1))
        .flat_map(|block| {
            regex_token_definition()
                .captures_iter(block.as_str())
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Every `var(--name)` reference in `text`, in order, repeats included.
/// References with a fallback (`var(--a, red)`) count too.
pub fn token_references(text: &str) -> Vec<String> {
    regex_var_reference()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStats {
    pub count: usize,
    pub files: BTreeSet<String>,
}

/// Token → usage accumulator.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    tokens: BTreeMap<String, TokenStats>,
    files: BTreeSet<String>,
}

impl TokenUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_file(&mut self, file: &str, text: &str) {
        self.files.insert(file.to_string());
        for token in token_references(text) {
            let stats = self.tokens.entry(token).or_default();
            stats.count += 1;
            stats.files.insert(file.to_string());
        }
    }

    pub fn get(&self, token: &str) -> Option<&TokenStats> {
        self.tokens.get(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenStats)> {
        self.tokens.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Files that were analyzed, whether or not they used any token.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }
}

/// Old token → replacement token or literal color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMapping {
    entries: BTreeMap<String, String>,
}

impl Default for TokenMapping {
    fn default() -> Self {
        Self::new(
            DEFAULT_TOKEN_MAPPINGS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl TokenMapping {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite mapped tokens in `text`; `None` when nothing changed.
    ///
    /// `var(--old)` becomes `var(--new)`, or the bare literal when the target
    /// starts with `#`. In stylesheets a bare `: --old;` value is replaced too.
    /// All replacements happen in one pass, so mappings never chain.
    pub fn apply(&self, text: &str, is_css: bool) -> CssmigResult<Option<String>> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let alternation = self
            .entries
            .keys()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        let var_re = Regex::new(&format!(r"var\(\s*({})\s*\)", alternation))
            .map_err(|e| CssmigError::invalid_mapping(e.to_string()))?;
        let mut updated = var_re
            .replace_all(text, |caps: &Captures<'_>| {
                let new = &self.entries[&caps[1]];
                if new.starts_with('#') {
                    new.clone()
                } else {
                    format!("var({})", new)
                }
            })
            .into_owned();

        if is_css {
            let property_re = Regex::new(&format!(r":\s*({})\s*;", alternation))
                .map_err(|e| CssmigError::invalid_mapping(e.to_string()))?;
            updated = property_re
                .replace_all(&updated, |caps: &Captures<'_>| {
                    format!(": {};", self.entries[&caps[1]])
                })
                .into_owned();
        }

        Ok((updated != text).then_some(updated))
    }
}

/// `{ "token": …, "count": … }` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCount {
    pub token: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileTypeCounts {
    pub css: usize,
    pub js: usize,
    pub other: usize,
}

/// The persisted token usage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenReport {
    pub most_used_tokens: Vec<TokenCount>,
    pub unused_mapped_tokens: Vec<String>,
    pub orphaned_tokens: Vec<String>,
    pub component_usage: BTreeMap<String, Vec<String>>,
    pub file_token_counts: BTreeMap<String, usize>,
    pub token_counts: BTreeMap<String, usize>,
    pub usage_by_filetype: FileTypeCounts,
}

impl TokenReport {
    pub fn build(usage: &TokenUsage, defined: &BTreeSet<String>, mapping: &TokenMapping) -> Self {
        let token_counts: BTreeMap<String, usize> = usage
            .iter()
            .map(|(token, stats)| (token.to_string(), stats.count))
            .collect();

        let mut ranked: Vec<TokenCount> = token_counts
            .iter()
            .map(|(token, &count)| TokenCount {
                token: token.clone(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
        ranked.truncate(MOST_USED_LIMIT);

        let unused_mapped_tokens = mapping
            .keys()
            .filter(|token| usage.get(token).is_none())
            .map(String::from)
            .collect();

        let orphaned_tokens = token_counts
            .keys()
            .filter(|token| !defined.contains(*token))
            .cloned()
            .collect();

        let mut file_token_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut component_usage: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (token, stats) in usage.iter() {
            for file in &stats.files {
                *file_token_counts.entry(file.clone()).or_default() += 1;
                let tokens = component_usage
                    .entry(component_for_path(file).to_string())
                    .or_default();
                if !tokens.iter().any(|t| t == token) {
                    tokens.push(token.to_string());
                }
            }
        }

        let mut usage_by_filetype = FileTypeCounts::default();
        for file in file_token_counts.keys() {
            if file.ends_with(".css") {
                usage_by_filetype.css += 1;
            } else if file.ends_with(".js") {
                usage_by_filetype.js += 1;
            } else {
                usage_by_filetype.other += 1;
            }
        }

        Self {
            most_used_tokens: ranked,
            unused_mapped_tokens,
            orphaned_tokens,
            component_usage,
            file_token_counts,
            token_counts,
            usage_by_filetype,
        }
    }
}

/// Component family of a source path.
pub fn component_for_path(path: &str) -> &'static str {
    if path.contains("modals") {
        "Modal"
    } else if path.contains("stages") {
        "Stage"
    } else if path.contains("framework") {
        "Framework"
    } else if path.contains("components") {
        "Component"
    } else {
        "Other"
    }
}
