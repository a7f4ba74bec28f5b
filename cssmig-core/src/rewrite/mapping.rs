//! Rename mapping loading and validation.
//!
//! A mapping is fully validated before any file is touched; every failure here
//! is fatal and names the offending entry.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{CssmigError, CssmigResult};
use crate::references::matchers::is_class_name;

/// Keys starting with one of these are annotations, not renames.
pub const COMMENT_MARKERS: &[&str] = &["/*", "//"];

/// Validated `old → new` class table, iterated in `old` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMapping {
    entries: BTreeMap<String, String>,
}

impl RenameMapping {
    /// Build from raw entries: drop comment keys, validate the rest.
    pub fn from_entries<I>(raw: I) -> CssmigResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries = BTreeMap::new();
        for (old, new) in raw {
            if is_comment_key(&old) {
                continue;
            }
            if !is_class_name(&old) {
                return Err(CssmigError::invalid_mapping(format!(
                    "'{}' is not a valid class name",
                    old
                )));
            }
            if !is_class_name(&new) {
                return Err(CssmigError::invalid_mapping(format!(
                    "'{}' → '{}': target is not a valid class name",
                    old, new
                )));
            }
            if old == new {
                tracing::warn!(class = %old, "Mapping entry renames a class to itself; ignored");
                continue;
            }
            entries.insert(old, new);
        }

        if entries.is_empty() {
            return Err(CssmigError::invalid_mapping(
                "No mappings supplied. Use --map or OLD:NEW pairs.",
            ));
        }
        Ok(Self { entries })
    }

    /// Parse a JSON object of `"old": "new"` entries.
    pub fn from_json(text: &str) -> CssmigResult<Self> {
        Self::from_entries(json_entries(text, "mapping")?)
    }

    /// Merge a mapping file and CLI pairs; pairs override file entries.
    pub fn from_sources(map_file: Option<&Path>, pairs: &[String]) -> CssmigResult<Self> {
        let mut raw: BTreeMap<String, String> = BTreeMap::new();
        if let Some(path) = map_file {
            let text = fs::read_to_string(path).map_err(|e| {
                CssmigError::invalid_mapping(format!("cannot read {}: {}", path.display(), e))
            })?;
            raw.extend(json_entries(&text, &path.display().to_string())?);
        }
        for pair in pairs {
            let (old, new) = parse_pair(pair)?;
            raw.insert(old, new);
        }
        Self::from_entries(raw)
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.entries.get(old).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_comment_key(key: &str) -> bool {
    COMMENT_MARKERS.iter().any(|m| key.starts_with(m))
}

/// String entries of a JSON object. Comment keys may carry any value.
fn json_entries(text: &str, source: &str) -> CssmigResult<Vec<(String, String)>> {
    let object: BTreeMap<String, Value> = serde_json::from_str(text)
        .map_err(|e| CssmigError::invalid_mapping(format!("{}: {}", source, e)))?;

    let mut entries = Vec::with_capacity(object.len());
    for (key, value) in object {
        if is_comment_key(&key) {
            continue;
        }
        match value {
            Value::String(new) => entries.push((key, new)),
            other => {
                return Err(CssmigError::invalid_mapping(format!(
                    "{}: value for '{}' must be a string, found {}",
                    source, key, other
                )))
            }
        }
    }
    Ok(entries)
}

/// Split `OLD:NEW` at the first colon.
pub fn parse_pair(pair: &str) -> CssmigResult<(String, String)> {
    match pair.split_once(':') {
        Some((old, new)) if !old.is_empty() && !new.is_empty() => {
            Ok((old.to_string(), new.to_string()))
        }
        _ => Err(CssmigError::missing_operand(pair)),
    }
}
