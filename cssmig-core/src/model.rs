//! The class declaration model.
//!
//! One [`ClassRecord`] per distinct class name. Declarations, stylesheet files
//! and selectors only ever grow; usage counts are bumped once per source file.
//! Risk and component labels are filled in by [`DeclarationModel::finalize`]
//! after every file has been processed.
//!
//! All collections are ordered (`BTreeMap` / `BTreeSet`) so iteration, hashing
//! and serialized output are deterministic across runs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::component::{ComponentAttributor, UNKNOWN_COMPONENT};
use crate::risk::{RiskClassifier, RiskLevel};

/// Aggregated view of a single CSS class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    /// Class name without the leading `.`
    pub name: String,
    /// `"property: value"` strings merged across every matching rule
    pub declarations: BTreeSet<String>,
    /// Stylesheets that contributed at least one rule
    pub source_files: BTreeSet<String>,
    /// Full selector strings that matched this class
    pub selectors: BTreeSet<String>,
    /// Number of non-CSS source files referencing this class
    pub usage_count: usize,
    /// Derived in `finalize`
    pub risk: Option<RiskLevel>,
    /// Derived in `finalize`
    pub component: Option<String>,
}

impl ClassRecord {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            declarations: BTreeSet::new(),
            source_files: BTreeSet::new(),
            selectors: BTreeSet::new(),
            usage_count: 0,
            risk: None,
            component: None,
        }
    }
}

/// Class name → record map built fresh for every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationModel {
    classes: BTreeMap<String, ClassRecord>,
}

impl DeclarationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one CSS rule match into the record for `class`, creating it if needed.
    pub fn record_css_match<I, S>(&mut self, class: &str, declarations: I, file: &str, selector: &str)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let record = self
            .classes
            .entry(class.to_string())
            .or_insert_with(|| ClassRecord::new(class));
        record
            .declarations
            .extend(declarations.into_iter().map(Into::into));
        record.source_files.insert(file.to_string());
        record.selectors.insert(selector.to_string());
    }

    /// Count one source file as a user of `class`.
    ///
    /// Only declared classes are tracked; returns `false` (and changes nothing)
    /// when `class` never appeared in a stylesheet. Callers are responsible for
    /// calling this at most once per (file, class).
    pub fn record_usage(&mut self, class: &str) -> bool {
        match self.classes.get_mut(class) {
            Some(record) => {
                record.usage_count += 1;
                true
            }
            None => false,
        }
    }

    /// Fold another (partial) model into this one.
    pub fn merge(&mut self, other: DeclarationModel) {
        for (name, incoming) in other.classes {
            match self.classes.get_mut(&name) {
                Some(existing) => {
                    existing.declarations.extend(incoming.declarations);
                    existing.source_files.extend(incoming.source_files);
                    existing.selectors.extend(incoming.selectors);
                    existing.usage_count += incoming.usage_count;
                }
                None => {
                    self.classes.insert(name, incoming);
                }
            }
        }
    }

    /// Compute risk and component labels for every record.
    pub fn finalize(&mut self, classifier: &RiskClassifier, attributor: &ComponentAttributor) {
        for record in self.classes.values_mut() {
            record.risk = Some(classifier.classify(&record.declarations));
            record.component = Some(attributor.attribute(&record.name, &record.selectors));
        }
    }

    pub fn get(&self, class: &str) -> Option<&ClassRecord> {
        self.classes.get(class)
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Records in class-name order.
    pub fn records(&self) -> impl Iterator<Item = &ClassRecord> {
        self.classes.values()
    }

    /// Class names in sorted order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Serializable audit document keyed by class name.
    pub fn to_audit_document(&self) -> BTreeMap<String, AuditEntry> {
        self.classes
            .iter()
            .map(|(name, record)| (name.clone(), AuditEntry::from(record)))
            .collect()
    }
}

/// One class in the persisted audit JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub declarations: Vec<String>,
    pub files: Vec<String>,
    pub count: usize,
    pub selectors: Vec<String>,
    pub risk: RiskLevel,
    pub component: String,
}

impl From<&ClassRecord> for AuditEntry {
    fn from(record: &ClassRecord) -> Self {
        Self {
            declarations: record.declarations.iter().cloned().collect(),
            files: record.source_files.iter().cloned().collect(),
            count: record.usage_count,
            selectors: record.selectors.iter().cloned().collect(),
            risk: record.risk.unwrap_or(RiskLevel::Low),
            component: record
                .component
                .clone()
                .unwrap_or_else(|| UNKNOWN_COMPONENT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_css_match_creates_and_merges() {
        let mut model = DeclarationModel::new();
        model.record_css_match("btn", ["color: red"], "a.css", ".btn");
        model.record_css_match("btn", ["margin: 0", "color: red"], "b.css", ".btn:hover");

        let record = model.get("btn").unwrap();
        assert_eq!(record.declarations.len(), 2);
        assert_eq!(record.source_files.len(), 2);
        assert!(record.selectors.contains(".btn:hover"));
    }

    #[test]
    fn test_same_rule_twice_is_idempotent() {
        let mut model = DeclarationModel::new();
        model.record_css_match("btn", ["color: red"], "a.css", ".btn");
        model.record_css_match("btn", ["color: red"], "a.css", ".btn");

        let record = model.get("btn").unwrap();
        assert_eq!(
            record.declarations.iter().collect::<Vec<_>>(),
            vec!["color: red"]
        );
        assert_eq!(record.source_files.len(), 1);
    }

    #[test]
    fn test_merge_order_does_not_matter() {
        let mut first = DeclarationModel::new();
        first.record_css_match("card", ["padding: 4px"], "a.css", ".card");
        let mut second = DeclarationModel::new();
        second.record_css_match("card", ["color: blue"], "b.css", ".card");

        let mut ab = first.clone();
        ab.merge(second.clone());
        let mut ba = second;
        ba.merge(first);

        assert_eq!(ab, ba);
    }

    #[test]
    fn test_usage_only_for_declared_classes() {
        let mut model = DeclarationModel::new();
        model.record_css_match("btn", ["color: red"], "a.css", ".btn");

        assert!(model.record_usage("btn"));
        assert!(!model.record_usage("ghost"));
        assert_eq!(model.get("btn").unwrap().usage_count, 1);
        assert!(!model.contains("ghost"));
    }

    #[test]
    fn test_audit_entry_defaults_before_finalize() {
        let mut model = DeclarationModel::new();
        model.record_css_match("x", Vec::<String>::new(), "a.css", ".x");
        let doc = model.to_audit_document();
        assert_eq!(doc["x"].risk, RiskLevel::Low);
        assert_eq!(doc["x"].component, UNKNOWN_COMPONENT);
    }
}
