//! Duplicate declaration-set detection.
//!
//! Two classes are duplicates iff their declaration sets are exactly equal as
//! raw strings. `color: red` and `color:red` are different declarations.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::model::DeclarationModel;

/// Number of hash characters shown in the CSV `duplicate_group` column.
pub const SHORT_HASH_LEN: usize = 8;

/// Classes sharing one canonical declaration set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub hash: String,
    /// Sorted class names, always at least two.
    pub classes: Vec<String>,
}

impl DuplicateGroup {
    pub fn short_hash(&self) -> &str {
        &self.hash[..SHORT_HASH_LEN.min(self.hash.len())]
    }
}

/// SHA-256 over the sorted declarations, NUL-separated.
///
/// The separator keeps `{"a", "bc"}` and `{"ab", "c"}` apart.
pub fn declaration_hash<I, S>(declarations: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sorted: Vec<S> = declarations.into_iter().collect();
    sorted.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));

    let mut sha = Sha256::new();
    for (i, decl) in sorted.iter().enumerate() {
        if i > 0 {
            sha.update([0u8]);
        }
        sha.update(decl.as_ref().as_bytes());
    }
    format!("{:x}", sha.finalize())
}

/// Group classes by declaration hash, keeping groups of two or more.
///
/// Groups are ordered by hash; classes inside a group by name.
pub fn find_duplicates(model: &DeclarationModel) -> Vec<DuplicateGroup> {
    let mut by_hash: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in model.records() {
        by_hash
            .entry(declaration_hash(&record.declarations))
            .or_default()
            .push(record.name.clone());
    }

    by_hash
        .into_iter()
        .filter(|(_, classes)| classes.len() >= 2)
        .map(|(hash, mut classes)| {
            classes.sort();
            DuplicateGroup { hash, classes }
        })
        .collect()
}

/// Hash → class list, the shape persisted as the duplicates JSON.
pub fn duplicates_document(groups: &[DuplicateGroup]) -> BTreeMap<String, Vec<String>> {
    groups
        .iter()
        .map(|g| (g.hash.clone(), g.classes.clone()))
        .collect()
}

/// Lookup from class name to its duplicate group.
pub fn group_index(groups: &[DuplicateGroup]) -> BTreeMap<&str, &DuplicateGroup> {
    groups
        .iter()
        .flat_map(|g| g.classes.iter().map(move |c| (c.as_str(), g)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_independent_sets_grouped() {
        let mut model = DeclarationModel::new();
        model.record_css_match("a", ["color: red", "margin: 0"], "x.css", ".a");
        model.record_css_match("b", ["margin: 0", "color: red"], "x.css", ".b");

        let groups = find_duplicates(&model);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].classes, vec!["a", "b"]);
    }

    #[test]
    fn test_raw_string_difference_not_grouped() {
        let mut model = DeclarationModel::new();
        model.record_css_match("a", ["color: red"], "x.css", ".a");
        model.record_css_match("b", ["color:red"], "x.css", ".b");

        assert!(find_duplicates(&model).is_empty());
    }

    #[test]
    fn test_singletons_not_reported() {
        let mut model = DeclarationModel::new();
        model.record_css_match("only", ["color: red"], "x.css", ".only");
        assert!(find_duplicates(&model).is_empty());
    }

    #[test]
    fn test_empty_declaration_sets_group() {
        let mut model = DeclarationModel::new();
        model.record_css_match("a", Vec::<String>::new(), "x.css", ".a");
        model.record_css_match("b", Vec::<String>::new(), "x.css", ".b");
        assert_eq!(find_duplicates(&model).len(), 1);
    }

    #[test]
    fn test_separator_prevents_concatenation_collisions() {
        assert_ne!(declaration_hash(["a", "bc"]), declaration_hash(["ab", "c"]));
    }

    #[test]
    fn test_hash_is_stable_hex() {
        let hash = declaration_hash(["color: red"]);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, declaration_hash(vec!["color: red".to_string()]));
    }

    #[test]
    fn test_group_index_and_document() {
        let mut model = DeclarationModel::new();
        model.record_css_match("a", ["x: 1"], "x.css", ".a");
        model.record_css_match("b", ["x: 1"], "x.css", ".b");
        let groups = find_duplicates(&model);

        let index = group_index(&groups);
        assert_eq!(index["a"].short_hash().len(), SHORT_HASH_LEN);
        let doc = duplicates_document(&groups);
        assert_eq!(doc.values().next().unwrap(), &vec!["a".to_string(), "b".to_string()]);
    }
}
