//! Selector class extraction and model population.

use crate::css::parser::parse_stylesheet;
use crate::error::CssmigResult;
use crate::model::DeclarationModel;

/// Class names in a selector, in order of first appearance.
///
/// Pseudo-classes and pseudo-elements end the name (`.btn:hover` → `btn`).
/// Attribute selectors and strings are skipped, so `[href$=".pdf"]` yields
/// nothing.
pub fn class_tokens(selector: &str) -> Vec<String> {
    let bytes = selector.as_bytes();
    let mut classes: Vec<String> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b']')
                    .map_or(bytes.len(), |rel| i + rel + 1);
            }
            b'"' | b'\'' => {
                let quote = bytes[i];
                i = bytes[i + 1..]
                    .iter()
                    .position(|&b| b == quote)
                    .map_or(bytes.len(), |rel| i + 1 + rel + 1);
            }
            b'.' => {
                let start = i + 1;
                let len = bytes[start..]
                    .iter()
                    .take_while(|&&b| is_class_byte(b))
                    .count();
                if len > 0 {
                    let name = &selector[start..start + len];
                    if !classes.iter().any(|c| c == name) {
                        classes.push(name.to_string());
                    }
                }
                i = start + len;
            }
            _ => i += 1,
        }
    }
    classes
}

pub(crate) fn is_class_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Parse one stylesheet into a partial model.
///
/// Every class token of every selector receives the rule's full declaration
/// list, so `.btn.primary { color: red }` contributes to both `btn` and
/// `primary`.
pub fn extract_stylesheet(file: &str, text: &str) -> CssmigResult<DeclarationModel> {
    let sheet = parse_stylesheet(file, text)?;
    let mut model = DeclarationModel::new();

    for rule in &sheet.rules {
        for selector in &rule.selectors {
            for class in class_tokens(selector) {
                model.record_css_match(&class, rule.declarations.iter().cloned(), file, selector);
            }
        }
    }

    tracing::debug!(
        file = %file,
        rules = sheet.rules.len(),
        classes = model.len(),
        skipped_at_rules = sheet.skipped_at_rules,
        "Extracted stylesheet"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_tokens_basic() {
        assert_eq!(class_tokens(".btn:hover"), vec!["btn"]);
        assert_eq!(class_tokens("div.card > .card-title::after"), vec!["card", "card-title"]);
        assert_eq!(class_tokens("#main"), Vec::<String>::new());
    }

    #[test]
    fn test_class_tokens_skip_attribute_values() {
        assert_eq!(class_tokens("a[href$=\".pdf\"].doc-link"), vec!["doc-link"]);
    }

    #[test]
    fn test_class_tokens_dedup() {
        assert_eq!(class_tokens(".a .b .a"), vec!["a", "b"]);
    }

    #[test]
    fn test_compound_selector_contributes_to_every_class() {
        let model = extract_stylesheet("s.css", ".btn.primary { color: red; }").unwrap();
        for class in ["btn", "primary"] {
            let record = model.get(class).unwrap();
            assert!(record.declarations.contains("color: red"));
            assert!(record.selectors.contains(".btn.primary"));
            assert!(record.source_files.contains("s.css"));
        }
    }

    #[test]
    fn test_pseudo_class_merges_into_base() {
        let model = extract_stylesheet(
            "s.css",
            ".btn { color: red; } .btn:hover { color: blue; }",
        )
        .unwrap();
        let record = model.get("btn").unwrap();
        assert_eq!(record.declarations.len(), 2);
        assert_eq!(record.selectors.len(), 2);
    }

    #[test]
    fn test_media_rules_contribute_nothing() {
        let model =
            extract_stylesheet("s.css", "@media print { .print-only { display: block; } }")
                .unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn test_parse_failure_propagates() {
        assert!(extract_stylesheet("s.css", ".a { color: red;").is_err());
    }
}
