//! Deprecated-classes stylesheet generation.
//!
//! For every mapped class, emits a rule under the old name carrying its
//! original declarations (when the audit knows them) and a comment pointing at
//! the replacement, so markup that still uses the old name keeps rendering.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CssmigError, CssmigResult, IoResultExt};

/// The slice of an audit entry this module needs; other fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditDeclarations {
    #[serde(default)]
    pub declarations: Vec<String>,
}

pub type AuditDeclarationIndex = BTreeMap<String, AuditDeclarations>;

/// Load a persisted audit JSON document.
pub fn load_audit_declarations(path: &Path) -> CssmigResult<AuditDeclarationIndex> {
    let text = fs::read_to_string(path).with_path(path)?;
    serde_json::from_str(&text).map_err(|e| CssmigError::parse(path, e.to_string()))
}

/// Render the deprecated-classes stylesheet.
pub fn render_deprecated_css<'a, I>(mapping: I, audit: &AuditDeclarationIndex) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    out.push_str("/* Deprecated classes - generated by cssmig */\n");
    out.push_str("/* Keeps old class names working during the migration */\n\n");

    for (old, new) in mapping {
        let declarations = audit
            .get(old)
            .map(|entry| entry.declarations.as_slice())
            .unwrap_or_default();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "/* {} → {} */", old, new);
        let _ = writeln!(out, ".{} {{", old);
        if !declarations.is_empty() {
            for decl in declarations {
                let _ = writeln!(out, "  {};", decl);
            }
            out.push_str("  /* Original declarations above, forwarding below */\n");
        }
        let _ = writeln!(out, "  /* @deprecated Use .{} instead */", new);
        out.push_str("}\n\n");
    }
    out
}
