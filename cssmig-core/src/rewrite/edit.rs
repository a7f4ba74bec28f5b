//! Offset-based splicing.
//!
//! Edits are applied from the highest start offset down, so every offset still
//! refers to the original text when its edit is spliced in.

use std::path::Path;

use crate::error::{CssmigError, CssmigResult};

/// Replace `text[start..end]` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }
}

/// Apply non-overlapping edits to `text`. `path` is for error context only.
pub fn apply_edits(path: &Path, text: &str, mut edits: Vec<Edit>) -> CssmigResult<String> {
    edits.sort_by(|a, b| b.start.cmp(&a.start).then_with(|| b.end.cmp(&a.end)));

    let mut out = text.to_string();
    let mut floor = text.len();
    for edit in &edits {
        if edit.start > edit.end || edit.end > text.len() {
            return Err(CssmigError::edit(
                path,
                format!("edit {}..{} outside buffer of {} bytes", edit.start, edit.end, text.len()),
            ));
        }
        if !text.is_char_boundary(edit.start) || !text.is_char_boundary(edit.end) {
            return Err(CssmigError::edit(
                path,
                format!("edit {}..{} splits a character", edit.start, edit.end),
            ));
        }
        if edit.end > floor {
            return Err(CssmigError::edit(
                path,
                format!("edit {}..{} overlaps a later edit", edit.start, edit.end),
            ));
        }
        out.replace_range(edit.start..edit.end, &edit.replacement);
        floor = edit.start;
    }
    Ok(out)
}
