//! Shallow stylesheet scanner.
//!
//! Recognises top-level style rules and skips every at-rule (statement or
//! block) together with whatever it nests. Declaration values are kept as
//! written; only the edges are trimmed. Property names are lower-cased except
//! custom properties (`--x`), which are case-sensitive.
//!
//! All structural characters are ASCII, so scanning works on bytes and every
//! slice boundary falls on a UTF-8 character boundary.

use crate::error::{CssmigError, CssmigResult};

/// One top-level style rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Selectors split at top-level commas, whitespace collapsed.
    pub selectors: Vec<String>,
    /// `"property: value"` strings in source order.
    pub declarations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
    pub skipped_at_rules: usize,
}

/// Parse stylesheet text. `file` is only used for error context.
pub fn parse_stylesheet(file: &str, text: &str) -> CssmigResult<Stylesheet> {
    let cleaned = strip_comments(file, text)?;
    Scanner {
        file,
        text: &cleaned,
        bytes: cleaned.as_bytes(),
        pos: 0,
    }
    .run()
}

/// Blank out `/* … */` comments, keeping newlines so offsets and line numbers
/// still refer to the input.
fn strip_comments(file: &str, text: &str) -> CssmigResult<String> {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = string_end(bytes, i)
                    .ok_or_else(|| located(file, text, i, "unterminated string"))?;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let close = find_subslice(&bytes[i + 2..], b"*/")
                    .map(|rel| i + 2 + rel + 2)
                    .ok_or_else(|| located(file, text, i, "unterminated comment"))?;
                for b in &mut out[i..close] {
                    if *b != b'\n' {
                        *b = b' ';
                    }
                }
                i = close;
            }
            _ => i += 1,
        }
    }

    String::from_utf8(out).map_err(|e| CssmigError::parse(file, e.to_string()))
}

struct Scanner<'a> {
    file: &'a str,
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn run(mut self) -> CssmigResult<Stylesheet> {
        let mut sheet = Stylesheet::default();
        loop {
            self.skip_whitespace();
            let Some(&b) = self.bytes.get(self.pos) else {
                break;
            };
            match b {
                b'@' => {
                    self.skip_at_rule()?;
                    sheet.skipped_at_rules += 1;
                }
                b'}' => return Err(self.error_at(self.pos, "unexpected '}'")),
                b';' => self.pos += 1,
                _ => {
                    if let Some(rule) = self.style_rule()? {
                        sheet.rules.push(rule);
                    }
                }
            }
        }
        Ok(sheet)
    }

    fn skip_whitespace(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn skip_at_rule(&mut self) -> CssmigResult<()> {
        match find_top_level(self.bytes, self.pos, &[b';', b'{']) {
            None => self.pos = self.bytes.len(),
            Some(i) if self.bytes[i] == b';' => self.pos = i + 1,
            Some(open) => {
                let close = matching_brace(self.bytes, open)
                    .ok_or_else(|| self.error_at(open, "unclosed block"))?;
                self.pos = close + 1;
            }
        }
        Ok(())
    }

    fn style_rule(&mut self) -> CssmigResult<Option<StyleRule>> {
        let start = self.pos;
        let open = match find_top_level(self.bytes, start, &[b'{', b'}']) {
            Some(i) if self.bytes[i] == b'{' => i,
            Some(i) => return Err(self.error_at(i, "unexpected '}'")),
            None => return Err(self.error_at(start, "expected '{' after selector")),
        };
        let close =
            matching_brace(self.bytes, open).ok_or_else(|| self.error_at(open, "unclosed block"))?;
        self.pos = close + 1;

        let selectors: Vec<String> = split_top_level(&self.text[start..open], b',')
            .into_iter()
            .map(collapse_whitespace)
            .filter(|s| !s.is_empty())
            .collect();
        if selectors.is_empty() {
            return Ok(None);
        }

        Ok(Some(StyleRule {
            selectors,
            declarations: parse_declarations(&self.text[open + 1..close]),
        }))
    }

    fn error_at(&self, offset: usize, message: &str) -> CssmigError {
        located(self.file, self.text, offset, message)
    }
}

fn located(file: &str, text: &str, offset: usize, message: &str) -> CssmigError {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = text[line_start..offset].chars().count() + 1;
    CssmigError::parse_at(file, message, line, column)
}

/// `"property: value"` strings from a rule body. Nested blocks are ignored.
fn parse_declarations(body: &str) -> Vec<String> {
    split_top_level(body, b';')
        .into_iter()
        .filter(|segment| !segment.contains('{'))
        .filter_map(|segment| {
            let (property, value) = segment.split_once(':')?;
            let property = property.trim();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            let property = if property.starts_with("--") {
                property.to_string()
            } else {
                property.to_ascii_lowercase()
            };
            Some(format!("{}: {}", property, value))
        })
        .collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split on `sep` outside strings and bracket pairs.
fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = string_end(bytes, i).unwrap_or(bytes.len());
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b if b == sep && depth == 0 => {
                parts.push(&s[last..i]);
                last = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&s[last..]);
    parts
}

/// First byte in `stops` at paren/bracket depth zero, outside strings.
fn find_top_level(bytes: &[u8], from: usize, stops: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' | b'\'' => {
                i = string_end(bytes, i)?;
                continue;
            }
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            _ if depth == 0 && stops.contains(&b) => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the `}` closing the `{` at `open`.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = string_end(bytes, i)?;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index just past the string starting at `start`, honoring backslash escapes.
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
