//! Tag walk over HTML collecting `class` attribute tokens.
//!
//! Intentionally simple: no full HTML parser. Comments are skipped, and the
//! raw text of `<script>` / `<style>` elements is not treated as markup.

use std::collections::BTreeSet;

use super::matchers::{is_class_name, word_spans};

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Union of every `class` attribute's whitespace-separated tokens.
pub fn html_class_tokens(html: &str) -> BTreeSet<String> {
    let mut classes = BTreeSet::new();
    let lower = html.to_ascii_lowercase();
    let mut pos = 0;

    while let Some(rel) = html[pos..].find('<') {
        let open = pos + rel;
        let rest = &html[open..];

        if rest.starts_with("<!--") {
            pos = rest
                .find("-->")
                .map_or(html.len(), |end| open + end + 3);
            continue;
        }

        let Some(tag_len) = find_tag_end(rest) else {
            break;
        };
        let tag = &rest[..tag_len];
        pos = open + tag_len;

        let name = tag_name(tag);
        if name.is_empty() || tag.starts_with("</") {
            continue;
        }

        for value in class_attribute_values(tag) {
            classes.extend(
                word_spans(value)
                    .into_iter()
                    .map(|(s, e)| &value[s..e])
                    .filter(|t| is_class_name(t))
                    .map(String::from),
            );
        }

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let closing = format!("</{}", name);
            pos = lower[pos..]
                .find(&closing)
                .map_or(html.len(), |end| pos + end);
        }
    }

    classes
}

/// Length of the tag starting at `<`, honoring quoted attribute values.
fn find_tag_end(tag: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, ch) in tag.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Values of every `class` attribute in one tag (quoted or bare).
fn class_attribute_values(tag: &str) -> Vec<&str> {
    let bytes = tag.as_bytes();
    let mut values = Vec::new();
    // skip `<name`
    let mut i = 1 + tag[1..]
        .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
        .unwrap_or(tag.len() - 1);

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() || bytes[i] == b'/' {
            i += 1;
            continue;
        }
        let name_start = i;
        while i < bytes.len()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
            && !bytes[i].is_ascii_whitespace()
        {
            i += 1;
        }
        let name = &tag[name_start..i];
        if name_start == i {
            // `>` or stray `=`
            i += 1;
            continue;
        }

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = match bytes.get(i) {
            Some(&q) if q == b'"' || q == b'\'' => {
                let start = i + 1;
                let end = bytes[start..]
                    .iter()
                    .position(|&b| b == q)
                    .map_or(bytes.len(), |rel| start + rel);
                i = (end + 1).min(bytes.len());
                &tag[start..end]
            }
            Some(_) => {
                let start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                &tag[start..i]
            }
            None => "",
        };

        if name.eq_ignore_ascii_case("class") {
            values.push(value);
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(html: &str) -> Vec<String> {
        html_class_tokens(html).into_iter().collect()
    }

    #[test]
    fn test_quoted_and_bare_attributes() {
        assert_eq!(
            tokens(r#"<div class="a b"><p CLASS='c'><span class=d>x</span>"#),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn test_quoted_gt_inside_attribute() {
        assert_eq!(
            tokens(r#"<a title="x > y" class="link">go</a>"#),
            vec!["link"]
        );
    }

    #[test]
    fn test_script_and_style_bodies_ignored() {
        let html = r#"<script>const t = "<div class='fake'>";</script><style>.x{}</style><i class="real">"#;
        assert_eq!(tokens(html), vec!["real"]);
    }

    #[test]
    fn test_script_tag_own_class_counted() {
        assert_eq!(tokens(r#"<script class="boot"></script>"#), vec!["boot"]);
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(tokens(r#"<!-- <b class="old"> --><b class="new">"#), vec!["new"]);
    }

    #[test]
    fn test_data_class_not_confused() {
        assert_eq!(tokens(r#"<div data-class="no" class="yes">"#), vec!["yes"]);
    }

    #[test]
    fn test_unterminated_tag() {
        assert!(tokens("<div class=\"a\"").is_empty());
    }
}
