//! Single-keystroke rename prompt.

use console::{style, Term};

use cssmig_core::rewrite::{Decision, DecisionStrategy, Occurrence};

const KEYS: &str = "[y/n/s/a/q]";

/// Maps a keystroke to a decision; `None` means ask again.
pub fn decision_for_key(key: char) -> Option<Decision> {
    match key.to_ascii_lowercase() {
        'y' => Some(Decision::Accept),
        'n' => Some(Decision::Reject),
        's' => Some(Decision::SkipFile),
        'a' => Some(Decision::AcceptAll),
        'q' => Some(Decision::Quit),
        _ => None,
    }
}

/// Shows each occurrence with the class highlighted and waits for one key.
pub struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.term.is_term()
    }

    fn show(&self, occurrence: &Occurrence) -> std::io::Result<()> {
        self.term.write_line("")?;
        self.term.write_line(&format!(
            "{}:{} [{}]",
            style(occurrence.file.display()).bold(),
            occurrence.line_number,
            style(occurrence.kind).dim()
        ))?;
        self.term
            .write_line(&format!("  {}", highlight(occurrence)))?;
        self.term.write_str(&format!(
            "Replace '{}' → '{}'? {} ",
            occurrence.old, occurrence.new, KEYS
        ))
    }

    fn read_decision(&self) -> std::io::Result<Decision> {
        loop {
            let key = self.term.read_char()?;
            if let Some(decision) = decision_for_key(key) {
                self.term.write_line(&key.to_string())?;
                return Ok(decision);
            }
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionStrategy for TerminalPrompt {
    fn decide(&mut self, occurrence: &Occurrence) -> Decision {
        let answer = self.show(occurrence).and_then(|_| self.read_decision());
        match answer {
            Ok(decision) => decision,
            Err(e) => {
                // A closed or non-interactive stdin cannot answer; stop cleanly.
                tracing::warn!(error = %e, "Prompt input unavailable; quitting");
                Decision::Quit
            }
        }
    }
}

/// The occurrence's line with the old class name in yellow.
fn highlight(occurrence: &Occurrence) -> String {
    let line = &occurrence.line;
    let start = occurrence.column;
    let end = start + (occurrence.end - occurrence.start);
    match (line.get(..start), line.get(start..end), line.get(end..)) {
        (Some(before), Some(class), Some(after)) => {
            format!("{}{}{}", before, style(class).yellow().bold(), after)
        }
        _ => line.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cssmig_core::MatchKind;
    use std::path::PathBuf;

    #[test]
    fn test_decision_keys() {
        assert_eq!(decision_for_key('y'), Some(Decision::Accept));
        assert_eq!(decision_for_key('N'), Some(Decision::Reject));
        assert_eq!(decision_for_key('s'), Some(Decision::SkipFile));
        assert_eq!(decision_for_key('a'), Some(Decision::AcceptAll));
        assert_eq!(decision_for_key('q'), Some(Decision::Quit));
        assert_eq!(decision_for_key('x'), None);
        assert_eq!(decision_for_key('\n'), None);
    }

    #[test]
    fn test_highlight_keeps_surrounding_text() {
        console::set_colors_enabled(false);
        let occurrence = Occurrence {
            file: PathBuf::from("a.jsx"),
            line_number: 3,
            line: r#"  <a className="btn big">"#.to_string(),
            column: 16,
            start: 40,
            end: 43,
            kind: MatchKind::ClassAttribute,
            context: r#"className="btn big""#.to_string(),
            old: "btn".to_string(),
            new: "button".to_string(),
        };
        assert_eq!(highlight(&occurrence), r#"  <a className="btn big">"#);

        let out_of_range = Occurrence {
            column: 99,
            ..occurrence
        };
        assert_eq!(highlight(&out_of_range), out_of_range.line);
    }
}
