//! Per-occurrence rename decisions.

use std::path::PathBuf;

use crate::references::MatchKind;

/// Operator answer for one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
    /// Accept this and every later occurrence of the run without asking.
    AcceptAll,
    /// Discard every edit queued for the current file and move on.
    SkipFile,
    /// Discard the current file's edits and stop the run.
    Quit,
}

/// One candidate rename, as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub file: PathBuf,
    /// 1-based
    pub line_number: usize,
    /// The full source line containing the reference.
    pub line: String,
    /// Byte offset of the reference within `line`.
    pub column: usize,
    pub start: usize,
    pub end: usize,
    pub kind: MatchKind,
    pub context: String,
    pub old: String,
    pub new: String,
}

/// Source of decisions for the rewrite engine.
pub trait DecisionStrategy {
    fn decide(&mut self, occurrence: &Occurrence) -> Decision;
}

/// Accept everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl DecisionStrategy for AcceptAll {
    fn decide(&mut self, _occurrence: &Occurrence) -> Decision {
        Decision::Accept
    }
}

/// Decline everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl DecisionStrategy for RejectAll {
    fn decide(&mut self, _occurrence: &Occurrence) -> Decision {
        Decision::Reject
    }
}

impl<F> DecisionStrategy for F
where
    F: FnMut(&Occurrence) -> Decision,
{
    fn decide(&mut self, occurrence: &Occurrence) -> Decision {
        self(occurrence)
    }
}
