//! In-place class and token rewriting.
//!
//! The only part of the crate that writes to the filesystem. Every write is
//! preceded by a byte-identical backup unless backups are disabled.
//!
//! # Example
//!
//! ```ignore
//! use cssmig_core::rewrite::{AcceptAll, RenameMapping, RewriteOptions, Rewriter};
//!
//! let mapping = RenameMapping::from_json(r#"{ "btn": "button" }"#)?;
//! let summary = Rewriter::new(&mapping, RewriteOptions::default(), AcceptAll)
//!     .run(&files)?;
//! println!("{} files rewritten", summary.total_accepted());
//! ```

pub mod backup;
pub mod decision;
pub mod edit;
pub mod engine;
pub mod mapping;
pub mod tokens;

pub use backup::{backup_path, write_with_backup, WriteOutcome, DEFAULT_BACKUP_SUFFIX};
pub use decision::{AcceptAll, Decision, DecisionStrategy, Occurrence, RejectAll};
pub use edit::{apply_edits, Edit};
pub use engine::{FileOutcome, FileStatus, RewriteOptions, RewriteSummary, Rewriter};
pub use mapping::{parse_pair, RenameMapping, COMMENT_MARKERS};
pub use tokens::{install_token_sheet, rewrite_token_files, token_diff, TokenRewriteSummary};
