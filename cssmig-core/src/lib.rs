//! cssmig-core: CSS class audit and rename engine
//!
//! This library builds a declaration model from stylesheets, counts class usage
//! across HTML/JS/TS sources, labels every class with a risk tier and owning
//! component, groups identical rule bodies, and rewrites class references
//! in place under operator control.
//!
//! # Features
//!
//! - **Stylesheet extraction**: class → declarations, selectors and files
//! - **Usage counting**: file-level presence across nine reference patterns
//! - **Risk classification**: HIGH / MEDIUM / LOW from layout-affecting properties
//! - **Component attribution**: naming-convention heuristics with configurable tables
//! - **Duplicate detection**: classes sharing one canonical declaration set
//! - **Interactive rename**: per-occurrence decisions with backup-on-write
//! - **Design tokens**: `var(--x)` usage report and token rewrite
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cssmig_core::prelude::*;
//!
//! let report = CssAudit::new()
//!     .css_files(["styles"])
//!     .source_files(["src"])
//!     .run()?;
//!
//! for group in &report.duplicates {
//!     println!("{}: {}", group.short_hash(), group.classes.join(", "));
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`css`]: Stylesheet parsing and class extraction
//! - [`model`]: The declaration model and its audit document
//! - [`references`]: Class reference detection in markup and script
//! - [`risk`], [`component`], [`duplicates`]: Model annotations
//! - [`audit`]: Builder API tying discovery and analysis together
//! - [`tokens`]: Design-token usage analysis
//! - [`rewrite`]: In-place rename and token rewrite
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `rewrite` (default): Enable the rename engine and file mutation

// Core modules (always available)
pub mod audit;
pub mod component;
pub mod config;
pub mod css;
pub mod deprecated;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod references;
pub mod report;
pub mod risk;
pub mod scan;
pub mod tokens;

// Feature-gated modules
#[cfg(feature = "rewrite")]
pub mod rewrite;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{CssmigError, CssmigResult, IoResultExt};

// Builder API
pub use audit::{
    inspect_source, AuditReport, AuditSession, CssAudit, RiskBreakdown, SkippedFile,
    SourceInspection,
};

// Configuration
pub use config::{load_config, CssmigConfig, Heuristics, OutputConfig, CONFIG_FILE};

// Logging
pub use logging::init_logging;

// Model and annotations
pub use component::{ComponentAttributor, ComponentTables, UNKNOWN_COMPONENT};
pub use duplicates::{declaration_hash, find_duplicates, DuplicateGroup};
pub use model::{AuditEntry, ClassRecord, DeclarationModel};
pub use risk::{RiskClassifier, RiskLevel};

// Extraction
pub use css::{extract_stylesheet, parse_stylesheet};
pub use references::{
    advisory_literals, find_references, referenced_classes, source_classes, MatchKind,
    Reference, ReferenceScanner,
};

// Deprecated stylesheet
pub use deprecated::{load_audit_declarations, render_deprecated_css};

// Reporting
pub use report::{print_audit_summary, print_json, write_audit_outputs, OutputFormat};

// File scanning
pub use scan::{display_path, gather_files, read_source};

// Design tokens
pub use tokens::{defined_tokens, token_references, TokenMapping, TokenReport, TokenUsage};

// Feature-gated re-exports
#[cfg(feature = "rewrite")]
pub use rewrite::{
    AcceptAll, Decision, DecisionStrategy, Occurrence, RenameMapping, RewriteOptions,
    RewriteSummary, Rewriter,
};
