//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use cssmig_core::prelude::*;
//! ```

// Core types
pub use crate::error::{CssmigError, CssmigResult};
pub use crate::model::{ClassRecord, DeclarationModel};
pub use crate::risk::RiskLevel;

// Audit
pub use crate::audit::{AuditReport, CssAudit};
pub use crate::duplicates::DuplicateGroup;

// Configuration
pub use crate::config::{load_config, CssmigConfig, Heuristics};

// File scanning
pub use crate::scan::gather_files;

// Rename
#[cfg(feature = "rewrite")]
pub use crate::rewrite::{Decision, DecisionStrategy, RenameMapping, RewriteOptions, Rewriter};
