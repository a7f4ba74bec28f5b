//! Typed error handling for cssmig.
//!
//! Extraction failures (`Parse`, `Decode`) are recoverable at file granularity;
//! mapping failures are fatal and are raised before any file is touched.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cssmig operations.
#[derive(Error, Debug)]
pub enum CssmigError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Malformed stylesheet
    #[error("Parse error in {path}: {message}")]
    Parse {
        path: PathBuf,
        message: String,
        /// Line number (1-indexed) if available
        line: Option<usize>,
        /// Column number (1-indexed) if available
        column: Option<usize>,
    },

    /// File could not be decoded as UTF-8 text
    #[error("Cannot decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Rename mapping is absent, malformed, or empty after filtering
    #[error("Invalid mapping: {message}")]
    InvalidMapping { message: String },

    /// Malformed `OLD:NEW` pair
    #[error("Invalid mapping pair '{pair}' (should be OLD:NEW)")]
    MissingOperand { pair: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Edits handed to the splicer overlap or fall outside the buffer
    #[error("Edit error in {path}: {message}")]
    Edit { path: PathBuf, message: String },
}

impl CssmigError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a parse error without location.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a parse error with line/column info.
    pub fn parse_at(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    /// Create a decode error.
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-mapping error.
    pub fn invalid_mapping(message: impl Into<String>) -> Self {
        Self::InvalidMapping {
            message: message.into(),
        }
    }

    /// Create a missing-operand error for a CLI pair.
    pub fn missing_operand(pair: impl Into<String>) -> Self {
        Self::MissingOperand { pair: pair.into() }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an edit error.
    pub fn edit(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Edit {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (skip the file, keep going).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Decode { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Parse { path, .. } => Some(path),
            Self::Decode { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::Edit { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for cssmig results.
pub type CssmigResult<T> = Result<T, CssmigError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> CssmigResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> CssmigResult<T> {
        self.map_err(|e| CssmigError::io(path, e))
    }
}
