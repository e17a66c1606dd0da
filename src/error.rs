//! Error types for the crashsort triage engine.
//!
//! This module provides the crate-level error type built with thiserror.
//! Lower layers (I/O, side effects) keep their own error types and are
//! folded into this one where they cross a public boundary.

use std::fmt;
use thiserror::Error;

/// Main error type for crashsort operations.
#[derive(Debug, Error)]
pub enum CrashsortError {
    /// Configuration rejected during validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A signature rule pattern failed to compile
    #[error("Invalid signature rule #{index} ({pattern}): {source}")]
    InvalidRule {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Bounded read or decode failure
    #[error("I/O error: {0}")]
    Io(#[from] crate::io::error::IoError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for crashsort operations
pub type Result<T> = std::result::Result<T, CrashsortError>;

impl From<serde_json::Error> for CrashsortError {
    fn from(err: serde_json::Error) -> Self {
        CrashsortError::Serialization(err.to_string())
    }
}

/// Per-run resource ceilings applied while reading untrusted attachments.
#[derive(Debug, Clone)]
pub struct AnalysisBudget {
    /// Maximum bytes decoded from a single attachment
    pub max_attachment_bytes: u64,
    /// Maximum number of attachments considered per report
    pub max_attachments: usize,
}

impl Default for AnalysisBudget {
    fn default() -> Self {
        Self {
            max_attachment_bytes: 8 * 1024 * 1024, // 8MB
            max_attachments: 64,
        }
    }
}

impl fmt::Display for AnalysisBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Budget: {} bytes per attachment, {} attachments",
            self.max_attachment_bytes, self.max_attachments
        )
    }
}
