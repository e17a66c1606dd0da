//! Triage decisions and deobfuscation jobs produced by one analysis run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix shared by every deobfuscated trace attachment.
pub const DEOBFUSCATED_SUFFIX: &str = "deobfuscated.txt";

/// The single outcome of analysing a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriageDecision {
    NoAction,
    /// A configured signature matched; `matched_at` is the creation time of
    /// the source that matched.
    ResolveDuplicate {
        ticket_id: String,
        matched_at: DateTime<Utc>,
    },
    ResolveInvalidModded,
    RequestMoreInfo,
}

impl TriageDecision {
    pub fn is_no_action(&self) -> bool {
        matches!(self, TriageDecision::NoAction)
    }
}

impl fmt::Display for TriageDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriageDecision::NoAction => write!(f, "no action"),
            TriageDecision::ResolveDuplicate { ticket_id, .. } => {
                write!(f, "resolve as duplicate of {}", ticket_id)
            }
            TriageDecision::ResolveInvalidModded => write!(f, "resolve as invalid (modded)"),
            TriageDecision::RequestMoreInfo => write!(f, "request more information"),
        }
    }
}

/// A deobfuscated trace waiting to be uploaded as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeobfuscationJob {
    pub source_name: String,
    pub content: String,
}

impl DeobfuscationJob {
    pub fn new(source_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            content: content.into(),
        }
    }

    /// `<stem>-deobfuscated.txt`, with path separators removed from the stem.
    pub fn attachment_name(&self) -> String {
        deobfuscated_name(&self.source_name)
    }
}

/// Derives the attachment name for a deobfuscated copy of `source_name`.
pub fn deobfuscated_name(source_name: &str) -> String {
    let stem = source_name
        .rsplit_once('.')
        .map_or(source_name, |(stem, _)| stem);
    let stem: String = stem.chars().filter(|c| !matches!(c, '/' | '\\')).collect();
    format!("{}-{}", stem, DEOBFUSCATED_SUFFIX)
}
