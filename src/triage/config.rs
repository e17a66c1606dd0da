//! Configuration for the crash triage engine.
//!
//! Provides centralized configuration with sensible defaults. Loading the
//! document from disk is the caller's job; this module parses, validates and
//! compiles it.

use crate::core::crash::{CrashCategory, CrashSignatureRule};
use crate::error::{AnalysisBudget, CrashsortError, Result};
use crate::io::DEFAULT_READ_LIMIT;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Master configuration for crash triage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Crash detection and duplicate rules.
    pub crash: CrashConfig,
    /// Comment templates and link types.
    pub messages: MessagesConfig,
}

impl TriageConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TriageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.crash.validate()?;
        self.messages.validate()
    }
}

/// One known crash as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRuleConfig {
    /// `minecraft` or `java`
    #[serde(rename = "type")]
    pub category: CrashCategory,
    /// Regular expression matched against the normalized signature.
    #[serde(rename = "exceptionRegex", alias = "pattern")]
    pub pattern: String,
    /// Ticket that tracks this crash.
    pub duplicates: String,
}

impl SignatureRuleConfig {
    pub fn new(
        category: CrashCategory,
        pattern: impl Into<String>,
        duplicates: impl Into<String>,
    ) -> Self {
        Self {
            category,
            pattern: pattern.into(),
            duplicates: duplicates.into(),
        }
    }
}

/// Crash detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashConfig {
    /// Attachment extensions that may contain crash text (case-sensitive).
    pub crash_extensions: Vec<String>,
    /// Ordered known-crash rules. The first matching rule wins per source.
    pub duplicates: Vec<SignatureRuleConfig>,
    /// Maximum bytes decoded from a single attachment.
    pub max_attachment_bytes: u64,
    /// Maximum number of attachments analysed per report.
    pub max_attachments: usize,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            crash_extensions: vec!["txt".into(), "log".into()],
            duplicates: Vec::new(),
            max_attachment_bytes: DEFAULT_READ_LIMIT,
            max_attachments: AnalysisBudget::default().max_attachments,
        }
    }
}

impl CrashConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_attachment_bytes == 0 {
            return Err(CrashsortError::Config(
                "max_attachment_bytes must be greater than zero".into(),
            ));
        }
        if let Some(ext) = self
            .crash_extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(CrashsortError::Config(format!(
                "crash extension '{}' must be a bare suffix",
                ext
            )));
        }
        self.compile_rules().map(|_| ())
    }

    /// Compiles the configured rules, preserving their order.
    pub fn compile_rules(&self) -> Result<Vec<CrashSignatureRule>> {
        self.duplicates
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let pattern =
                    Regex::new(&rule.pattern).map_err(|source| CrashsortError::InvalidRule {
                        index,
                        pattern: rule.pattern.clone(),
                        source,
                    })?;
                Ok(CrashSignatureRule::new(
                    rule.category,
                    pattern,
                    rule.duplicates.clone(),
                ))
            })
            .collect()
    }

    pub fn budget(&self) -> AnalysisBudget {
        AnalysisBudget {
            max_attachment_bytes: self.max_attachment_bytes,
            max_attachments: self.max_attachments,
        }
    }
}

/// Comment templates and link types used by triage actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Template posted when resolving as a duplicate of a known crash.
    pub duplicate_message: String,
    /// Template posted when resolving a modded crash as invalid.
    pub modded_message: String,
    /// Template posted when a crash is mentioned but no crash report is attached.
    pub missing_crash_message: String,
    /// Link type created towards the duplicated ticket.
    pub duplicate_link_type: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            duplicate_message: "duplicate-tech".into(),
            modded_message: "modified-game".into(),
            missing_crash_message: "provide-crash-report".into(),
            duplicate_link_type: "Duplicate".into(),
        }
    }
}

impl MessagesConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("duplicate_message", &self.duplicate_message),
            ("modded_message", &self.modded_message),
            ("missing_crash_message", &self.missing_crash_message),
            ("duplicate_link_type", &self.duplicate_link_type),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(CrashsortError::Config(format!("{} must not be empty", name))),
            None => Ok(()),
        }
    }
}
