//! Crash sources, classifications and signature rules.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a candidate crash text was found on a report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrashOrigin {
    Description,
    Attachment(String),
}

impl CrashOrigin {
    /// The attachment file name, if this source is an attachment.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            CrashOrigin::Description => None,
            CrashOrigin::Attachment(name) => Some(name),
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &str {
        self.file_name().unwrap_or("<description>")
    }
}

/// Candidate text gathered from one report for a single analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashSource {
    pub origin: CrashOrigin,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl CrashSource {
    pub fn new(origin: CrashOrigin, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            origin,
            text: text.into(),
            created_at,
        }
    }

    pub fn description(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(CrashOrigin::Description, text, created_at)
    }

    pub fn attachment(
        name: impl Into<String>,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::new(CrashOrigin::Attachment(name.into()), text, created_at)
    }
}

/// Coarse kind of crash dump recognized by the structural parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrashCategory {
    /// JVM fatal error logs and bare Java exceptions
    #[serde(rename = "java", alias = "jvm")]
    GenericJvm,
    /// Game engine crash reports
    #[serde(rename = "minecraft", alias = "engine")]
    EngineCrash,
    #[serde(rename = "unknown")]
    Unknown,
}

impl fmt::Display for CrashCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrashCategory::GenericJvm => write!(f, "java"),
            CrashCategory::EngineCrash => write!(f, "minecraft"),
            CrashCategory::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for CrashCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "java" | "jvm" => Ok(CrashCategory::GenericJvm),
            "minecraft" | "engine" => Ok(CrashCategory::EngineCrash),
            "unknown" => Ok(CrashCategory::Unknown),
            other => Err(format!("unknown crash category '{}'", other)),
        }
    }
}

/// How strongly a crash indicates a modified game client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModdedConfidence {
    No,
    Unknown,
    Likely,
    Definite,
}

impl ModdedConfidence {
    /// `Likely` and `Definite` both count as modded.
    pub fn is_modded(self) -> bool {
        matches!(self, ModdedConfidence::Likely | ModdedConfidence::Definite)
    }

    /// Only an explicit `No` counts as counter-evidence.
    pub fn is_vanilla(self) -> bool {
        self == ModdedConfidence::No
    }
}

/// A crash source after classification. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedCrash {
    pub source: CrashSource,
    pub category: CrashCategory,
    /// Normalized exception signature used for rule matching.
    pub signature: String,
    pub modded: ModdedConfidence,
    /// Full exception text as it appeared in the source.
    pub exception: String,
    pub engine_version: Option<String>,
    pub deobfuscated: Option<String>,
}

impl ClassifiedCrash {
    pub fn created_at(&self) -> DateTime<Utc> {
        self.source.created_at
    }

    pub fn file_name(&self) -> Option<&str> {
        self.source.origin.file_name()
    }
}

/// A configured known crash: category, signature pattern and the ticket
/// that tracks it.
#[derive(Debug, Clone)]
pub struct CrashSignatureRule {
    pub category: CrashCategory,
    pub pattern: Regex,
    pub duplicate_ticket_id: String,
}

impl CrashSignatureRule {
    pub fn new(
        category: CrashCategory,
        pattern: Regex,
        duplicate_ticket_id: impl Into<String>,
    ) -> Self {
        Self {
            category,
            pattern,
            duplicate_ticket_id: duplicate_ticket_id.into(),
        }
    }

    pub fn matches(&self, crash: &ClassifiedCrash) -> bool {
        self.category == crash.category && self.pattern.is_match(&crash.signature)
    }
}
