//! Crash classification: the parser seam and the adapter that normalizes
//! parser output into `ClassifiedCrash` records.

use crate::core::crash::{ClassifiedCrash, CrashCategory, CrashSource, ModdedConfidence};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

/// Raw result of a structural crash parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCrash {
    pub category: CrashCategory,
    /// Full exception block.
    pub exception: String,
    /// Exception signature before normalization.
    pub signature: String,
    pub modded: ModdedConfidence,
    pub engine_version: Option<String>,
    /// The trace carries obfuscated frames that a deobfuscator can map.
    pub obfuscated: bool,
}

/// Structural crash parser. Returns `None` for text that is not a crash.
pub trait CrashParser {
    fn parse(&self, text: &str) -> Option<ParsedCrash>;
}

/// Maps obfuscated frames of an engine build back to readable names.
pub trait Deobfuscator {
    fn deobfuscate(&self, version: &str, trace: &str) -> Option<String>;
}

// `@1a2b3c` identity hashes and `$$Lambda$123/0x0000...` synthetic suffixes
static RE_IDENTITY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@[0-9a-fA-F]{4,}\b"#).expect("valid identity suffix regex"));
static RE_LAMBDA_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\$\$Lambda\$\d+(?:/0x[0-9a-fA-F]+)?(?:@[0-9a-fA-F]+)?"#)
        .expect("valid lambda suffix regex")
});

/// Normalizes an exception signature so it is stable across runs.
pub fn normalize_signature(signature: &str) -> String {
    let stripped = RE_LAMBDA_SUFFIX.replace_all(signature, "$$$$Lambda");
    let stripped = RE_IDENTITY_SUFFIX.replace_all(&stripped, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Runs a parser over crash sources and builds classified records.
pub struct ClassifierAdapter<'a> {
    parser: &'a dyn CrashParser,
    deobfuscator: Option<&'a dyn Deobfuscator>,
}

impl<'a> ClassifierAdapter<'a> {
    pub fn new(parser: &'a dyn CrashParser) -> Self {
        Self {
            parser,
            deobfuscator: None,
        }
    }

    pub fn with_deobfuscator(mut self, deobfuscator: &'a dyn Deobfuscator) -> Self {
        self.deobfuscator = Some(deobfuscator);
        self
    }

    /// Classifies one source; sources that are not crashes are dropped.
    pub fn classify(&self, source: CrashSource) -> Option<ClassifiedCrash> {
        let Some(parsed) = self.parser.parse(&source.text) else {
            trace!(source = source.origin.label(), "not a crash");
            return None;
        };

        let deobfuscated = match (&parsed.engine_version, self.deobfuscator) {
            (Some(version), Some(deobfuscator))
                if parsed.obfuscated && parsed.category == CrashCategory::EngineCrash =>
            {
                deobfuscator.deobfuscate(version, &parsed.exception)
            }
            _ => None,
        };

        let crash = ClassifiedCrash {
            signature: normalize_signature(&parsed.signature),
            category: parsed.category,
            modded: parsed.modded,
            exception: parsed.exception,
            engine_version: parsed.engine_version,
            deobfuscated,
            source,
        };

        debug!(
            source = crash.source.origin.label(),
            category = %crash.category,
            modded = ?crash.modded,
            signature = %crash.signature,
            deobfuscated = crash.deobfuscated.is_some(),
            "classified crash"
        );
        Some(crash)
    }

    /// Classifies every source, keeping discovery order.
    pub fn classify_all(&self, sources: Vec<CrashSource>) -> Vec<ClassifiedCrash> {
        sources
            .into_iter()
            .filter_map(|source| self.classify(source))
            .collect()
    }
}
