//! ProGuard-style obfuscation mappings and stack trace deobfuscation.
//!
//! Mapping files list one class per unindented line
//! (`original.Name -> obf:`) followed by indented member lines
//! (`1:4:void tick(int):10:13 -> a`). Only classes and methods are kept;
//! fields never appear in stack frames.

use super::patterns::RE_FRAME_METHOD;
use crate::error::{CrashsortError, Result};
use crate::triage::classify::Deobfuscator;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use tracing::{debug, trace};

static RE_CLASS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\S+) -> (\S+):$"#).expect("valid class mapping regex"));
static RE_METHOD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s+(?:\d+:\d+:)?\S+ ([^\s(]+)\([^)]*\)(?::\d+(?::\d+)?)? -> (\S+)$"#)
        .expect("valid method mapping regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ClassMapping {
    original: String,
    // Obfuscated method name to original; overloads keep the first entry.
    methods: HashMap<String, String>,
}

/// Mappings for a single engine build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    classes: HashMap<String, ClassMapping>,
}

impl MappingTable {
    /// Parses a ProGuard mapping document.
    pub fn parse(text: &str) -> Result<Self> {
        let mut classes: HashMap<String, ClassMapping> = HashMap::new();
        let mut current: Option<String> = None;

        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if !line.starts_with(char::is_whitespace) {
                let caps = RE_CLASS_LINE.captures(line).ok_or_else(|| {
                    CrashsortError::Config(format!("mapping line {}: malformed class", index + 1))
                })?;
                let obfuscated = caps[2].to_string();
                classes.insert(
                    obfuscated.clone(),
                    ClassMapping {
                        original: caps[1].to_string(),
                        methods: HashMap::new(),
                    },
                );
                current = Some(obfuscated);
                continue;
            }

            let Some(class) = current.as_ref().and_then(|c| classes.get_mut(c)) else {
                return Err(CrashsortError::Config(format!(
                    "mapping line {}: member outside of a class",
                    index + 1
                )));
            };
            match RE_METHOD_LINE.captures(line) {
                Some(caps) => {
                    class
                        .methods
                        .entry(caps[2].to_string())
                        .or_insert_with(|| caps[1].to_string());
                }
                None => trace!(line = index + 1, "skipping field mapping"),
            }
        }

        debug!(classes = classes.len(), "parsed mapping table");
        Ok(Self { classes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class(&self, obfuscated: &str) -> Option<&str> {
        self.classes.get(obfuscated).map(|c| c.original.as_str())
    }

    pub fn method(&self, obfuscated_class: &str, obfuscated_method: &str) -> Option<&str> {
        self.classes
            .get(obfuscated_class)?
            .methods
            .get(obfuscated_method)
            .map(String::as_str)
    }

    /// Rewrites every `at class.method(` frame that has a mapping.
    pub fn deobfuscate_trace(&self, trace: &str) -> String {
        RE_FRAME_METHOD
            .replace_all(trace, |caps: &Captures<'_>| {
                let (class, method) = (&caps[1], &caps[2]);
                match self.classes.get(class) {
                    Some(mapping) => {
                        let method = mapping
                            .methods
                            .get(method)
                            .map(String::as_str)
                            .unwrap_or(method);
                        format!("at {}.{}(", mapping.original, method)
                    }
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

/// Deobfuscator backed by one mapping table per engine version.
#[derive(Debug, Clone, Default)]
pub struct MappingDeobfuscator {
    tables: HashMap<String, MappingTable>,
}

impl MappingDeobfuscator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mappings(mut self, version: impl Into<String>, table: MappingTable) -> Self {
        self.tables.insert(version.into(), table);
        self
    }

    pub fn has_version(&self, version: &str) -> bool {
        self.tables.contains_key(version)
    }
}

impl Deobfuscator for MappingDeobfuscator {
    fn deobfuscate(&self, version: &str, trace: &str) -> Option<String> {
        let table = self.tables.get(version)?;
        let out = table.deobfuscate_trace(trace);
        if out == trace {
            None
        } else {
            Some(out)
        }
    }
}
