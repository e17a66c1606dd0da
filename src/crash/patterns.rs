//! Precompiled patterns for recognizing crash dumps in free text.
//!
//! Patterns are line anchored and avoid nested repetition so that scanning
//! attacker-supplied attachments stays linear.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use once_cell::sync::Lazy;
use regex::Regex;

// Engine crash reports
pub static RE_ENGINE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^-{4} Minecraft Crash Report -{4}\s*$"#).expect("valid engine header regex")
});
pub static RE_ENGINE_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*Minecraft Version:\s*(\S+)\s*$"#).expect("valid engine version regex")
});
pub static RE_DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^Description:[ \t]*(.*?)\s*$"#).expect("valid description regex")
});
pub static RE_IS_MODDED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*Is Modded:[ \t]*(.*?)\s*$"#).expect("valid is-modded regex")
});

// JVM fatal error logs (hs_err_pid*.log)
pub static RE_JVM_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^#\s*A fatal error has been detected by the Java Runtime Environment"#)
        .expect("valid jvm header regex")
});
pub static RE_PROBLEMATIC_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^#\s*Problematic frame:\s*\r?\n#\s*(.*?)\s*$"#)
        .expect("valid problematic frame regex")
});

// Java exceptions and stack frames
pub static RE_JAVA_EXCEPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*((?:[A-Za-z_$][\w$]*\.)+[A-Z][\w$]*(?:Exception|Error|Throwable)\b.*?)\s*$"#)
        .expect("valid java exception regex")
});
pub static RE_STACK_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]+at [\w$.<>/]+\("#).expect("valid stack frame regex")
});
pub static RE_FRAME_METHOD: Lazy<Regex> = Lazy::new(|| {
    // Captures the class and method of a frame: `at a.b.C$D.method(`
    Regex::new(r#"\bat ((?:[\w$]+\.)*[\w$]+)\.([\w$<>]+)\("#).expect("valid frame method regex")
});
pub static RE_OBFUSCATED_FRAME: Lazy<Regex> = Lazy::new(|| {
    // Default-package classes of 1-4 lowercase letters with short method names.
    Regex::new(r#"(?m)^[ \t]+at [a-z]{1,4}(?:\$[\w]+)?\.[A-Za-z_$]{1,3}\("#)
        .expect("valid obfuscated frame regex")
});

/// Markers of mod loaders in reports that predate the `Is Modded` line.
pub static MODDED_MARKERS: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostFirst)
        .build([
            "Suspected Mods:",
            "FML:",
            "Fabric Mods:",
            "Forge Mod Loader",
            "OptiFine Version:",
        ])
        .expect("valid modded marker automaton")
});
