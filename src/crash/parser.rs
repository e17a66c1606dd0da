//! Text crash parser for engine crash reports and JVM fatal error logs.

use super::patterns::{
    MODDED_MARKERS, RE_DESCRIPTION, RE_ENGINE_HEADER, RE_ENGINE_VERSION, RE_IS_MODDED,
    RE_JAVA_EXCEPTION, RE_JVM_HEADER, RE_OBFUSCATED_FRAME, RE_PROBLEMATIC_FRAME, RE_STACK_FRAME,
};
use crate::core::crash::{CrashCategory, ModdedConfidence};
use crate::triage::classify::{CrashParser, ParsedCrash};
use tracing::trace;

/// Recognizes crash dumps by their textual structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCrashParser;

impl TextCrashParser {
    pub fn new() -> Self {
        Self
    }
}

impl CrashParser for TextCrashParser {
    fn parse(&self, text: &str) -> Option<ParsedCrash> {
        if let Some(header) = RE_ENGINE_HEADER.find(text) {
            trace!("engine crash header found");
            return Some(parse_engine(&text[header.start()..]));
        }
        if let Some(header) = RE_JVM_HEADER.find(text) {
            trace!("jvm fatal error header found");
            return Some(parse_jvm(&text[header.start()..]));
        }
        parse_bare_exception(text)
    }
}

fn parse_engine(text: &str) -> ParsedCrash {
    let engine_version = RE_ENGINE_VERSION
        .captures(text)
        .map(|caps| caps[1].to_string());

    let (exception, fallback) = match RE_DESCRIPTION.captures(text) {
        Some(caps) => {
            // `get(0)` always exists for a successful capture.
            let end = caps.get(0).map_or(0, |m| m.end());
            (exception_block(&text[end..]), caps[1].to_string())
        }
        None => (String::new(), String::new()),
    };
    let signature = exception
        .lines()
        .next()
        .map(str::to_string)
        .unwrap_or(fallback);

    let modded = match RE_IS_MODDED.captures(text) {
        Some(caps) => modded_from_label(&caps[1]),
        None if MODDED_MARKERS.is_match(text) => ModdedConfidence::Likely,
        None => ModdedConfidence::Unknown,
    };

    let obfuscated = engine_version.is_some() && RE_OBFUSCATED_FRAME.is_match(&exception);

    ParsedCrash {
        category: CrashCategory::EngineCrash,
        exception,
        signature,
        modded,
        engine_version,
        obfuscated,
    }
}

fn parse_jvm(text: &str) -> ParsedCrash {
    let exception = text
        .lines()
        .take_while(|line| line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    let signature = match RE_PROBLEMATIC_FRAME.captures(text) {
        Some(caps) => caps[1].to_string(),
        None => exception
            .lines()
            .skip(1)
            .map(|line| line.trim_start_matches('#').trim())
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string(),
    };

    ParsedCrash {
        category: CrashCategory::GenericJvm,
        exception,
        signature,
        modded: ModdedConfidence::Unknown,
        engine_version: None,
        obfuscated: false,
    }
}

fn parse_bare_exception(text: &str) -> Option<ParsedCrash> {
    let caps = RE_JAVA_EXCEPTION.captures(text)?;
    let start = caps.get(1)?.start();
    let exception = exception_block(&text[start..]);
    if !RE_STACK_FRAME.is_match(&exception) {
        return None;
    }
    Some(ParsedCrash {
        category: CrashCategory::GenericJvm,
        signature: caps[1].to_string(),
        exception,
        modded: ModdedConfidence::Unknown,
        engine_version: None,
        obfuscated: false,
    })
}

/// Lines from the first non-blank line up to the next blank line.
fn exception_block(text: &str) -> String {
    text.lines()
        .skip_while(|line| line.trim().is_empty())
        .take_while(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn modded_from_label(label: &str) -> ModdedConfidence {
    let label = label.to_ascii_lowercase();
    if label.starts_with("definitely") {
        ModdedConfidence::Definite
    } else if label.starts_with("very likely") || label.starts_with("probably;") {
        ModdedConfidence::Likely
    } else if label.starts_with("probably not") {
        ModdedConfidence::No
    } else {
        ModdedConfidence::Unknown
    }
}
