#![no_main]
use crashsort::triage::classify::{normalize_signature, CrashParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let Some(parsed) = crashsort::crash::TextCrashParser::new().parse(&text) {
        let _ = normalize_signature(&parsed.signature);
    }
});
