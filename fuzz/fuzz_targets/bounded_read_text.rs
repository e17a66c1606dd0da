#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limit = data.first().copied().unwrap_or(0) as u64;
    if let Ok(text) = crashsort::io::read_text(data, limit) {
        assert!(text.len() <= limit as usize * 3 + 3);
    }
});
