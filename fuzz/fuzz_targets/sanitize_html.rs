#![no_main]

use dom_sanitizer::{Context, DomSanitizer, SanitizeOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let sanitizer = DomSanitizer::new(Context::Html);
    let Ok(once) = sanitizer.sanitize_bytes(data, None, &SanitizeOptions::default()) else {
        return;
    };

    let lower = once.to_ascii_lowercase();
    assert!(!lower.contains("<script"), "script survived: {once}");
    assert!(!lower.contains("<iframe"), "iframe survived: {once}");
});
