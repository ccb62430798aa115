#![no_main]

use dom_sanitizer::{Context, DomSanitizer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    for context in [Context::Svg, Context::MathMl] {
        if let Ok(output) = DomSanitizer::new(context).sanitize(input) {
            assert!(!output.contains("<script"), "script survived: {output}");
            assert!(!output.contains("<foreignObject"), "foreignObject survived: {output}");
        }
    }
});
