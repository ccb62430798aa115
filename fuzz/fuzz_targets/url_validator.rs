#![no_main]

use dom_sanitizer::security::{is_safe_url, url_scheme};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = std::str::from_utf8(data) else {
        return;
    };

    let schemes = ["http", "https", "mailto"];
    if is_safe_url(value, &schemes) {
        let scheme = url_scheme(value);
        assert!(
            !matches!(scheme.as_deref(), Some("javascript" | "vbscript" | "data")),
            "unsafe scheme accepted: {value:?}"
        );
    }
});
