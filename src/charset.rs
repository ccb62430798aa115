//! Character encoding detection and decoding for byte input
//!
//! Markup handed to [`crate::DomSanitizer::sanitize_bytes`] is decoded to UTF-8
//! before parsing. The charset is chosen by a cascade:
//!
//! 1. **Byte order mark**: a UTF-8 or UTF-16 BOM wins outright
//! 2. **Content-Type**: `charset` parameter of a caller-supplied header value
//! 3. **In-document declaration**: `<?xml encoding="...">` for SVG/MathML,
//!    `<meta charset>` or `<meta http-equiv="Content-Type">` for HTML
//! 4. **Default**: UTF-8
//!
//! # Examples
//!
//! ```rust
//! use dom_sanitizer::charset::detect_charset;
//! use dom_sanitizer::Context;
//!
//! let charset = detect_charset(Some("image/svg+xml; charset=ISO-8859-1"), b"<svg/>", Context::Svg);
//! assert_eq!(charset, "ISO-8859-1");
//!
//! let xml = b"<?xml version=\"1.0\" encoding=\"windows-1252\"?><svg/>";
//! assert_eq!(detect_charset(None, xml, Context::Svg), "WINDOWS-1252");
//!
//! assert_eq!(detect_charset(None, b"<p>hi</p>", Context::Html), "UTF-8");
//! ```

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::error::SanitizeError;
use crate::rules::Context;

/// Default charset when detection fails
const DEFAULT_CHARSET: &str = "UTF-8";

/// Maximum bytes to scan for in-document declarations
const DECLARATION_SCAN_LIMIT: usize = 1024;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Detect character encoding using the cascade described in the module docs
///
/// The returned name is normalized to uppercase.
pub fn detect_charset(content_type: Option<&str>, input: &[u8], context: Context) -> String {
    if let Some(charset) = charset_from_bom(input) {
        return charset.to_string();
    }

    if let Some(ct) = content_type
        && let Some(charset) = extract_charset_from_content_type(ct)
    {
        return normalize_charset(&charset);
    }

    let declared = if context.is_xml() {
        extract_charset_from_xml_declaration(input)
    } else {
        extract_charset_from_html(input)
    };
    if let Some(charset) = declared {
        return normalize_charset(&charset);
    }

    DEFAULT_CHARSET.to_string()
}

fn charset_from_bom(input: &[u8]) -> Option<&'static str> {
    if input.starts_with(UTF8_BOM) {
        Some("UTF-8")
    } else if input.starts_with(b"\xFF\xFE") {
        Some("UTF-16LE")
    } else if input.starts_with(b"\xFE\xFF") {
        Some("UTF-16BE")
    } else {
        None
    }
}

/// Extract charset from a Content-Type header value
///
/// # Examples
///
/// ```rust
/// use dom_sanitizer::charset::extract_charset_from_content_type;
///
/// assert_eq!(
///     extract_charset_from_content_type("text/html; charset=\"ISO-8859-1\""),
///     Some("ISO-8859-1".to_string())
/// );
/// assert_eq!(extract_charset_from_content_type("image/svg+xml"), None);
/// ```
pub fn extract_charset_from_content_type(content_type: &str) -> Option<String> {
    static PARAMETER: OnceLock<Option<Regex>> = OnceLock::new();
    first_capture(
        &PARAMETER,
        r#"(?i)(?:^|;)\s*charset\s*=\s*"?([^";,\s]+)"#,
        content_type,
    )
}

/// Extract the `encoding` pseudo-attribute of an XML declaration
///
/// # Examples
///
/// ```rust
/// use dom_sanitizer::charset::extract_charset_from_xml_declaration;
///
/// let xml = b"<?xml version='1.0' encoding='ISO-8859-1'?><svg/>";
/// assert_eq!(extract_charset_from_xml_declaration(xml), Some("ISO-8859-1".to_string()));
/// assert_eq!(extract_charset_from_xml_declaration(b"<svg/>"), None);
/// ```
pub fn extract_charset_from_xml_declaration(input: &[u8]) -> Option<String> {
    static DECLARATION: OnceLock<Option<Regex>> = OnceLock::new();
    first_capture(
        &DECLARATION,
        r#"^\s*<\?xml\s[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#,
        &scan_prefix(input),
    )
}

/// Extract the charset announced by an HTML `<meta>` tag
///
/// Both `<meta charset="...">` and the older
/// `<meta http-equiv="Content-Type" content="...; charset=...">` form are
/// recognized. Only the first 1024 bytes are scanned.
///
/// # Examples
///
/// ```rust
/// use dom_sanitizer::charset::extract_charset_from_html;
///
/// let html = b"<head><meta charset=\"windows-1252\"></head>";
/// assert_eq!(extract_charset_from_html(html), Some("windows-1252".to_string()));
///
/// let html = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=ISO-8859-1\">";
/// assert_eq!(extract_charset_from_html(html), Some("ISO-8859-1".to_string()));
/// ```
pub fn extract_charset_from_html(html: &[u8]) -> Option<String> {
    static META: OnceLock<Option<Regex>> = OnceLock::new();
    first_capture(
        &META,
        r#"(?i)<meta\s[^>]*?(?:charset\s*=\s*["']?|content\s*=\s*["'][^"'>]*charset\s*=\s*)([A-Za-z0-9._:-]+)"#,
        &scan_prefix(html),
    )
}

/// First capture group of a lazily compiled pattern
fn first_capture(
    slot: &'static OnceLock<Option<Regex>>,
    pattern: &str,
    haystack: &str,
) -> Option<String> {
    slot.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()?
        .captures(haystack)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

fn scan_prefix(input: &[u8]) -> Cow<'_, str> {
    let scan_limit = std::cmp::min(input.len(), DECLARATION_SCAN_LIMIT);
    String::from_utf8_lossy(&input[..scan_limit])
}

/// Uppercase a charset label for comparison and reporting
pub fn normalize_charset(charset: &str) -> String {
    charset.to_uppercase()
}

/// Decode input bytes to UTF-8 text in the given charset
///
/// A leading byte order mark is consumed. Malformed sequences are an error
/// rather than being replaced, since a replacement character in the middle of
/// a tag name changes what the parser sees.
///
/// # Errors
///
/// Returns `SanitizeError::EncodingError` for unknown charsets and for input
/// that is invalid in the charset.
pub fn decode_to_utf8<'a>(input: &'a [u8], charset: &str) -> Result<Cow<'a, str>, SanitizeError> {
    let encoding = encoding_rs::Encoding::for_label(charset.as_bytes()).ok_or_else(|| {
        SanitizeError::EncodingError(format!("Unsupported charset '{}'", charset))
    })?;

    if encoding == encoding_rs::UTF_8 {
        let body = input.strip_prefix(UTF8_BOM).unwrap_or(input);
        return std::str::from_utf8(body).map(Cow::Borrowed).map_err(|e| {
            SanitizeError::EncodingError(format!(
                "Invalid UTF-8 at byte position {}: {}",
                e.valid_up_to(),
                e
            ))
        });
    }

    let body = if encoding == encoding_rs::UTF_16LE {
        input.strip_prefix(b"\xFF\xFE").unwrap_or(input)
    } else if encoding == encoding_rs::UTF_16BE {
        input.strip_prefix(b"\xFE\xFF").unwrap_or(input)
    } else {
        input
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            SanitizeError::EncodingError(format!(
                "Invalid byte sequence for charset '{}'",
                charset
            ))
        })
}
