//! Attribute-level threat checks
//!
//! This module holds the checks the walker applies on top of the allow-lists:
//! - Event handler detection (`on*` attribute names)
//! - URL scheme validation for URL-valued attributes
//! - `srcset` candidate validation
//! - Nesting depth limits
//!
//! # Threat Model
//!
//! Input is untrusted markup that may carry:
//! - Event handlers (onclick, onload, onbegin on SVG animation, ...)
//! - `javascript:` / `vbscript:` URLs, possibly obfuscated with embedded
//!   tabs, newlines, or leading control characters
//! - `data:` URLs wrapping HTML or SVG documents
//! - Pathologically deep nesting
//!
//! Entity references are already decoded by the parser before these checks
//! run, so `&#106;avascript:` arrives here as `javascript:`.

/// Maximum allowed nesting depth for elements
pub const MAX_NESTING_DEPTH: usize = 1000;

/// Schemes rejected even if a caller-supplied scheme list contains them
const SCRIPT_SCHEMES: &[&str] = &["javascript", "vbscript", "livescript", "mocha"];

/// Media types accepted in `data:` URLs on image-bearing tags
const SAFE_DATA_IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/gif",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/bmp",
];

/// Action to take for one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeVerdict {
    /// Keep the attribute verbatim
    Keep,
    /// Event handler, removed unconditionally
    EventHandler,
    /// Not on the effective allow-list
    NotAllowed,
    /// URL attribute with an unsafe scheme
    UnsafeUrl,
}

/// Security validator shared by every walk of one sanitizer instance
#[derive(Debug, Clone, Copy)]
pub struct SecurityValidator {
    /// Maximum allowed nesting depth
    max_depth: usize,
}

impl SecurityValidator {
    /// Create a new security validator with default settings
    pub fn new() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
        }
    }

    /// Create a security validator with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Maximum element nesting depth enforced by this validator
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Check if an attribute name is an inline event handler
    ///
    /// Any name starting with `on` (ASCII case-insensitive) matches, so handlers
    /// introduced after these lists were written are still caught. For
    /// namespace-qualified names the local part is checked as well.
    ///
    /// # Examples
    ///
    /// ```
    /// use dom_sanitizer::security::SecurityValidator;
    ///
    /// let validator = SecurityValidator::new();
    /// assert!(validator.is_event_handler("onclick"));
    /// assert!(validator.is_event_handler("OnBegin"));
    /// assert!(validator.is_event_handler("ev:onload"));
    /// assert!(!validator.is_event_handler("href"));
    /// assert!(!validator.is_event_handler("opacity"));
    /// ```
    pub fn is_event_handler(&self, attr_name: &str) -> bool {
        let local = attr_name
            .rsplit_once(':')
            .map_or(attr_name, |(_, local)| local);
        starts_with_on(attr_name) || starts_with_on(local)
    }

    /// Validate nesting depth
    ///
    /// # Examples
    ///
    /// ```
    /// use dom_sanitizer::security::SecurityValidator;
    ///
    /// let validator = SecurityValidator::with_max_depth(100);
    /// assert!(validator.validate_depth(50).is_ok());
    /// assert!(validator.validate_depth(150).is_err());
    /// ```
    pub fn validate_depth(&self, depth: usize) -> Result<(), String> {
        if depth > self.max_depth {
            Err(format!(
                "nesting depth {} exceeds maximum allowed depth {}",
                depth, self.max_depth
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for SecurityValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn starts_with_on(name: &str) -> bool {
    name.get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

/// Remove every character a browser ignores while locating the scheme
///
/// Browsers strip leading C0 controls and spaces and drop tabs and newlines
/// anywhere in the URL. Removing all control characters and whitespace is a
/// superset of that, so nothing a browser would read as a scheme survives
/// here unnoticed.
fn strip_ignorable(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() && !c.is_whitespace())
        .collect()
}

/// Extract the lowercased scheme of a URL, if it has one
///
/// A scheme is the text before the first `:` when that `:` comes before any
/// `/`, `?` or `#`.
///
/// # Examples
///
/// ```
/// use dom_sanitizer::security::url_scheme;
///
/// assert_eq!(url_scheme("HTTPS://example.com").as_deref(), Some("https"));
/// assert_eq!(url_scheme(" jav\tascript:alert(1)").as_deref(), Some("javascript"));
/// assert_eq!(url_scheme("/path:with/colon"), None);
/// assert_eq!(url_scheme("#frag"), None);
/// ```
pub fn url_scheme(value: &str) -> Option<String> {
    let cleaned = strip_ignorable(value);
    let end = cleaned.find([':', '/', '?', '#'])?;
    if cleaned[end..].starts_with(':') {
        Some(cleaned[..end].to_ascii_lowercase())
    } else {
        None
    }
}

/// Check whether a URL-valued attribute is safe to keep
///
/// Relative URLs are always safe. Absolute URLs are safe iff their scheme is
/// in `allowed_schemes` and is not a script scheme.
///
/// # Examples
///
/// ```
/// use dom_sanitizer::security::is_safe_url;
///
/// let schemes = ["http", "https", "mailto"];
/// assert!(is_safe_url("https://example.com", &schemes));
/// assert!(is_safe_url("/relative/path", &schemes));
/// assert!(is_safe_url("MAILTO:someone@example.com", &schemes));
/// assert!(!is_safe_url("javascript:alert('xss')", &schemes));
/// assert!(!is_safe_url("\u{1}java\nscript:alert(1)", &schemes));
/// assert!(!is_safe_url("data:text/html,<script>alert(1)</script>", &schemes));
/// ```
pub fn is_safe_url(value: &str, allowed_schemes: &[&str]) -> bool {
    match url_scheme(value) {
        None => true,
        Some(scheme) => {
            !SCRIPT_SCHEMES.contains(&scheme.as_str())
                && allowed_schemes
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(&scheme))
        }
    }
}

/// Check whether a `data:` URL carries a raster image
///
/// # Examples
///
/// ```
/// use dom_sanitizer::security::is_safe_data_url;
///
/// assert!(is_safe_data_url("data:image/png;base64,iVBORw0KGgo="));
/// assert!(!is_safe_data_url("data:image/svg+xml;base64,PHN2Zz4="));
/// assert!(!is_safe_data_url("data:text/html,<script>"));
/// ```
pub fn is_safe_data_url(value: &str) -> bool {
    let cleaned = strip_ignorable(value);
    let Some((scheme, rest)) = cleaned.split_once(':') else {
        return false;
    };
    if !scheme.eq_ignore_ascii_case("data") {
        return false;
    }
    let media_type = rest
        .split([';', ','])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    SAFE_DATA_IMAGE_TYPES.contains(&media_type.as_str())
}

/// Check every candidate URL of a `srcset` value
///
/// # Examples
///
/// ```
/// use dom_sanitizer::security::is_safe_srcset;
///
/// let schemes = ["http", "https"];
/// assert!(is_safe_srcset("a.png 1x, https://cdn.example.com/b.png 2x", &schemes));
/// assert!(!is_safe_srcset("a.png 1x, javascript:alert(1) 2x", &schemes));
/// ```
pub fn is_safe_srcset(value: &str, allowed_schemes: &[&str]) -> bool {
    value
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .all(|url| is_safe_url(url, allowed_schemes))
}
