//! Sanitizer facade - parse, filter, format
//!
//! [`DomSanitizer`] binds one markup [`Context`] for its lifetime and owns the
//! user overlay on top of that context's baseline rules.
//!
//! # Thread Safety
//!
//! `DomSanitizer` is `Send + Sync`. [`DomSanitizer::sanitize`] takes `&self`
//! and the `add_*` methods take `&mut self`, so the borrow checker enforces
//! the locking discipline: share one instance behind
//! `Arc<RwLock<DomSanitizer>>` (overlay updates take the write lock, sanitize
//! calls the read lock), or give each thread its own instance. The parsed
//! tree is `Rc`-based and never leaves a single call.
//!
//! # Examples
//!
//! ```rust
//! use dom_sanitizer::{Context, DomSanitizer};
//!
//! let mut sanitizer = DomSanitizer::new(Context::Html);
//! assert_eq!(
//!     sanitizer.sanitize("<div><foo>testing</foo></div>").unwrap(),
//!     "<div></div>"
//! );
//!
//! sanitizer.add_allowed_tags(["foo"]);
//! assert_eq!(
//!     sanitizer.sanitize("<div><foo>testing</foo></div>").unwrap(),
//!     "<div><foo>testing</foo></div>"
//! );
//! ```

use std::collections::HashSet;

use crate::error::SanitizeError;
use crate::filter::{Filter, FilterReport};
use crate::formatter::{Formatter, SanitizeOptions};
use crate::parser::{parse_markup, parse_markup_bytes, ParsedMarkup};
use crate::rules::{Context, Overlay};
use crate::security::SecurityValidator;

/// Markup sanitizer bound to one context
#[derive(Debug, Clone)]
pub struct DomSanitizer {
    context: Context,
    overlay: Overlay,
    validator: SecurityValidator,
}

impl DomSanitizer {
    /// Create a sanitizer with the baseline rules of `context`
    pub fn new(context: Context) -> Self {
        Self {
            context,
            overlay: Overlay::new(context),
            validator: SecurityValidator::new(),
        }
    }

    /// Create a sanitizer with a custom maximum element nesting depth
    ///
    /// Elements nested deeper than `max_depth` are removed with their subtree.
    pub fn with_max_depth(context: Context, max_depth: usize) -> Self {
        Self {
            validator: SecurityValidator::with_max_depth(max_depth),
            ..Self::new(context)
        }
    }

    pub fn context(&self) -> Context {
        self.context
    }

    /// Sanitize markup text with default options
    ///
    /// # Errors
    ///
    /// - `SanitizeError::ParseError`: no root element in an SVG/MathML
    ///   document, including empty input
    /// - `SanitizeError::StructuralInvalidity`: the root element is not the
    ///   one the context requires
    ///
    /// On error the input must not be used.
    pub fn sanitize(&self, input: &str) -> Result<String, SanitizeError> {
        self.sanitize_with_options(input, &SanitizeOptions::default())
    }

    /// Sanitize markup text with explicit output options
    pub fn sanitize_with_options(
        &self,
        input: &str,
        options: &SanitizeOptions,
    ) -> Result<String, SanitizeError> {
        let parsed = parse_markup(input, self.context)?;
        self.finish(&parsed, options)
    }

    /// Sanitize raw markup bytes, detecting their charset first
    ///
    /// The output is always UTF-8.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw markup bytes
    /// * `content_type` - Optional Content-Type header value carrying a `charset`
    /// * `options` - Output options
    ///
    /// # Errors
    ///
    /// As for [`DomSanitizer::sanitize`], plus `SanitizeError::EncodingError`
    /// when the bytes cannot be decoded.
    pub fn sanitize_bytes(
        &self,
        input: &[u8],
        content_type: Option<&str>,
        options: &SanitizeOptions,
    ) -> Result<String, SanitizeError> {
        let parsed = parse_markup_bytes(input, content_type, self.context)?;
        self.finish(&parsed, options)
    }

    fn finish(
        &self,
        parsed: &ParsedMarkup,
        options: &SanitizeOptions,
    ) -> Result<String, SanitizeError> {
        let report: FilterReport =
            Filter::new(self.context, &self.overlay, self.validator).filter_document(&parsed.dom)?;
        let output = Formatter::new(self.context, *options).format(parsed);

        log::trace!(
            "sanitized {} input: {} elements and {} attributes removed, {} bytes out",
            self.context,
            report.elements_removed,
            report.attributes_removed,
            output.len()
        );
        Ok(output)
    }

    /// Allow additional tags on top of the baseline
    pub fn add_allowed_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.overlay.allow_tags(tags);
    }

    /// Deny tags, overriding both baseline and allowed additions
    pub fn add_disallowed_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.overlay.disallow_tags(tags);
    }

    /// Allow additional attributes on top of the baseline
    ///
    /// Event-handler attributes (`on*`) stay forbidden even when listed here.
    pub fn add_allowed_attributes<I, S>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.overlay.allow_attributes(attributes);
    }

    /// Deny attributes, overriding both baseline and allowed additions
    pub fn add_disallowed_attributes<I, S>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.overlay.disallow_attributes(attributes);
    }

    /// Effective allowed tags (baseline plus additions, minus denials), sorted
    pub fn allowed_tags(&self) -> Vec<String> {
        effective(
            self.context.rules().tags.iter().copied(),
            self.overlay.allowed_tags(),
            self.overlay.disallowed_tags(),
        )
    }

    /// Effective allowed attribute names, sorted
    ///
    /// Prefix rules such as `aria-*` are not expanded here.
    pub fn allowed_attributes(&self) -> Vec<String> {
        effective(
            self.context.rules().attributes.iter().copied(),
            self.overlay.allowed_attributes(),
            self.overlay.disallowed_attributes(),
        )
    }

    /// Tags denied by the caller, sorted
    pub fn disallowed_tags(&self) -> Vec<String> {
        sorted(self.overlay.disallowed_tags().iter().cloned())
    }

    /// Attributes denied by the caller, sorted
    pub fn disallowed_attributes(&self) -> Vec<String> {
        sorted(self.overlay.disallowed_attributes().iter().cloned())
    }
}

impl Default for DomSanitizer {
    fn default() -> Self {
        Self::new(Context::Html)
    }
}

fn effective<'a>(
    baseline: impl Iterator<Item = &'a str>,
    allowed: &HashSet<String>,
    disallowed: &HashSet<String>,
) -> Vec<String> {
    let mut names: Vec<String> = baseline
        .map(str::to_string)
        .chain(allowed.iter().cloned())
        .filter(|name| !disallowed.contains(name))
        .collect();
    names.sort();
    names.dedup();
    names
}

fn sorted(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = names.collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, RwLock};
    use std::thread;

    const SVG_NS: &str = "http://www.w3.org/2000/svg";

    #[test]
    fn test_sanitizer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DomSanitizer>();
    }

    #[test]
    fn test_scenario_script_and_handler() {
        let sanitizer = DomSanitizer::default();
        let output = sanitizer
            .sanitize("<div><p class=\"foo\" onclick=\"alert('x')\">bar</p><script>alert('y')</script></div>")
            .unwrap();
        assert_eq!(output, "<div><p class=\"foo\">bar</p></div>");
    }

    #[test]
    fn test_overlay_allow_then_deny() {
        let mut sanitizer = DomSanitizer::new(Context::Html);
        let input = "<div><foo>testing</foo></div>";
        assert_eq!(sanitizer.sanitize(input).unwrap(), "<div></div>");

        sanitizer.add_allowed_tags(["foo"]);
        assert_eq!(sanitizer.sanitize(input).unwrap(), "<div><foo>testing</foo></div>");

        sanitizer.add_disallowed_tags(["foo"]);
        assert_eq!(sanitizer.sanitize(input).unwrap(), "<div></div>");
    }

    #[test]
    fn test_svg_root_required() {
        let sanitizer = DomSanitizer::new(Context::Svg);
        let err = sanitizer.sanitize("<foo></foo>").unwrap_err();
        assert_eq!(
            err,
            SanitizeError::StructuralInvalidity {
                expected: "svg",
                found: "foo".to_string()
            }
        );
    }

    #[test]
    fn test_svg_onload_removed() {
        let sanitizer = DomSanitizer::new(Context::Svg);
        let input = format!("<svg onload=\"alert(1)\" xmlns=\"{SVG_NS}\"></svg>");
        assert_eq!(
            sanitizer.sanitize(&input).unwrap(),
            format!("<svg xmlns=\"{SVG_NS}\"/>")
        );
    }

    #[test]
    fn test_getters_reflect_overlay() {
        let mut sanitizer = DomSanitizer::new(Context::Html);
        assert!(sanitizer.allowed_tags().contains(&"p".to_string()));
        assert!(!sanitizer.allowed_tags().contains(&"foo".to_string()));

        sanitizer.add_allowed_tags(["FOO"]);
        sanitizer.add_disallowed_tags(["p"]);
        sanitizer.add_disallowed_attributes(["title"]);

        let tags = sanitizer.allowed_tags();
        assert!(tags.contains(&"foo".to_string()));
        assert!(!tags.contains(&"p".to_string()));
        assert!(tags.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(sanitizer.disallowed_tags(), vec!["p".to_string()]);
        assert_eq!(sanitizer.disallowed_attributes(), vec!["title".to_string()]);
        assert!(!sanitizer.allowed_attributes().contains(&"title".to_string()));
    }

    #[test]
    fn test_with_max_depth() {
        let sanitizer = DomSanitizer::with_max_depth(Context::Html, 4);
        let output = sanitizer
            .sanitize("<div><div><div><div><div><b>deep</b></div></div></div></div></div>")
            .unwrap();
        assert!(!output.contains("deep"));
        assert!(output.starts_with("<div><div>"));
    }

    #[test]
    fn test_shared_behind_rwlock() {
        let sanitizer = Arc::new(RwLock::new(DomSanitizer::default()));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let sanitizer = Arc::clone(&sanitizer);
                thread::spawn(move || {
                    let guard = sanitizer.read().unwrap();
                    guard.sanitize("<p onclick=\"x\">hi</p>").unwrap()
                })
            })
            .collect();

        for reader in readers {
            assert_eq!(reader.join().unwrap(), "<p>hi</p>");
        }

        sanitizer.write().unwrap().add_disallowed_tags(["p"]);
        assert_eq!(sanitizer.read().unwrap().sanitize("<p>hi</p>").unwrap(), "");
    }

    #[test]
    fn test_sanitize_bytes() {
        let sanitizer = DomSanitizer::default();
        let output = sanitizer
            .sanitize_bytes(
                b"<p>Caf\xE9</p>",
                Some("text/html; charset=ISO-8859-1"),
                &SanitizeOptions::default(),
            )
            .unwrap();
        assert_eq!(output, "<p>Café</p>");
    }
}
