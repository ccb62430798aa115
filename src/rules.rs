//! Rule model: per-context baselines plus the per-instance overlay
//!
//! Every permission decision goes through [`is_tag_allowed`] and
//! [`is_attribute_allowed`]. Both apply the same precedence:
//!
//! ```text
//! allowed(name) = (name in baseline or overlay.allowed) and name not in overlay.disallowed
//! ```
//!
//! A name present in both overlay sets is therefore always rejected, no matter
//! in which order it was added.
//!
//! # Case rules
//!
//! HTML names compare ASCII case-insensitively. SVG and MathML vocabularies
//! are camelCase (`viewBox`, `clipPath`) and compare exactly; the comparison
//! mode is a fixed property of [`Context`].
//!
//! ```rust
//! use dom_sanitizer::rules::{is_tag_allowed, Context, Overlay};
//!
//! let mut overlay = Overlay::new(Context::Html);
//! assert!(is_tag_allowed(Context::Html, &overlay, "DIV"));
//! assert!(!is_tag_allowed(Context::Html, &overlay, "foo"));
//!
//! overlay.allow_tags(["foo"]);
//! overlay.disallow_tags(["FOO"]);
//! assert!(!is_tag_allowed(Context::Html, &overlay, "foo"));
//! ```

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::baseline;

/// Markup vocabulary a sanitizer instance is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Context {
    /// HTML documents and fragments
    #[default]
    Html,
    /// Standalone SVG documents
    Svg,
    /// Standalone MathML documents
    MathMl,
}

/// Name comparison mode of a context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseRule {
    /// ASCII case folding before comparison
    Insensitive,
    /// Byte-exact comparison
    Sensitive,
}

impl CaseRule {
    /// Bring a name into the form used for set membership
    pub fn normalize<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            CaseRule::Insensitive if name.bytes().any(|b| b.is_ascii_uppercase()) => {
                Cow::Owned(name.to_ascii_lowercase())
            }
            _ => Cow::Borrowed(name),
        }
    }

    /// Compare two names under this rule
    pub fn names_match(&self, a: &str, b: &str) -> bool {
        match self {
            CaseRule::Insensitive => a.eq_ignore_ascii_case(b),
            CaseRule::Sensitive => a == b,
        }
    }
}

impl Context {
    /// Comparison mode used for every tag and attribute name in this context
    pub fn case_rule(self) -> CaseRule {
        match self {
            Context::Html => CaseRule::Insensitive,
            Context::Svg | Context::MathMl => CaseRule::Sensitive,
        }
    }

    /// Root tag a document must have to be accepted in this context
    pub fn required_root_tag(self) -> Option<&'static str> {
        self.rules().required_root
    }

    /// True for the contexts parsed and serialized as XML
    pub fn is_xml(self) -> bool {
        !matches!(self, Context::Html)
    }

    /// Baseline rule set of this context
    pub fn rules(self) -> &'static RuleSet {
        static HTML: OnceLock<RuleSet> = OnceLock::new();
        static SVG: OnceLock<RuleSet> = OnceLock::new();
        static MATHML: OnceLock<RuleSet> = OnceLock::new();

        match self {
            Context::Html => HTML.get_or_init(|| RuleSet {
                tags: baseline::HTML_TAGS.iter().copied().collect(),
                attributes: baseline::HTML_ATTRIBUTES.iter().copied().collect(),
                attribute_prefixes: baseline::HTML_ATTRIBUTE_PREFIXES,
                url_attributes: baseline::HTML_URL_ATTRIBUTES.iter().copied().collect(),
                allowed_schemes: baseline::HTML_SCHEMES,
                data_uri_tags: baseline::HTML_DATA_URI_TAGS,
                required_root: None,
            }),
            Context::Svg => SVG.get_or_init(|| RuleSet {
                tags: baseline::SVG_TAGS.iter().copied().collect(),
                attributes: baseline::SVG_ATTRIBUTES.iter().copied().collect(),
                attribute_prefixes: &[],
                url_attributes: baseline::SVG_URL_ATTRIBUTES.iter().copied().collect(),
                allowed_schemes: baseline::SVG_SCHEMES,
                data_uri_tags: baseline::SVG_DATA_URI_TAGS,
                required_root: Some("svg"),
            }),
            Context::MathMl => MATHML.get_or_init(|| RuleSet {
                tags: baseline::MATHML_TAGS.iter().copied().collect(),
                attributes: baseline::MATHML_ATTRIBUTES.iter().copied().collect(),
                attribute_prefixes: &[],
                url_attributes: baseline::MATHML_URL_ATTRIBUTES.iter().copied().collect(),
                allowed_schemes: baseline::MATHML_SCHEMES,
                data_uri_tags: baseline::MATHML_DATA_URI_TAGS,
                required_root: Some("math"),
            }),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Context::Html => "html",
            Context::Svg => "svg",
            Context::MathMl => "mathml",
        };
        f.write_str(name)
    }
}

impl FromStr for Context {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Context::Html),
            "svg" => Ok(Context::Svg),
            "mathml" | "math" => Ok(Context::MathMl),
            other => Err(format!("unknown markup context '{}'", other)),
        }
    }
}

/// Immutable baseline rules of one context
#[derive(Debug)]
pub struct RuleSet {
    /// Tags permitted by default
    pub tags: HashSet<&'static str>,
    /// Attributes permitted by default on every allowed tag
    pub attributes: HashSet<&'static str>,
    /// Attribute-name prefixes permitted by default
    pub attribute_prefixes: &'static [&'static str],
    /// Attributes whose value is validated as a URL
    pub url_attributes: HashSet<&'static str>,
    /// URL schemes accepted in URL attributes
    pub allowed_schemes: &'static [&'static str],
    /// Tags on which raster-image `data:` URLs are accepted
    pub data_uri_tags: &'static [&'static str],
    /// Root tag required for the document to be structurally valid
    pub required_root: Option<&'static str>,
}

impl RuleSet {
    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
            || self
                .attribute_prefixes
                .iter()
                .any(|prefix| name.len() > prefix.len() && name.starts_with(prefix))
    }
}

/// User additions layered over a context baseline
///
/// Names are normalized with the context's [`CaseRule`] on insertion, so the
/// overlay of an HTML sanitizer treats `FOO` and `foo` as the same tag.
#[derive(Debug, Clone)]
pub struct Overlay {
    case_rule: CaseRule,
    allowed_tags: HashSet<String>,
    disallowed_tags: HashSet<String>,
    allowed_attributes: HashSet<String>,
    disallowed_attributes: HashSet<String>,
}

impl Overlay {
    /// Create an empty overlay for a context
    pub fn new(context: Context) -> Self {
        Self {
            case_rule: context.case_rule(),
            allowed_tags: HashSet::new(),
            disallowed_tags: HashSet::new(),
            allowed_attributes: HashSet::new(),
            disallowed_attributes: HashSet::new(),
        }
    }

    /// Add tags to the allowed set, normalized by the context's case rule
    pub fn allow_tags<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        merge(&mut self.allowed_tags, self.case_rule, names);
    }

    /// Add tags to the denied set
    pub fn disallow_tags<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        merge(&mut self.disallowed_tags, self.case_rule, names);
    }

    /// Add attribute names to the allowed set
    pub fn allow_attributes<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        merge(&mut self.allowed_attributes, self.case_rule, names);
    }

    /// Add attribute names to the denied set
    pub fn disallow_attributes<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        merge(&mut self.disallowed_attributes, self.case_rule, names);
    }

    /// Tags added on top of the baseline
    pub fn allowed_tags(&self) -> &HashSet<String> {
        &self.allowed_tags
    }

    /// Tags denied by the caller
    pub fn disallowed_tags(&self) -> &HashSet<String> {
        &self.disallowed_tags
    }

    /// Attribute names added on top of the baseline
    pub fn allowed_attributes(&self) -> &HashSet<String> {
        &self.allowed_attributes
    }

    /// Attribute names denied by the caller
    pub fn disallowed_attributes(&self) -> &HashSet<String> {
        &self.disallowed_attributes
    }
}

fn merge<I, S>(set: &mut HashSet<String>, case_rule: CaseRule, names: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for name in names {
        let name = name.as_ref().trim();
        if !name.is_empty() {
            set.insert(case_rule.normalize(name).into_owned());
        }
    }
}

/// Check whether a tag survives the effective policy
///
/// # Examples
///
/// ```
/// use dom_sanitizer::rules::{is_tag_allowed, Context, Overlay};
///
/// let overlay = Overlay::new(Context::Svg);
/// assert!(is_tag_allowed(Context::Svg, &overlay, "clipPath"));
/// assert!(!is_tag_allowed(Context::Svg, &overlay, "clippath"));
/// assert!(!is_tag_allowed(Context::Svg, &overlay, "script"));
/// ```
pub fn is_tag_allowed(context: Context, overlay: &Overlay, name: &str) -> bool {
    let name = context.case_rule().normalize(name);
    if overlay.disallowed_tags.contains(&*name) {
        return false;
    }
    context.rules().tags.contains(&*name) || overlay.allowed_tags.contains(&*name)
}

/// Check whether an attribute name survives the effective policy
///
/// This is the allow-list decision only. Event-handler stripping and URL
/// validation are separate checks applied by the walker.
///
/// # Examples
///
/// ```
/// use dom_sanitizer::rules::{is_attribute_allowed, Context, Overlay};
///
/// let overlay = Overlay::new(Context::Html);
/// assert!(is_attribute_allowed(Context::Html, &overlay, "CLASS"));
/// assert!(is_attribute_allowed(Context::Html, &overlay, "aria-label"));
/// assert!(!is_attribute_allowed(Context::Html, &overlay, "blah"));
/// ```
pub fn is_attribute_allowed(context: Context, overlay: &Overlay, name: &str) -> bool {
    let name = context.case_rule().normalize(name);
    if overlay.disallowed_attributes.contains(&*name) {
        return false;
    }
    context.rules().has_attribute(&name)
        || overlay.allowed_attributes.contains(&*name)
}

/// Check whether an attribute carries a URL in this context
pub fn is_url_attribute(context: Context, name: &str) -> bool {
    let name = context.case_rule().normalize(name);
    context.rules().url_attributes.contains(&*name)
}

/// Check whether raster `data:` URLs are allowlisted for a tag
pub fn allows_data_uri(context: Context, tag: &str) -> bool {
    let case_rule = context.case_rule();
    context
        .rules()
        .data_uri_tags
        .iter()
        .any(|allowed| case_rule.names_match(allowed, tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_html_names_are_case_insensitive() {
        let overlay = Overlay::new(Context::Html);
        assert!(is_tag_allowed(Context::Html, &overlay, "div"));
        assert!(is_tag_allowed(Context::Html, &overlay, "DiV"));
        assert!(is_attribute_allowed(Context::Html, &overlay, "ClAsS"));
    }

    #[test]
    fn test_svg_names_are_case_sensitive() {
        let overlay = Overlay::new(Context::Svg);
        assert!(is_attribute_allowed(Context::Svg, &overlay, "viewBox"));
        assert!(!is_attribute_allowed(Context::Svg, &overlay, "viewbox"));
        assert!(is_tag_allowed(Context::Svg, &overlay, "linearGradient"));
        assert!(!is_tag_allowed(Context::Svg, &overlay, "LINEARGRADIENT"));
    }

    #[test]
    fn test_overlay_allow_extends_baseline() {
        let mut overlay = Overlay::new(Context::Html);
        assert!(!is_tag_allowed(Context::Html, &overlay, "foo"));
        overlay.allow_tags(["foo"]);
        assert!(is_tag_allowed(Context::Html, &overlay, "foo"));
        assert!(is_tag_allowed(Context::Html, &overlay, "FOO"));
    }

    #[test]
    fn test_overlay_disallow_beats_baseline() {
        let mut overlay = Overlay::new(Context::Html);
        overlay.disallow_tags(["p"]);
        overlay.disallow_attributes(["style"]);
        assert!(!is_tag_allowed(Context::Html, &overlay, "p"));
        assert!(!is_attribute_allowed(Context::Html, &overlay, "style"));
    }

    #[test]
    fn test_disallow_wins_in_either_order() {
        let mut first = Overlay::new(Context::Svg);
        first.allow_attributes(["data-x"]);
        first.disallow_attributes(["data-x"]);

        let mut second = Overlay::new(Context::Svg);
        second.disallow_attributes(["data-x"]);
        second.allow_attributes(["data-x"]);

        assert!(!is_attribute_allowed(Context::Svg, &first, "data-x"));
        assert!(!is_attribute_allowed(Context::Svg, &second, "data-x"));
    }

    #[test]
    fn test_attribute_prefix_requires_suffix() {
        let overlay = Overlay::new(Context::Html);
        assert!(is_attribute_allowed(Context::Html, &overlay, "aria-hidden"));
        assert!(!is_attribute_allowed(Context::Html, &overlay, "aria-"));
        assert!(!is_attribute_allowed(Context::Svg, &Overlay::new(Context::Svg), "aria-hidden"));
    }

    #[test]
    fn test_overlay_ignores_blank_names() {
        let mut overlay = Overlay::new(Context::Html);
        overlay.allow_tags(["", "   "]);
        assert!(overlay.allowed_tags().is_empty());
    }

    #[test]
    fn test_url_attributes_per_context() {
        assert!(is_url_attribute(Context::Html, "HREF"));
        assert!(is_url_attribute(Context::Html, "srcset"));
        assert!(is_url_attribute(Context::Svg, "xlink:href"));
        assert!(!is_url_attribute(Context::Svg, "XLINK:HREF"));
        assert!(!is_url_attribute(Context::MathMl, "src"));
    }

    #[test]
    fn test_data_uri_tags() {
        assert!(allows_data_uri(Context::Html, "IMG"));
        assert!(!allows_data_uri(Context::Html, "a"));
        assert!(allows_data_uri(Context::Svg, "image"));
        assert!(!allows_data_uri(Context::MathMl, "mi"));
    }

    #[test]
    fn test_required_roots() {
        assert_eq!(Context::Html.required_root_tag(), None);
        assert_eq!(Context::Svg.required_root_tag(), Some("svg"));
        assert_eq!(Context::MathMl.required_root_tag(), Some("math"));
    }

    #[test]
    fn test_context_from_str_round_trips_display() {
        for context in [Context::Html, Context::Svg, Context::MathMl] {
            assert_eq!(context.to_string().parse::<Context>(), Ok(context));
        }
        assert!("xhtml".parse::<Context>().is_err());
    }

    proptest! {
        #[test]
        fn prop_disallow_always_wins(
            name in "[a-zA-Z][a-zA-Z0-9-]{0,12}",
            allow_first in any::<bool>(),
            context in prop::sample::select(vec![Context::Html, Context::Svg, Context::MathMl]),
        ) {
            let mut overlay = Overlay::new(context);
            if allow_first {
                overlay.allow_tags([&name]);
                overlay.disallow_tags([&name]);
                overlay.allow_attributes([&name]);
                overlay.disallow_attributes([&name]);
            } else {
                overlay.disallow_tags([&name]);
                overlay.allow_tags([&name]);
                overlay.disallow_attributes([&name]);
                overlay.allow_attributes([&name]);
            }
            prop_assert!(!is_tag_allowed(context, &overlay, &name));
            prop_assert!(!is_attribute_allowed(context, &overlay, &name));
        }
    }
}
