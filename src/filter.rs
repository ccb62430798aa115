//! Sanitization walker - prunes a parsed tree down to what the policy allows
//!
//! The walker visits the tree pre-order, depth-first, left to right, and
//! decides for each node whether it survives:
//!
//! 1. **Root validation** runs once before the walk: SVG and MathML documents
//!    must have `svg` / `math` as their document element.
//! 2. **Elements** not on the effective allow-list are removed together with
//!    their whole subtree. Content is never hoisted into the parent.
//! 3. **Attributes** of surviving elements are checked in source order:
//!    event handlers go first and unconditionally, then the allow-list, then
//!    URL validation for URL-valued attributes.
//! 4. **Comments and processing instructions** are always removed; doctype
//!    nodes survive only in the HTML context.
//!
//! Children are taken out of their parent, filtered into a new vector, and
//! put back, so no borrow is held across recursion. Pruned nodes get their
//! parent link cleared before they are dropped.
//!
//! # Examples
//!
//! ```rust
//! use dom_sanitizer::filter::Filter;
//! use dom_sanitizer::parser::parse_markup;
//! use dom_sanitizer::rules::{Context, Overlay};
//! use dom_sanitizer::security::SecurityValidator;
//!
//! let parsed = parse_markup("<p onclick=\"x()\">hi</p><script>x()</script>", Context::Html)
//!     .expect("parse");
//! let overlay = Overlay::new(Context::Html);
//! let filter = Filter::new(Context::Html, &overlay, SecurityValidator::new());
//! let report = filter.filter_document(&parsed.dom).expect("html has no root policy");
//!
//! assert_eq!(report.elements_removed, 1);
//! assert_eq!(report.attributes_removed, 1);
//! ```

use html5ever::{Attribute, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::cell::RefCell;

use crate::error::SanitizeError;
use crate::parser::document_element;
use crate::rules::{
    allows_data_uri, is_attribute_allowed, is_tag_allowed, is_url_attribute, Context, Overlay,
};
use crate::security::{
    is_safe_data_url, is_safe_srcset, is_safe_url, url_scheme, AttributeVerdict,
    SecurityValidator,
};

/// Counters collected during one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Nodes inspected (pruned subtrees count once)
    pub nodes_visited: usize,
    /// Elements removed with their subtree
    pub elements_removed: usize,
    /// Attributes removed from surviving elements
    pub attributes_removed: usize,
    /// Comments, processing instructions and doctypes removed
    pub other_nodes_removed: usize,
}

/// Tree walker bound to one context and one effective policy
pub struct Filter<'a> {
    context: Context,
    overlay: &'a Overlay,
    validator: SecurityValidator,
}

/// `prefix:local` for namespaced names, `local` otherwise
pub fn qualified_name(name: &QualName) -> String {
    match name.prefix {
        Some(ref prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

impl<'a> Filter<'a> {
    /// Create a walker for one document using the given rules
    pub fn new(context: Context, overlay: &'a Overlay, validator: SecurityValidator) -> Self {
        Self {
            context,
            overlay,
            validator,
        }
    }

    /// Validate the document root, then filter the whole tree in place
    ///
    /// # Errors
    ///
    /// Returns `SanitizeError::StructuralInvalidity` when the context requires
    /// a root tag and the document element does not match it. The tree is left
    /// untouched in that case.
    pub fn filter_document(&self, dom: &RcDom) -> Result<FilterReport, SanitizeError> {
        self.validate_root(&dom.document)?;

        let mut report = FilterReport::default();
        self.filter_children(&dom.document, 0, &mut report);

        log::trace!(
            "filtered {} document: {} nodes visited, {} elements and {} attributes removed",
            self.context,
            report.nodes_visited,
            report.elements_removed,
            report.attributes_removed
        );
        Ok(report)
    }

    fn validate_root(&self, document: &Handle) -> Result<(), SanitizeError> {
        let Some(expected) = self.context.required_root_tag() else {
            return Ok(());
        };

        let found = document_element(document).and_then(|root| match root.data {
            NodeData::Element { ref name, .. } => Some(qualified_name(name)),
            _ => None,
        });

        match found {
            Some(ref name) if self.context.case_rule().names_match(name, expected) => Ok(()),
            found => {
                let found = found.unwrap_or_default();
                log::debug!(
                    "rejecting {} input: root element <{}> is not <{}>",
                    self.context,
                    found,
                    expected
                );
                Err(SanitizeError::StructuralInvalidity { expected, found })
            }
        }
    }

    fn filter_children(&self, parent: &Handle, depth: usize, report: &mut FilterReport) {
        let children = std::mem::take(&mut *parent.children.borrow_mut());
        let mut kept = Vec::with_capacity(children.len());

        for child in children {
            if self.keep_node(&child, depth, report) {
                kept.push(child);
            } else {
                child.parent.set(None);
            }
        }

        *parent.children.borrow_mut() = kept;
    }

    fn keep_node(&self, node: &Handle, depth: usize, report: &mut FilterReport) -> bool {
        report.nodes_visited += 1;

        match node.data {
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let tag = qualified_name(name);

                if let Err(reason) = self.validator.validate_depth(depth) {
                    log::warn!("pruning <{}>: {}", tag, reason);
                    report.elements_removed += 1;
                    return false;
                }

                if !is_tag_allowed(self.context, self.overlay, &tag) {
                    log::debug!("pruning disallowed element <{}>", tag);
                    report.elements_removed += 1;
                    return false;
                }

                self.filter_attributes(&tag, attrs, report);
                self.filter_children(node, depth + 1, report);
                true
            }
            NodeData::Text { .. } => true,
            NodeData::Doctype { .. } if !self.context.is_xml() => true,
            NodeData::Doctype { .. }
            | NodeData::Comment { .. }
            | NodeData::ProcessingInstruction { .. } => {
                report.other_nodes_removed += 1;
                false
            }
            NodeData::Document => {
                self.filter_children(node, depth, report);
                true
            }
        }
    }

    fn filter_attributes(
        &self,
        tag: &str,
        attrs: &RefCell<Vec<Attribute>>,
        report: &mut FilterReport,
    ) {
        attrs.borrow_mut().retain(|attr| {
            let name = qualified_name(&attr.name);
            match self.check_attribute(tag, &name, &attr.value) {
                AttributeVerdict::Keep => true,
                verdict => {
                    log::debug!("removing attribute {} from <{}>: {:?}", name, tag, verdict);
                    report.attributes_removed += 1;
                    false
                }
            }
        });
    }

    /// Decide the fate of one attribute of an allowed element
    pub fn check_attribute(&self, tag: &str, name: &str, value: &str) -> AttributeVerdict {
        if self.validator.is_event_handler(name) {
            return AttributeVerdict::EventHandler;
        }

        if !is_attribute_allowed(self.context, self.overlay, name) {
            return AttributeVerdict::NotAllowed;
        }

        if is_url_attribute(self.context, name) && !self.is_safe_url_value(tag, name, value) {
            return AttributeVerdict::UnsafeUrl;
        }

        AttributeVerdict::Keep
    }

    fn is_safe_url_value(&self, tag: &str, name: &str, value: &str) -> bool {
        let schemes = self.context.rules().allowed_schemes;

        if self.context.case_rule().names_match(name, "srcset") {
            return is_safe_srcset(value, schemes);
        }

        if url_scheme(value).as_deref() == Some("data") {
            return allows_data_uri(self.context, tag) && is_safe_data_url(value);
        }

        is_safe_url(value, schemes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_markup;

    fn run(input: &str, context: Context, overlay: &Overlay) -> Result<FilterReport, SanitizeError> {
        let parsed = parse_markup(input, context).expect("parse");
        Filter::new(context, overlay, SecurityValidator::new()).filter_document(&parsed.dom)
    }

    fn verdict(context: Context, tag: &str, name: &str, value: &str) -> AttributeVerdict {
        let overlay = Overlay::new(context);
        Filter::new(context, &overlay, SecurityValidator::new()).check_attribute(tag, name, value)
    }

    #[test]
    fn test_event_handler_beats_overlay() {
        let mut overlay = Overlay::new(Context::Html);
        overlay.allow_attributes(["onclick"]);
        let filter = Filter::new(Context::Html, &overlay, SecurityValidator::new());
        assert_eq!(
            filter.check_attribute("p", "onclick", "x()"),
            AttributeVerdict::EventHandler
        );
    }

    #[test]
    fn test_attribute_verdicts() {
        assert_eq!(verdict(Context::Html, "p", "class", "foo"), AttributeVerdict::Keep);
        assert_eq!(verdict(Context::Html, "p", "blah", "x"), AttributeVerdict::NotAllowed);
        assert_eq!(
            verdict(Context::Html, "a", "href", "javascript:alert(1)"),
            AttributeVerdict::UnsafeUrl
        );
        assert_eq!(
            verdict(Context::Svg, "a", "xlink:href", " javascript:alert(1)"),
            AttributeVerdict::UnsafeUrl
        );
        assert_eq!(
            verdict(Context::Svg, "rect", "viewbox", "0 0 1 1"),
            AttributeVerdict::NotAllowed
        );
    }

    #[test]
    fn test_data_urls_only_on_image_tags() {
        let png = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(verdict(Context::Html, "img", "src", png), AttributeVerdict::Keep);
        assert_eq!(verdict(Context::Html, "a", "href", png), AttributeVerdict::UnsafeUrl);
        assert_eq!(
            verdict(Context::Html, "img", "src", "data:image/svg+xml,<svg onload=x>"),
            AttributeVerdict::UnsafeUrl
        );
        assert_eq!(verdict(Context::Svg, "image", "href", png), AttributeVerdict::Keep);
    }

    #[test]
    fn test_srcset_checked_per_candidate() {
        assert_eq!(
            verdict(Context::Html, "img", "srcset", "a.png 1x, b.png 2x"),
            AttributeVerdict::Keep
        );
        assert_eq!(
            verdict(Context::Html, "img", "srcset", "a.png 1x, javascript:x 2x"),
            AttributeVerdict::UnsafeUrl
        );
    }

    #[test]
    fn test_report_counts() {
        let overlay = Overlay::new(Context::Html);
        let report = run(
            "<!-- c --><div onclick=\"x\" title=\"t\"><script>a</script><b>ok</b></div>",
            Context::Html,
            &overlay,
        )
        .expect("filter");
        assert_eq!(report.elements_removed, 1);
        assert_eq!(report.attributes_removed, 1);
        assert_eq!(report.other_nodes_removed, 1);
    }

    #[test]
    fn test_pruned_subtree_is_detached() {
        let parsed = parse_markup("<div><foo><b>inner</b></foo></div>", Context::Html).expect("parse");
        let body = {
            let html = document_element(&parsed.dom.document).expect("html");
            let children = html.children.borrow();
            children[1].clone()
        };
        let div = body.children.borrow()[0].clone();
        let foo = div.children.borrow()[0].clone();

        let overlay = Overlay::new(Context::Html);
        Filter::new(Context::Html, &overlay, SecurityValidator::new())
            .filter_document(&parsed.dom)
            .expect("filter");

        assert!(div.children.borrow().is_empty());
        let parent = foo.parent.take();
        assert!(parent.is_none(), "pruned node must not keep a parent link");
    }

    #[test]
    fn test_root_validation() {
        let overlay = Overlay::new(Context::Svg);
        assert!(run("<svg/>", Context::Svg, &overlay).is_ok());
        match run("<foo></foo>", Context::Svg, &overlay) {
            Err(SanitizeError::StructuralInvalidity { expected, found }) => {
                assert_eq!(expected, "svg");
                assert_eq!(found, "foo");
            }
            other => panic!("Expected StructuralInvalidity, got {other:?}"),
        }

        let overlay = Overlay::new(Context::Svg);
        assert!(run("<SVG/>", Context::Svg, &overlay).is_err());

        let overlay = Overlay::new(Context::MathMl);
        assert!(run("<math><mi>x</mi></math>", Context::MathMl, &overlay).is_ok());
        assert!(run("<svg/>", Context::MathMl, &overlay).is_err());
    }

    #[test]
    fn test_depth_limit_prunes_deep_content() {
        let depth = 20;
        let mut html = String::new();
        for _ in 0..depth {
            html.push_str("<div>");
        }
        html.push_str("deep");

        let parsed = parse_markup(&html, Context::Html).expect("parse");
        let overlay = Overlay::new(Context::Html);
        let report = Filter::new(Context::Html, &overlay, SecurityValidator::with_max_depth(10))
            .filter_document(&parsed.dom)
            .expect("filter");
        assert_eq!(report.elements_removed, 1);
    }
}
