//! Output formatter - serializes a filtered tree back to markup text
//!
//! Two serializers share one traversal:
//!
//! - **HTML** follows the HTML fragment serialization rules: void elements
//!   have no end tag, raw-text elements emit their text unescaped, attribute
//!   values are always double-quoted.
//! - **XML** (SVG and MathML) emits qualified names, self-closes childless
//!   elements, and re-declares any namespace binding that is not already in
//!   scope, so removing an `xmlns:*` attribute never produces an unbound prefix.
//!
//! # Options
//!
//! [`SanitizeOptions`] controls the two cosmetic passes:
//!
//! - `compress_output` drops whitespace-only text nodes between tags, except
//!   inside elements where whitespace is content (`pre`, SVG `text`, MathML
//!   token elements, ...).
//! - `remove_wrapper_tags` strips the `html`/`head`/`body` wrapper the HTML
//!   parser synthesized around a fragment. Wrappers the caller wrote are kept.
//!
//! Neither option can bring back anything the filter removed: the formatter
//! only reads the tree it is given.

use markup5ever_rcdom::{Handle, NodeData};

use crate::filter::qualified_name;
use crate::parser::{document_element, ParsedMarkup};
use crate::rules::Context;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Elements without an end tag in HTML
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text content is emitted without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "script",
    "style",
    "xmp",
];

/// Elements whose first newline is swallowed by the HTML parser
const NEWLINE_EATING_ELEMENTS: &[&str] = &["listing", "pre", "textarea"];

const HTML_PRESERVE_WHITESPACE: &[&str] = &["listing", "pre", "textarea"];
const SVG_PRESERVE_WHITESPACE: &[&str] = &["text", "textPath", "tspan"];
const MATHML_PRESERVE_WHITESPACE: &[&str] = &["mi", "mn", "mo", "ms", "mtext"];

/// Options applied when turning the filtered tree into text
///
/// # Examples
///
/// ```
/// use dom_sanitizer::SanitizeOptions;
///
/// let options = SanitizeOptions {
///     remove_wrapper_tags: false,
///     ..Default::default()
/// };
/// assert!(options.compress_output);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Drop whitespace-only text between tags
    pub compress_output: bool,
    /// Strip the document wrapper the parser added around a fragment
    pub remove_wrapper_tags: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            compress_output: true,
            remove_wrapper_tags: true,
        }
    }
}

/// How text below the current HTML element is written
#[derive(Debug, Clone, Copy, Default)]
struct TextMode {
    /// Whitespace-only text is content here
    preserve: bool,
    /// Parent is a raw-text element
    raw: bool,
}

/// Namespace bindings visible at the current element, innermost last
struct NamespaceScope {
    bindings: Vec<(Option<String>, String)>,
}

impl NamespaceScope {
    fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    fn lookup(&self, prefix: Option<&str>) -> &str {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound.as_deref() == prefix)
            .map_or("", |(_, uri)| uri.as_str())
    }

    fn bind(&mut self, prefix: Option<&str>, uri: &str) {
        self.bindings.push((prefix.map(str::to_string), uri.to_string()));
    }

    fn mark(&self) -> usize {
        self.bindings.len()
    }

    fn restore(&mut self, mark: usize) {
        self.bindings.truncate(mark);
    }
}

/// Serializer for one context and one set of options
pub struct Formatter {
    context: Context,
    options: SanitizeOptions,
}

impl Formatter {
    /// Create a formatter for a context with output options
    pub fn new(context: Context, options: SanitizeOptions) -> Self {
        Self { context, options }
    }

    /// Serialize a (filtered) document to text
    pub fn format(&self, parsed: &ParsedMarkup) -> String {
        let mut output = String::new();
        let document = &parsed.dom.document;

        if self.context.is_xml() {
            let mut scope = NamespaceScope::new();
            for child in document.children.borrow().iter() {
                if let NodeData::Element { .. } = child.data {
                    self.write_xml_node(child, &mut output, &mut scope, false);
                }
            }
        } else if parsed.synthesized_wrapper && self.options.remove_wrapper_tags {
            self.write_unwrapped(document, &mut output);
        } else {
            for child in document.children.borrow().iter() {
                self.write_html_node(child, &mut output, TextMode::default());
            }
        }

        output
    }

    fn write_unwrapped(&self, document: &Handle, output: &mut String) {
        let Some(html) = document_element(document) else {
            return;
        };

        for child in html.children.borrow().iter() {
            match child.data {
                NodeData::Element { ref name, .. }
                    if matches!(&*name.local, "head" | "body") =>
                {
                    for grandchild in child.children.borrow().iter() {
                        self.write_html_node(grandchild, output, TextMode::default());
                    }
                }
                _ => self.write_html_node(child, output, TextMode::default()),
            }
        }
    }

    fn write_html_node(&self, node: &Handle, output: &mut String, mode: TextMode) {
        match node.data {
            NodeData::Doctype { ref name, .. } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                output.push('>');
            }
            NodeData::Text { ref contents } => {
                let text = contents.borrow();
                if self.skips_text(&text, mode.preserve) {
                    return;
                }
                if mode.raw {
                    output.push_str(&text);
                } else {
                    escape_html_text(&text, output);
                }
            }
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let tag: &str = &name.local;
                output.push('<');
                output.push_str(tag);
                for attr in attrs.borrow().iter() {
                    output.push(' ');
                    output.push_str(&qualified_name(&attr.name));
                    output.push_str("=\"");
                    escape_html_attribute(&attr.value, output);
                    output.push('"');
                }
                output.push('>');

                if VOID_ELEMENTS.contains(&tag) {
                    return;
                }

                let children = node.children.borrow();
                if NEWLINE_EATING_ELEMENTS.contains(&tag) {
                    if let Some(NodeData::Text { contents }) = children.first().map(|c| &c.data) {
                        if contents.borrow().starts_with('\n') {
                            output.push('\n');
                        }
                    }
                }

                let mode = TextMode {
                    preserve: mode.preserve || HTML_PRESERVE_WHITESPACE.contains(&tag),
                    raw: RAW_TEXT_ELEMENTS.contains(&tag),
                };
                for child in children.iter() {
                    self.write_html_node(child, output, mode);
                }

                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
            NodeData::Document
            | NodeData::Comment { .. }
            | NodeData::ProcessingInstruction { .. } => {}
        }
    }

    fn write_xml_node(
        &self,
        node: &Handle,
        output: &mut String,
        scope: &mut NamespaceScope,
        preserve: bool,
    ) {
        match node.data {
            NodeData::Text { ref contents } => {
                let text = contents.borrow();
                if !self.skips_text(&text, preserve) {
                    escape_xml(&text, false, output);
                }
            }
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let mark = scope.mark();
                let tag = qualified_name(name);
                output.push('<');
                output.push_str(&tag);

                // Declarations first, explicit ones in source order, then
                // whatever the element and its attributes still need.
                let attrs = attrs.borrow();
                let (declarations, plain): (Vec<_>, Vec<_>) = attrs
                    .iter()
                    .map(|attr| (qualified_name(&attr.name), attr))
                    .partition(|(attr_name, _)| declared_prefix(attr_name).is_some());

                for (attr_name, attr) in &declarations {
                    if let Some(prefix) = declared_prefix(attr_name) {
                        scope.bind(prefix, &attr.value);
                    }
                    write_xml_attribute(attr_name, &attr.value, output);
                }

                declare_if_unbound(name.prefix.as_deref(), &name.ns, scope, output);
                for (_, attr) in &plain {
                    if let Some(prefix) = attr.name.prefix.as_deref() {
                        declare_if_unbound(Some(prefix), &attr.name.ns, scope, output);
                    }
                }

                for (attr_name, attr) in &plain {
                    write_xml_attribute(attr_name, &attr.value, output);
                }

                let children = node.children.borrow();
                let preserve = preserve || self.preserves_whitespace(&name.local);
                let has_output = children
                    .iter()
                    .any(|child| self.emits_xml(child, preserve));

                if !has_output {
                    output.push_str("/>");
                } else {
                    output.push('>');
                    for child in children.iter() {
                        self.write_xml_node(child, output, scope, preserve);
                    }
                    output.push_str("</");
                    output.push_str(&tag);
                    output.push('>');
                }

                scope.restore(mark);
            }
            NodeData::Document
            | NodeData::Doctype { .. }
            | NodeData::Comment { .. }
            | NodeData::ProcessingInstruction { .. } => {}
        }
    }

    fn emits_xml(&self, node: &Handle, preserve: bool) -> bool {
        match node.data {
            NodeData::Element { .. } => true,
            NodeData::Text { ref contents } => !self.skips_text(&contents.borrow(), preserve),
            _ => false,
        }
    }

    fn skips_text(&self, text: &str, preserve: bool) -> bool {
        text.is_empty()
            || (self.options.compress_output
                && !preserve
                && text.bytes().all(|b| b.is_ascii_whitespace()))
    }

    fn preserves_whitespace(&self, tag: &str) -> bool {
        match self.context {
            Context::Html => HTML_PRESERVE_WHITESPACE.contains(&tag),
            Context::Svg => SVG_PRESERVE_WHITESPACE.contains(&tag),
            Context::MathMl => MATHML_PRESERVE_WHITESPACE.contains(&tag),
        }
    }
}

/// Prefix bound by a namespace declaration attribute, `Some(None)` for `xmlns`
fn declared_prefix(attr_name: &str) -> Option<Option<&str>> {
    if attr_name == "xmlns" {
        Some(None)
    } else {
        attr_name.strip_prefix("xmlns:").map(Some)
    }
}

fn declare_if_unbound(
    prefix: Option<&str>,
    uri: &str,
    scope: &mut NamespaceScope,
    output: &mut String,
) {
    if prefix == Some("xml") || uri == XML_NAMESPACE {
        return;
    }
    if prefix.is_some() && uri.is_empty() {
        return;
    }
    if scope.lookup(prefix) == uri {
        return;
    }

    match prefix {
        Some(prefix) => write_xml_attribute(&format!("xmlns:{}", prefix), uri, output),
        None => write_xml_attribute("xmlns", uri, output),
    }
    scope.bind(prefix, uri);
}

fn write_xml_attribute(name: &str, value: &str, output: &mut String) {
    output.push(' ');
    output.push_str(name);
    output.push_str("=\"");
    escape_xml(value, true, output);
    output.push('"');
}

fn escape_html_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            c => output.push(c),
        }
    }
}

fn escape_html_attribute(value: &str, output: &mut String) {
    for c in value.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            c => output.push(c),
        }
    }
}

fn escape_xml(text: &str, in_attribute: bool, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' if in_attribute => output.push_str("&quot;"),
            c => output.push(c),
        }
    }
}
