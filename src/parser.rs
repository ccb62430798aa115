//! Markup parsing into an `RcDom` tree
//!
//! HTML input goes through html5ever, which implements the WHATWG parsing
//! algorithm: malformed markup is repaired the same way a browser would repair
//! it, so the sanitizer filters the tree the browser would actually build.
//! SVG and MathML documents go through xml5ever, which keeps names
//! case-sensitive and namespace prefixes intact (`viewBox`, `xlink:href`).
//!
//! Both parsers are error-tolerant and build into `markup5ever_rcdom`, so the
//! filter and formatter work on one tree type regardless of context.
//!
//! # Examples
//!
//! ```rust
//! use dom_sanitizer::parser::parse_markup;
//! use dom_sanitizer::Context;
//!
//! let parsed = parse_markup("<div><p>Hello</p></div>", Context::Html).expect("parse");
//! assert!(parsed.synthesized_wrapper);
//!
//! let parsed = parse_markup("<!DOCTYPE html><html><body></body></html>", Context::Html)
//!     .expect("parse");
//! assert!(!parsed.synthesized_wrapper);
//!
//! let parsed = parse_markup("<svg xmlns=\"http://www.w3.org/2000/svg\"/>", Context::Svg)
//!     .expect("parse");
//! assert!(!parsed.synthesized_wrapper);
//! ```
//!
//! # Configuration
//!
//! Default parser options are used:
//! - **Scripting**: Disabled (`<noscript>` content is parsed as markup)
//! - **Error Handling**: Errors are collected but parsing continues
//! - **Entities**: Character references are decoded; XML external entities
//!   are never fetched or expanded

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::charset::{decode_to_utf8, detect_charset};
use crate::error::SanitizeError;
use crate::rules::Context;

/// A parsed document plus what the parser added on its own
pub struct ParsedMarkup {
    /// The document tree
    pub dom: RcDom,
    /// True when the `html`/`head`/`body` wrapper was not present in the
    /// input and was synthesized by the HTML parser
    pub synthesized_wrapper: bool,
}

/// Parse markup text into a DOM tree for the given context
///
/// # Errors
///
/// - `SanitizeError::ParseError`: an SVG/MathML document contains no element
///   at all (this includes empty input)
///
/// Empty HTML input is not an error: it parses to a bare synthesized wrapper.
pub fn parse_markup(input: &str, context: Context) -> Result<ParsedMarkup, SanitizeError> {
    if context.is_xml() {
        let dom = xml5ever::driver::parse_document(RcDom::default(), Default::default())
            .one(input);
        if document_element(&dom.document).is_none() {
            return Err(SanitizeError::ParseError(format!(
                "no root element found in {} input",
                context
            )));
        }
        Ok(ParsedMarkup {
            dom,
            synthesized_wrapper: false,
        })
    } else {
        let dom = html5ever::parse_document(RcDom::default(), Default::default()).one(input);
        Ok(ParsedMarkup {
            dom,
            synthesized_wrapper: !has_explicit_wrapper(input),
        })
    }
}

/// Parse markup bytes, detecting and decoding their charset first
///
/// # Arguments
///
/// * `input` - Raw markup bytes
/// * `content_type` - Optional Content-Type header value (e.g., "image/svg+xml; charset=UTF-8")
/// * `context` - Markup context selecting the parser and declaration syntax
///
/// # Errors
///
/// - `SanitizeError::EncodingError`: the bytes are invalid for the detected
///   charset, or the charset is unsupported
/// - `SanitizeError::ParseError`: as for [`parse_markup`]
pub fn parse_markup_bytes(
    input: &[u8],
    content_type: Option<&str>,
    context: Context,
) -> Result<ParsedMarkup, SanitizeError> {
    let charset = detect_charset(content_type, input, context);
    let text = decode_to_utf8(input, &charset)?;
    parse_markup(&text, context)
}

/// First element child of the document node
pub fn document_element(document: &Handle) -> Option<Handle> {
    document
        .children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
}

/// Whether the caller wrote any part of the document wrapper themselves
///
/// Only real tokens count: a doctype, or an `html`, `head` or `body` start
/// tag. Lookalikes inside comments, attribute values and raw text do not.
fn has_explicit_wrapper(input: &str) -> bool {
    let mut queue = BufferQueue::default();
    queue.push_back(StrTendril::from_slice(input));

    let mut tokenizer = Tokenizer::new(WrapperProbe::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut queue);
    tokenizer.end();
    tokenizer.sink.explicit
}

/// Token sink recording whether a wrapper token was seen
///
/// Without a tree builder the tokenizer cannot tell when to switch into raw
/// text, so the sink does it for the elements whose content is not markup.
#[derive(Default)]
struct WrapperProbe {
    explicit: bool,
}

impl WrapperProbe {
    fn start_tag(&mut self, tag: &Tag) -> TokenSinkResult<()> {
        match &*tag.name {
            "html" | "head" | "body" => {
                self.explicit = true;
                TokenSinkResult::Continue
            }
            _ if tag.self_closing => TokenSinkResult::Continue,
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                TokenSinkResult::RawData(RawKind::Rawtext)
            }
            "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
            "plaintext" => TokenSinkResult::Plaintext,
            _ => TokenSinkResult::Continue,
        }
    }
}

impl TokenSink for WrapperProbe {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::DoctypeToken(_) => {
                self.explicit = true;
                TokenSinkResult::Continue
            }
            Token::TagToken(ref tag) if tag.kind == TagKind::StartTag => self.start_tag(tag),
            _ => TokenSinkResult::Continue,
        }
    }
}
