//! DOM Sanitizer - allow-list markup sanitization for HTML, SVG and MathML
//!
//! This library takes untrusted markup and returns markup that contains only
//! the elements and attributes permitted for its context, with script
//! execution vectors removed: inline event handlers, script-bearing tags,
//! dangerous URL schemes, and embedded-object tags.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `rules`: Markup contexts, case rules, and the allow/deny overlay
//! - `baseline`: Built-in allow-lists per context
//! - `security`: Event handler detection, URL validation, depth limits
//! - `charset`: Character encoding detection and handling
//! - `parser`: HTML5 parsing using html5ever, XML parsing using xml5ever
//! - `filter`: Tree walker that prunes disallowed content
//! - `formatter`: Serialization of the filtered tree
//! - `sanitizer`: The `DomSanitizer` facade
//!
//! # Examples
//!
//! ```rust
//! use dom_sanitizer::{Context, DomSanitizer};
//!
//! let sanitizer = DomSanitizer::new(Context::Html);
//! let clean = sanitizer
//!     .sanitize("<div><p class=\"foo\" onclick=\"alert('x')\">bar</p><script>alert('y')</script></div>")
//!     .expect("valid html");
//! assert_eq!(clean, "<div><p class=\"foo\">bar</p></div>");
//!
//! let svg = DomSanitizer::new(Context::Svg);
//! assert!(svg.sanitize("<foo></foo>").is_err());
//! ```
//!
//! # Logging
//!
//! Pruning decisions are reported through the `log` facade (`debug` for
//! removed elements and attributes, `warn` for depth-limit pruning). No logger
//! is installed by the library.

// Module declarations
mod baseline;
pub mod charset;
pub mod error;
pub mod filter;
pub mod formatter;
pub mod parser;
pub mod rules;
pub mod sanitizer;
pub mod security;

// Re-export main types for convenience
pub use error::SanitizeError;
pub use formatter::SanitizeOptions;
pub use parser::parse_markup;
pub use rules::Context;
pub use sanitizer::DomSanitizer;
