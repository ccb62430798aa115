//! Error types for sanitization operations

use std::fmt;

/// Errors that can occur while sanitizing markup
///
/// Filtering decisions (dropped elements, stripped attributes, rejected URLs)
/// are never errors. Every variant here means the caller must not use the
/// input at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    /// Input could not be turned into a usable tree
    ParseError(String),
    /// Byte input is invalid for its detected charset
    EncodingError(String),
    /// Tree parsed, but its root element does not belong to the context
    StructuralInvalidity {
        /// Root tag the context requires
        expected: &'static str,
        /// Root tag that was found
        found: String,
    },
}

impl SanitizeError {
    /// Get numeric error code
    pub fn code(&self) -> u32 {
        match self {
            SanitizeError::ParseError(_) => 1,
            SanitizeError::EncodingError(_) => 2,
            SanitizeError::StructuralInvalidity { .. } => 3,
        }
    }

    /// Returns true for failures reported by the parser rather than the walker
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            SanitizeError::ParseError(_) | SanitizeError::EncodingError(_)
        )
    }
}

impl fmt::Display for SanitizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitizeError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            SanitizeError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            SanitizeError::StructuralInvalidity { expected, found } => write!(
                f,
                "Structural invalidity: expected <{}> root element, found <{}>",
                expected, found
            ),
        }
    }
}

impl std::error::Error for SanitizeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            SanitizeError::ParseError("empty".to_string()),
            SanitizeError::EncodingError("bad".to_string()),
            SanitizeError::StructuralInvalidity {
                expected: "svg",
                found: "foo".to_string(),
            },
        ];
        let codes: Vec<u32> = errors.iter().map(SanitizeError::code).collect();
        assert_eq!(codes, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_failure_grouping() {
        assert!(SanitizeError::ParseError(String::new()).is_parse_failure());
        assert!(SanitizeError::EncodingError(String::new()).is_parse_failure());
        assert!(
            !SanitizeError::StructuralInvalidity {
                expected: "math",
                found: "div".to_string(),
            }
            .is_parse_failure()
        );
    }

    #[test]
    fn test_display_names_root_tags() {
        let err = SanitizeError::StructuralInvalidity {
            expected: "svg",
            found: "foo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Structural invalidity: expected <svg> root element, found <foo>"
        );
    }
}
