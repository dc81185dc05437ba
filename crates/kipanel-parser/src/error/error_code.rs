//! Error codes for parser diagnostics.
//!
//! - `E0xx` - Lexer errors
//! - `E1xx` - Tree building errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed.
    E001,

    /// Unexpected character.
    ///
    /// A control character was found outside a string.
    E002,

    // =========================================================================
    // Tree Errors (E1xx)
    // =========================================================================
    /// Unmatched closing parenthesis.
    E100,

    /// Unclosed list.
    ///
    /// The input ended before every open list was closed.
    E101,

    /// List without a tag.
    ///
    /// Every list must start with a bare symbol naming it, e.g. `(layer "F.Cu")`.
    E102,

    /// Content outside the root list.
    ///
    /// Atoms or a second list were found before or after the root list.
    E103,

    /// Empty document.
    E104,

    /// Unexpected root tag.
    ///
    /// The root list does not carry the tag the caller asked for.
    E105,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E100 => "unmatched closing parenthesis",
            ErrorCode::E101 => "unclosed list",
            ErrorCode::E102 => "list without a tag",
            ErrorCode::E103 => "content outside the root list",
            ErrorCode::E104 => "empty document",
            ErrorCode::E105 => "unexpected root tag",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E105.to_string(), "E105");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unterminated string literal");
        assert_eq!(ErrorCode::E102.description(), "list without a tag");
    }
}
