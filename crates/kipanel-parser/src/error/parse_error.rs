//! The error returned when a board file cannot be read into a document.

use std::fmt;

use crate::error::{Diagnostic, ErrorCode};

/// Result of a single tree-building step; it stops at the first problem.
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// Error returned by [`parse`](crate::parse).
///
/// The lexer reports every bad token of the file in one pass, so a broken
/// board can carry several diagnostics. Tree building stops at the first
/// structural problem and contributes at most one.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Every diagnostic in source order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Error codes of the diagnostics that carry one, in source order.
    pub fn codes(&self) -> impl Iterator<Item = ErrorCode> + '_ {
        self.diagnostics.iter().filter_map(Diagnostic::code)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.diagnostics.first() else {
            return write!(f, "unreadable board file");
        };
        write!(f, "{first}")?;
        match self.diagnostics.len() - 1 {
            0 => Ok(()),
            1 => write!(f, "; 1 more problem in the board file"),
            more => write!(f, "; {more} more problems in the board file"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_diagnostic() {
        let err: ParseError = Diagnostic::error("unclosed list")
            .with_code(ErrorCode::E101)
            .into();

        assert_eq!(err.codes().collect::<Vec<_>>(), vec![ErrorCode::E101]);
        assert_eq!(err.to_string(), "error[E101]: unclosed list");
    }

    #[test]
    fn test_display_counts_remaining_problems() {
        let err = ParseError::new(vec![
            Diagnostic::error("unexpected character").with_code(ErrorCode::E002),
            Diagnostic::error("unexpected character").with_code(ErrorCode::E002),
            Diagnostic::error("unterminated string literal").with_code(ErrorCode::E001),
        ]);
        assert_eq!(
            err.to_string(),
            "error[E002]: unexpected character; 2 more problems in the board file"
        );

        let err = ParseError::new(vec![Diagnostic::error("a"), Diagnostic::error("b")]);
        assert_eq!(err.to_string(), "error: a; 1 more problem in the board file");

        assert_eq!(ParseError::new(Vec::new()).to_string(), "unreadable board file");
    }
}
