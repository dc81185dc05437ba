//! The core diagnostic type.
//!
//! A [`Diagnostic`] is one problem in a board file: a message, an optional
//! error code, labeled source spans and help text. Every diagnostic stops
//! the file from being panelized.

use std::fmt;

use crate::{
    error::{
        error_code::ErrorCode,
        label::{Label, LabelKind},
    },
    span::Span,
};

/// A diagnostic message with source location information.
///
/// ```text
/// error[E100]: unmatched `)`
///   --> board.kicad_pcb:40:1
///    |
/// 40 | )
///    | ^ no list is open here
///    |
///    = help: remove the extra `)`
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use kipanel_parser::error::{Diagnostic, ErrorCode};
    /// # use kipanel_parser::Span;
    ///
    /// let diag = Diagnostic::error("list without a tag")
    ///     .with_code(ErrorCode::E102)
    ///     .with_label(Span::new(4..5), "expected a tag after `(`")
    ///     .with_help("start the list with a name, e.g. `(layer \"F.Cu\")`");
    /// assert_eq!(diag.to_string(), "error[E102]: list without a tag");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Point at the offending token or list.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(LabelKind::Offending, span, message));
        self
    }

    /// Point at a list that explains the problem, such as the enclosing one.
    pub fn with_context(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(LabelKind::Context, span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error")?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_bare() {
        let diag = Diagnostic::error("empty document");

        assert_eq!(diag.message(), "empty document");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
        assert_eq!(diag.to_string(), "error: empty document");
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("content outside the root list")
            .with_code(ErrorCode::E103)
            .with_label(Span::new(100..120), "unexpected list")
            .with_context(Span::new(0..90), "root list is here")
            .with_help("a board file holds exactly one top-level list");

        assert_eq!(diag.code(), Some(ErrorCode::E103));
        let kinds: Vec<_> = diag.labels().iter().map(Label::kind).collect();
        assert_eq!(kinds, vec![LabelKind::Offending, LabelKind::Context]);
        assert_eq!(
            diag.help(),
            Some("a board file holds exactly one top-level list")
        );
    }
}
