//! Spans of board source annotated with a short message.

use crate::span::Span;

/// The role a [`Label`] plays in a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// The token or list the diagnostic is about.
    Offending,

    /// An enclosing or earlier list, e.g. the `(kicad_pcb` root that a stray
    /// second list sits beside.
    Context,
}

/// A message attached to a span of the board file.
///
/// ```text
/// error[E101]: unclosed list
///   --> board.kicad_pcb:12:3
///    |
///  1 | (kicad_pcb (version 20221018)
///    | - inside this list
/// ...
/// 12 |   (footprint "R_0603"
///    |   ^ this list is never closed
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    kind: LabelKind,
    span: Span,
    message: String,
}

impl Label {
    pub(crate) fn new(kind: LabelKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
