//! Tokens produced by the [`lexer`](super::lexer).

use crate::span::Span;

/// A lexical token of the board file grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// A double-quoted string with escapes decoded
    StringLiteral(String),
    /// Any other run of non-delimiter characters (numbers, symbols, hex masks)
    Bare(&'a str),
    /// Spaces, tabs and newlines
    Whitespace,
}

/// A token together with its location in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'a> {
    pub token: Token<'a>,
    pub span: Span,
}

impl<'a> PositionedToken<'a> {
    pub fn new(token: Token<'a>, span: Span) -> Self {
        Self { token, span }
    }
}
