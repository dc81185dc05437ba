//! Lexical analyzer for board files.
//!
//! The lexer converts source text into a stream of [`Token`]s: parentheses,
//! quoted strings, bare atoms and whitespace. The public entry point is
//! [`tokenize`], which recovers after errors and reports every diagnostic
//! in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// A piece of string content between the quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringFragment<'a> {
    Literal(&'a str),
    Escaped(char),
    /// An escape the format does not define; kept with its backslash.
    Unknown(char),
}

/// Run of characters without quotes or backslashes.
fn string_literal_fragment<'a>(input: &mut Input<'a>) -> IResult<'a, StringFragment<'a>> {
    take_while(1.., |c: char| c != '"' && c != '\\')
        .map(StringFragment::Literal)
        .parse_next(input)
}

/// Backslash escape: `\"`, `\\`, `\n`, `\r`, `\t`.
fn string_escape<'a>(input: &mut Input<'a>) -> IResult<'a, StringFragment<'a>> {
    preceded('\\', any)
        .map(|c: char| match c {
            'n' => StringFragment::Escaped('\n'),
            'r' => StringFragment::Escaped('\r'),
            't' => StringFragment::Escaped('\t'),
            '\\' => StringFragment::Escaped('\\'),
            '"' => StringFragment::Escaped('"'),
            other => StringFragment::Unknown(other),
        })
        .parse_next(input)
}

/// Parse a double-quoted string literal.
///
/// Strings may span lines. Once the opening quote is seen the lexer
/// commits, so a missing closing quote reports E001 from the opening quote
/// to the end of input.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let string_content = repeat(0.., alt((string_literal_fragment, string_escape))).fold(
        String::new,
        |mut acc: String, fragment| {
            match fragment {
                StringFragment::Literal(text) => acc.push_str(text),
                StringFragment::Escaped(c) => acc.push(c),
                StringFragment::Unknown(c) => {
                    acc.push('\\');
                    acc.push(c);
                }
            }
            acc
        },
    );

    let start_pos = input.current_token_start();

    '"'.parse_next(input)?;

    cut_err(terminated(string_content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

fn is_bare_char(c: char) -> bool {
    !c.is_whitespace() && !c.is_control() && !matches!(c, '(' | ')' | '"' | '\u{feff}')
}

/// Parse a bare atom: number, symbol, layer name, hex mask, UUID, ...
fn bare<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., is_bare_char)
        .map(Token::Bare)
        .parse_next(input)
}

/// Parse whitespace, including newlines and a byte-order mark
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() || c == '\u{feff}')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn paren<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt(('('.value(Token::LeftParen), ')'.value(Token::RightParen))).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((whitespace, paren, string_literal, bare)).parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.emit(Self::convert_err_mode(e, error_pos));

                    // Skip one character and resume
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 (unexpected character) when no
    /// [`LexerDiagnostic`] context is attached.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(Span::new(*start..error_pos), code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
            .with_help("control characters are only allowed inside quoted strings")
    }
}

/// Tokenize board source text, collecting every lexical error.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully lexed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
