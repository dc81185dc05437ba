//! Tree builder for board file tokens.
//!
//! Turns the flat token stream from the [`lexer`](super::lexer) into a
//! [`Document`]. Lists are assembled on an explicit stack so deeply nested
//! files cannot overflow the call stack. The first structural problem stops
//! the build and is reported as a [`Diagnostic`].

use kipanel_core::document::{Atom, Document, List, Node};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Options for [`parse`](crate::parse).
///
/// # Examples
///
/// ```
/// # use kipanel_parser::ParseConfig;
/// let config = ParseConfig::board();
/// assert_eq!(config.root_tag(), Some("kicad_pcb"));
///
/// let any_root = ParseConfig::default();
/// assert_eq!(any_root.root_tag(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    root_tag: Option<String>,
}

impl ParseConfig {
    /// A configuration that accepts any root tag.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that only accepts `(kicad_pcb ...)` documents.
    pub fn board() -> Self {
        Self::new().with_root_tag("kicad_pcb")
    }

    /// Require the root list to carry `tag`.
    pub fn with_root_tag(mut self, tag: impl Into<String>) -> Self {
        self.root_tag = Some(tag.into());
        self
    }

    /// The required root tag, if any.
    pub fn root_tag(&self) -> Option<&str> {
        self.root_tag.as_deref()
    }
}

/// A list that has been opened but not yet closed.
struct OpenList {
    tag: Option<String>,
    children: Vec<Node>,
    open: Span,
}

struct TreeBuilder<'c> {
    config: &'c ParseConfig,
    stack: Vec<OpenList>,
    root: Option<(List, Span)>,
}

impl<'c> TreeBuilder<'c> {
    fn new(config: &'c ParseConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
            root: None,
        }
    }

    fn feed(&mut self, token: &PositionedToken<'_>) -> Result<()> {
        match &token.token {
            Token::Whitespace => Ok(()),
            Token::LeftParen => self.open(token.span),
            Token::RightParen => self.close(token.span),
            Token::Bare(text) => self.bare(token.span, text),
            Token::StringLiteral(text) => {
                self.atom(token.span, Node::Atom(Atom::String(text.clone())))
            }
        }
    }

    fn open(&mut self, span: Span) -> Result<()> {
        if self.stack.is_empty() {
            if let Some((_, root_span)) = &self.root {
                return Err(Self::outside_root(span, "second top-level list")
                    .with_context(*root_span, "root list is here"));
            }
        }
        self.require_tag()?;
        self.stack.push(OpenList {
            tag: None,
            children: Vec::new(),
            open: span,
        });
        Ok(())
    }

    fn bare(&mut self, span: Span, text: &str) -> Result<()> {
        match self.stack.last_mut() {
            Some(top) if top.tag.is_none() => {
                top.tag = Some(text.to_string());
                Ok(())
            }
            _ => self.atom(span, Node::Atom(Atom::from_bare(text))),
        }
    }

    fn atom(&mut self, span: Span, node: Node) -> Result<()> {
        if self.stack.is_empty() {
            let diag = Self::outside_root(span, "not inside any list");
            return Err(match &self.root {
                Some((_, root_span)) => diag.with_context(*root_span, "root list is here"),
                None => diag,
            });
        }
        self.require_tag()?;
        if let Some(top) = self.stack.last_mut() {
            top.children.push(node);
        }
        Ok(())
    }

    fn close(&mut self, span: Span) -> Result<()> {
        let Some(open) = self.stack.pop() else {
            return Err(Diagnostic::error("unmatched `)`")
                .with_code(ErrorCode::E100)
                .with_label(span, "no list is open here")
                .with_help("remove the extra `)`"));
        };

        let full_span = open.open.union(span);
        let Some(tag) = open.tag else {
            return Err(Self::missing_tag(full_span, "empty list"));
        };
        let list = List::with_children(tag, open.children);

        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(Node::List(list));
                Ok(())
            }
            None => {
                if let Some(expected) = self.config.root_tag() {
                    if list.tag() != expected {
                        return Err(Diagnostic::error(format!(
                            "expected a `{expected}` document, found `{}`",
                            list.tag()
                        ))
                        .with_code(ErrorCode::E105)
                        .with_label(open.open, "root list opened here")
                        .with_help(format!("the file must start with `({expected}`")));
                    }
                }
                self.root = Some((list, full_span));
                Ok(())
            }
        }
    }

    /// The innermost open list must already have its tag.
    fn require_tag(&self) -> Result<()> {
        match self.stack.last() {
            Some(top) if top.tag.is_none() => {
                Err(Self::missing_tag(top.open, "expected a tag after `(`"))
            }
            _ => Ok(()),
        }
    }

    fn finish(self, source_len: usize) -> Result<Document> {
        if let Some(innermost) = self.stack.last() {
            let mut diag = Diagnostic::error("unclosed list")
                .with_code(ErrorCode::E101)
                .with_label(innermost.open, "this list is never closed")
                .with_help("add the missing `)`");
            if self.stack.len() > 1 {
                diag = diag.with_context(self.stack[0].open, "inside this list");
            }
            return Err(diag);
        }

        match self.root {
            Some((root, _)) => Ok(Document::new(root)),
            None => Err(Diagnostic::error("empty document")
                .with_code(ErrorCode::E104)
                .with_label(Span::new(0..source_len), "no list found")
                .with_help("a board file holds one top-level list, e.g. `(kicad_pcb ...)`")),
        }
    }

    fn outside_root(span: Span, label: &str) -> Diagnostic {
        Diagnostic::error("content outside the root list")
            .with_code(ErrorCode::E103)
            .with_label(span, label)
            .with_help("a board file holds exactly one top-level list")
    }

    fn missing_tag(span: Span, label: &str) -> Diagnostic {
        Diagnostic::error("list without a tag")
            .with_code(ErrorCode::E102)
            .with_label(span, label)
            .with_help("start the list with a name, e.g. `(layer \"F.Cu\")`")
    }
}

/// Build a document from lexed tokens.
pub(crate) fn build_document(
    tokens: &[PositionedToken<'_>],
    config: &ParseConfig,
    source_len: usize,
) -> Result<Document> {
    let mut builder = TreeBuilder::new(config);
    for token in tokens {
        builder.feed(token)?;
    }
    builder.finish(source_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn build(source: &str, config: &ParseConfig) -> Result<Document> {
        let tokens = tokenize(source).expect("test source should lex");
        build_document(&tokens, config, source.len())
    }

    fn build_err(source: &str) -> Diagnostic {
        build(source, &ParseConfig::board()).unwrap_err()
    }

    #[test]
    fn test_build_nested_lists() {
        let document = build(
            "(kicad_pcb (version 20221018) (net 1 \"GND\") (layers (0 \"F.Cu\" signal)))",
            &ParseConfig::board(),
        )
        .unwrap();

        let root = document.root();
        assert_eq!(root.tag(), "kicad_pcb");
        assert_eq!(root.lists().count(), 3);
        assert_eq!(document.version(), Some(20221018));

        let net = root.find("net").unwrap();
        assert_eq!(net.number(0), Some(1.0));
        assert_eq!(net.atom(1), Some(&Atom::String("GND".into())));

        // Layer ordinals are numeric tags
        let layer = root.find("layers").and_then(|layers| layers.find("0")).unwrap();
        assert_eq!(layer.text(0), Some("F.Cu"));
        assert_eq!(layer.text(1), Some("signal"));
    }

    #[test]
    fn test_unmatched_close() {
        let diag = build_err("(kicad_pcb))");
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.labels()[0].span(), Span::new(11..12));
    }

    #[test]
    fn test_unclosed_list() {
        let diag = build_err("(kicad_pcb (net 0 \"\")\n  (gr_line (start 0 0)");
        assert_eq!(diag.code(), Some(ErrorCode::E101));
        assert_eq!(diag.labels()[0].span(), Span::new(24..25));
        assert_eq!(diag.labels()[1].span(), Span::new(0..1));
    }

    #[test]
    fn test_list_without_tag() {
        assert_eq!(build_err("(kicad_pcb ())").code(), Some(ErrorCode::E102));
        assert_eq!(build_err("(kicad_pcb (\"x\"))").code(), Some(ErrorCode::E102));
        assert_eq!(build_err("(kicad_pcb ((a)))").code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_content_outside_root() {
        let diag = build_err("stray (kicad_pcb)");
        assert_eq!(diag.code(), Some(ErrorCode::E103));

        let diag = build_err("(kicad_pcb) (kicad_pcb)");
        assert_eq!(diag.code(), Some(ErrorCode::E103));
        assert_eq!(diag.labels().len(), 2);
        assert_eq!(diag.labels()[1].span(), Span::new(0..11));

        assert_eq!(build_err("(kicad_pcb) 42").code(), Some(ErrorCode::E103));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(build_err("").code(), Some(ErrorCode::E104));
        assert_eq!(build_err("  \n ").code(), Some(ErrorCode::E104));
    }

    #[test]
    fn test_root_tag_check() {
        let diag = build_err("(kicad_sch (version 1))");
        assert_eq!(diag.code(), Some(ErrorCode::E105));
        assert!(diag.message().contains("kicad_sch"));

        let document = build("(kicad_sch (version 1))", &ParseConfig::new()).unwrap();
        assert_eq!(document.root().tag(), "kicad_sch");
    }
}
