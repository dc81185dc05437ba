//! # kipanel Parser
//!
//! Parser for the KiCad board file format: a single nested list of tagged
//! lists, quoted strings and bare atoms.
//!
//! ## Usage
//!
//! ```
//! # use kipanel_parser::{parse, ParseConfig, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         (kicad_pcb (version 20221018) (generator pcbnew)
//!           (gr_line (start 0 0) (end 40 0) (layer "Edge.Cuts") (width 0.1))
//!         )
//!     "#;
//!
//!     let document = parse(source, &ParseConfig::board())?;
//!     assert_eq!(document.root().find_all("gr_line").count(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
mod lexer;
mod parser;
mod span;
mod tokens;

pub use error::ParseError;
pub use parser::ParseConfig;
pub use span::Span;

use log::debug;

use kipanel_core::document::Document;

/// Parse board source text into a [`Document`].
///
/// 1. **Tokenize** - Convert source text to tokens, collecting every lexical error
/// 2. **Build** - Assemble the nested lists, stopping at the first structural error
///
/// # Errors
///
/// Returns a [`ParseError`] with one or more diagnostics, each carrying an
/// error code, a labeled byte span and help text.
pub fn parse(source: &str, config: &ParseConfig) -> Result<Document, ParseError> {
    let tokens = lexer::tokenize(source)?;
    debug!(tokens = tokens.len(); "Tokenized board source");

    let document = parser::build_document(&tokens, config, source.len())?;
    debug!(
        root = document.root().tag(),
        sections = document.root().children().len();
        "Built document tree"
    );
    Ok(document)
}
