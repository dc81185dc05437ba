//! Error and diagnostic system for the board file parser.
//!
//! Every problem in a board file is a [`Diagnostic`] with an optional
//! error code, labeled spans and help text. A label either points at the
//! offending token or gives context, usually the enclosing list. All
//! diagnostics from one parse are wrapped in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use kipanel_parser::error::{Diagnostic, ErrorCode};
//! # use kipanel_parser::Span;
//!
//! let diag = Diagnostic::error("unmatched `)`")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(120..121), "no list is open here")
//!     .with_context(Span::new(0..1), "root list opened here")
//!     .with_help("remove the extra `)`");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::{Label, LabelKind};
pub use parse_error::ParseError;
