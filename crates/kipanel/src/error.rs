//! Error types for panelization.
//!
//! [`PanelError`] wraps every condition that stops a run. Each variant maps
//! to a distinct process exit code so scripts can tell failures apart.

use std::io;

use thiserror::Error;

use kipanel_parser::ParseError;

use crate::identifier::IdentifierError;

/// The main error type for kipanel operations.
///
/// The `Parse` variant keeps the source text so callers can render
/// diagnostics with source snippets.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Identifier error: {0}")]
    Identifier(#[from] IdentifierError),
}

impl PanelError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PanelError::Io(_) => 1,
            PanelError::Parse { .. } => 2,
            PanelError::Config(_) => 3,
            PanelError::Geometry(_) => 4,
            PanelError::Identifier(_) => 5,
        }
    }
}
