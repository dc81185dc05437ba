//! kipanel - Panelize KiCad boards.
//!
//! Reads a single `.kicad_pcb` board and builds a rectangular array of
//! copies with globally unique identifiers, optional edge rails, v-score
//! cut lines and a new panel outline, then writes the result back in the
//! same format.

pub mod config;
pub mod export;
pub mod identifier;
pub mod layout;
pub mod report;

mod board;
mod error;
mod panel;

pub use kipanel_core::{document, geometry};

pub use error::PanelError;
pub use panel::Panel;

use log::{debug, info, trace};

use kipanel_core::document::Document;
use kipanel_parser::ParseConfig;

use config::AppConfig;
use identifier::{NamingScheme, SuffixScheme};

/// Builder for parsing, panelizing and writing boards.
///
/// # Examples
///
/// ```rust,no_run
/// use kipanel::{Panelizer, config::AppConfig};
///
/// let source = std::fs::read_to_string("board.kicad_pcb").unwrap();
///
/// let mut config = AppConfig::default();
/// config.panel_mut().set_count(Some(2), Some(3));
///
/// let panelizer = Panelizer::new(config);
/// let board = panelizer.parse(&source).expect("Failed to parse");
/// let panel = panelizer.panelize(&board).expect("Failed to panelize");
///
/// for advisory in panel.advisories() {
///     println!("warning: {advisory}");
/// }
/// let text = panelizer.render(&panel);
/// ```
pub struct Panelizer {
    config: AppConfig,
    scheme: Box<dyn NamingScheme>,
}

impl Default for Panelizer {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Panelizer {
    /// Create a panelizer that renames identifiers with the configured
    /// separator (`R1` becomes `R1_1`, `R1_2`, ...).
    pub fn new(config: AppConfig) -> Self {
        let scheme = Box::new(SuffixScheme::new(config.identifiers().separator()));
        Self { config, scheme }
    }

    /// Replace the naming scheme used for references and net names.
    pub fn with_naming_scheme(mut self, scheme: impl NamingScheme + 'static) -> Self {
        self.scheme = Box::new(scheme);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse board source text.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Parse`] with the source attached for syntax
    /// errors or a root list other than `kicad_pcb`.
    pub fn parse(&self, source: &str) -> Result<Document, PanelError> {
        info!("Parsing board");

        let document = kipanel_parser::parse(source, &ParseConfig::board())
            .map_err(|err| PanelError::new_parse_error(err, source))?;

        debug!(version = document.version().unwrap_or_default(); "Board parsed successfully");
        trace!(document:?; "Parsed board");

        Ok(document)
    }

    /// Build the panel for a parsed board.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Config`] for invalid options,
    /// [`PanelError::Geometry`] for boards without an outline or with
    /// unsupported content, and [`PanelError::Identifier`] when renaming
    /// produces duplicate identifiers.
    pub fn panelize(&self, board: &Document) -> Result<Panel, PanelError> {
        self.config.validate()?;

        info!("Building panel");
        let panel = panel::assemble(board, &self.config, self.scheme.as_ref())?;
        info!(
            columns = panel.plan().columns(),
            rows = panel.plan().rows(),
            advisories = panel.advisories().len();
            "Panel built"
        );

        Ok(panel)
    }

    /// Serialize a panel to board source text.
    pub fn render(&self, panel: &Panel) -> String {
        export::to_string(panel.document())
    }
}
