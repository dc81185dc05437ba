//! Configuration types for panelization.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file. Missing fields fall back to the defaults of the classic
//! panelizer script.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`PanelConfig`] - Grid size (board count or envelope) and padding.
//! - [`RailsConfig`] - Edge rail widths and rail text.
//! - [`VScoreConfig`] - V-score layers, label text and extension.
//! - [`IdentifierConfig`] - Shared nets and the renaming separator.
//! - [`OutlineConfig`] - Outline layer and what happens to board contours.
//! - [`ReportConfig`] - Size advisory threshold and the report note.
//!
//! # Example
//!
//! ```
//! # use kipanel::config::{AppConfig, OutlineStrategy};
//! let config: AppConfig = toml::from_str(r#"
//!     [panel]
//!     columns = 2
//!     rows = 3
//!     padding = 2.0
//!
//!     [identifiers]
//!     shared_nets = ["GND"]
//!
//!     [outline]
//!     strategy = { move_to_layer = "Dwgs.User" }
//! "#).unwrap();
//!
//! assert_eq!(config.panel().padding(), 2.0);
//! assert_eq!(config.vscore().text(), "V-SCORE");
//! assert_eq!(
//!     config.outline().strategy(),
//!     &OutlineStrategy::MoveToLayer("Dwgs.User".to_string())
//! );
//! ```

use serde::Deserialize;

use crate::{
    error::PanelError,
    layout::{GridSpec, RailWidths},
};

/// Smallest rail that can carry rail text, in millimetres.
pub const MIN_RAIL_WIDTH_FOR_TEXT: f64 = 2.0;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    panel: PanelConfig,

    #[serde(default)]
    rails: RailsConfig,

    #[serde(default)]
    vscore: VScoreConfig,

    #[serde(default)]
    identifiers: IdentifierConfig,

    #[serde(default)]
    outline: OutlineConfig,

    #[serde(default)]
    report: ReportConfig,
}

impl AppConfig {
    pub fn panel(&self) -> &PanelConfig {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut PanelConfig {
        &mut self.panel
    }

    pub fn rails(&self) -> &RailsConfig {
        &self.rails
    }

    pub fn rails_mut(&mut self) -> &mut RailsConfig {
        &mut self.rails
    }

    pub fn vscore(&self) -> &VScoreConfig {
        &self.vscore
    }

    pub fn vscore_mut(&mut self) -> &mut VScoreConfig {
        &mut self.vscore
    }

    pub fn identifiers(&self) -> &IdentifierConfig {
        &self.identifiers
    }

    pub fn identifiers_mut(&mut self) -> &mut IdentifierConfig {
        &mut self.identifiers
    }

    pub fn outline(&self) -> &OutlineConfig {
        &self.outline
    }

    pub fn outline_mut(&mut self) -> &mut OutlineConfig {
        &mut self.outline
    }

    pub fn report(&self) -> &ReportConfig {
        &self.report
    }

    pub fn report_mut(&mut self) -> &mut ReportConfig {
        &mut self.report
    }

    /// Checks option combinations that do not depend on the board.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Config`] for negative widths, rail text on a
    /// rail narrower than [`MIN_RAIL_WIDTH_FOR_TEXT`], or an invalid grid.
    pub fn validate(&self) -> Result<(), PanelError> {
        self.panel.grid()?;
        self.rails.validate()?;
        if self.outline.line_width <= 0.0 {
            return Err(PanelError::Config(
                "outline line width must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Grid and spacing configuration.
///
/// Either `columns` and `rows` or `max_width` and `max_height` must be set,
/// never both pairs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    columns: Option<u32>,
    rows: Option<u32>,
    max_width: Option<f64>,
    max_height: Option<f64>,
    padding: f64,
}

impl PanelConfig {
    /// Request an explicit `columns` x `rows` grid.
    pub fn set_count(&mut self, columns: Option<u32>, rows: Option<u32>) {
        self.columns = columns;
        self.rows = rows;
    }

    /// Request as many boards as fit into `max_width` x `max_height`.
    pub fn set_envelope(&mut self, max_width: Option<f64>, max_height: Option<f64>) {
        self.max_width = max_width;
        self.max_height = max_height;
    }

    pub fn set_padding(&mut self, padding: f64) {
        self.padding = padding;
    }

    /// Gap between neighbouring boards in millimetres.
    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Resolves the grid request.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Config`] when both or neither modes are
    /// requested, when a mode is only half specified, when a count is zero
    /// or when the padding is negative.
    pub fn grid(&self) -> Result<GridSpec, PanelError> {
        if self.padding < 0.0 {
            return Err(PanelError::Config("padding must not be negative".to_string()));
        }

        let count_given = self.columns.is_some() || self.rows.is_some();
        let envelope_given = self.max_width.is_some() || self.max_height.is_some();

        match (count_given, envelope_given) {
            (true, true) => Err(PanelError::Config(
                "specify the number of boards or the size of the panel, not both".to_string(),
            )),
            (false, false) => Err(PanelError::Config(
                "specify the number of boards or the size of the panel".to_string(),
            )),
            (true, false) => match (self.columns, self.rows) {
                (Some(columns), Some(rows)) if columns > 0 && rows > 0 => {
                    Ok(GridSpec::Explicit { columns, rows })
                }
                (Some(_), Some(_)) => Err(PanelError::Config(
                    "the number of boards must be at least 1 in each direction".to_string(),
                )),
                _ => Err(PanelError::Config(
                    "both the column and the row count are required".to_string(),
                )),
            },
            (false, true) => match (self.max_width, self.max_height) {
                (Some(max_width), Some(max_height)) if max_width > 0.0 && max_height > 0.0 => {
                    Ok(GridSpec::Envelope {
                        max_width,
                        max_height,
                    })
                }
                (Some(_), Some(_)) => Err(PanelError::Config(
                    "the panel size must be positive".to_string(),
                )),
                _ => Err(PanelError::Config(
                    "both the panel width and height are required".to_string(),
                )),
            },
        }
    }
}

/// Edge rail configuration.
///
/// The horizontal rail setting (`--hrail`) is the width of the strips on
/// the left and right of the panel; the vertical one (`--vrail`) the width
/// of the strips along the top and bottom.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RailsConfig {
    horizontal: f64,
    vertical: f64,
    horizontal_text: Option<String>,
    vertical_text: Option<String>,
    horizontal_title: bool,
    vertical_title: bool,
    text_layer: String,
    text_size: f64,
}

impl Default for RailsConfig {
    fn default() -> Self {
        Self {
            horizontal: 0.0,
            vertical: 0.0,
            horizontal_text: None,
            vertical_text: None,
            horizontal_title: false,
            vertical_title: false,
            text_layer: "F.SilkS".to_string(),
            text_size: 1.0,
        }
    }
}

impl RailsConfig {
    pub fn set_widths(&mut self, horizontal: f64, vertical: f64) {
        self.horizontal = horizontal;
        self.vertical = vertical;
    }

    pub fn set_horizontal_text(&mut self, text: Option<String>) {
        self.horizontal_text = text;
    }

    pub fn set_vertical_text(&mut self, text: Option<String>) {
        self.vertical_text = text;
    }

    pub fn set_titles(&mut self, horizontal: bool, vertical: bool) {
        self.horizontal_title = horizontal;
        self.vertical_title = vertical;
    }

    pub fn horizontal(&self) -> f64 {
        self.horizontal
    }

    pub fn vertical(&self) -> f64 {
        self.vertical
    }

    pub fn widths(&self) -> RailWidths {
        RailWidths::new(self.horizontal, self.vertical)
    }

    pub fn horizontal_text(&self) -> Option<&str> {
        self.horizontal_text.as_deref()
    }

    pub fn vertical_text(&self) -> Option<&str> {
        self.vertical_text.as_deref()
    }

    pub fn horizontal_title(&self) -> bool {
        self.horizontal_title
    }

    pub fn vertical_title(&self) -> bool {
        self.vertical_title
    }

    pub fn text_layer(&self) -> &str {
        &self.text_layer
    }

    pub fn text_size(&self) -> f64 {
        self.text_size
    }

    fn validate(&self) -> Result<(), PanelError> {
        if self.horizontal < 0.0 || self.vertical < 0.0 {
            return Err(PanelError::Config(
                "rail widths must not be negative".to_string(),
            ));
        }

        let horizontal_text = self.horizontal_text.is_some() || self.horizontal_title;
        let vertical_text = self.vertical_text.is_some() || self.vertical_title;
        if (horizontal_text && self.horizontal < MIN_RAIL_WIDTH_FOR_TEXT)
            || (vertical_text && self.vertical < MIN_RAIL_WIDTH_FOR_TEXT)
        {
            return Err(PanelError::Config(format!(
                "rail width must be at least {MIN_RAIL_WIDTH_FOR_TEXT}mm when using rail text"
            )));
        }
        Ok(())
    }
}

/// V-score line and label configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VScoreConfig {
    layer: String,
    text_layer: String,
    text: String,
    /// How far the lines extend past the panel; negative values recess them.
    extension: f64,
    text_size: f64,
    text_thickness: f64,
}

impl Default for VScoreConfig {
    fn default() -> Self {
        Self {
            layer: "Edge.Cuts".to_string(),
            text_layer: "User.Comments".to_string(),
            text: "V-SCORE".to_string(),
            extension: -0.05,
            text_size: 2.0,
            text_thickness: 0.1,
        }
    }
}

impl VScoreConfig {
    pub fn set_layer(&mut self, layer: impl Into<String>) {
        self.layer = layer.into();
    }

    pub fn set_text_layer(&mut self, layer: impl Into<String>) {
        self.text_layer = layer.into();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_extension(&mut self, extension: f64) {
        self.extension = extension;
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn text_layer(&self) -> &str {
        &self.text_layer
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn extension(&self) -> f64 {
        self.extension
    }

    pub fn text_size(&self) -> f64 {
        self.text_size
    }

    pub fn text_thickness(&self) -> f64 {
        self.text_thickness
    }
}

/// Identifier rewriting configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentifierConfig {
    /// Nets that stay connected across every board of the panel.
    shared_nets: Vec<String>,
    /// Placed between an identifier and its instance number.
    separator: String,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            shared_nets: Vec::new(),
            separator: "_".to_string(),
        }
    }
}

impl IdentifierConfig {
    pub fn add_shared_nets(&mut self, nets: impl IntoIterator<Item = String>) {
        for net in nets {
            if !self.shared_nets.contains(&net) {
                self.shared_nets.push(net);
            }
        }
    }

    pub fn shared_nets(&self) -> &[String] {
        &self.shared_nets
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

/// What happens to each board's own outer contour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineStrategy {
    /// Remove the contour; only the panel frame remains.
    #[default]
    Discard,
    /// Keep the contour as documentation on another layer.
    MoveToLayer(String),
}

/// Board outline configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineConfig {
    layer: String,
    strategy: OutlineStrategy,
    line_width: f64,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            layer: "Edge.Cuts".to_string(),
            strategy: OutlineStrategy::Discard,
            line_width: 0.1,
        }
    }
}

impl OutlineConfig {
    pub fn set_strategy(&mut self, strategy: OutlineStrategy) {
        self.strategy = strategy;
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn strategy(&self) -> &OutlineStrategy {
        &self.strategy
    }

    /// Stroke width of the panel frame and v-score lines.
    pub fn line_width(&self) -> f64 {
        self.line_width
    }
}

/// Advisory thresholds and the generation note.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    min_width: f64,
    min_height: f64,
    /// Note placed below the panel. `{columns}` and `{rows}` are replaced
    /// with the grid size.
    text: Option<String>,
    layer: String,
    text_size: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_width: 70.0,
            min_height: 70.0,
            text: None,
            layer: "User.Comments".to_string(),
            text_size: 1.0,
        }
    }
}

impl ReportConfig {
    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    pub fn min_width(&self) -> f64 {
        self.min_width
    }

    pub fn min_height(&self) -> f64 {
        self.min_height
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn text_size(&self) -> f64 {
        self.text_size
    }
}
