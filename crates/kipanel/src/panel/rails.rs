//! Text on the edge rails and the generation note below the panel.

use log::warn;

use kipanel_core::{document::List, geometry::Point};

use super::draw::{Draw, Justify, TextStyle};
use crate::{
    config::{RailsConfig, ReportConfig},
    layout::LayoutPlan,
};

/// Distance of rail text from the panel edge it starts at.
const EDGE_INSET: f64 = 1.0;

/// Distance between the lowest v-score extent and the report note.
const REPORT_OFFSET: f64 = 10.0;

/// Stroke of rail and report text.
const TEXT_THICKNESS: f64 = 0.15;

/// Rail text and title text.
///
/// Horizontal-rail text runs up the left rail from its bottom end, the
/// title up the right rail. Vertical-rail text runs along the top rail, the
/// title along the bottom rail.
pub(crate) fn rail_texts(
    draw: &Draw,
    plan: &LayoutPlan,
    config: &RailsConfig,
    layer: &str,
    title: &str,
) -> Vec<List> {
    let panel = plan.panel();
    let rails = plan.rails();
    let style = |angle: f64| TextStyle {
        size: config.text_size(),
        thickness: TEXT_THICKNESS,
        angle,
        justify: Justify::Left,
    };

    let mut texts = Vec::new();
    if let Some(text) = config.horizontal_text() {
        let at = Point::new(
            panel.min_x() + rails.horizontal() / 2.0,
            panel.max_y() - EDGE_INSET,
        );
        texts.push(draw.text(text, at, layer, style(90.0)));
    }
    if let Some(text) = config.vertical_text() {
        let at = Point::new(
            panel.min_x() + EDGE_INSET,
            panel.min_y() + rails.vertical() / 2.0,
        );
        texts.push(draw.text(text, at, layer, style(0.0)));
    }

    let wants_title = config.horizontal_title() || config.vertical_title();
    if wants_title && title.is_empty() {
        warn!("The board has no title block; skipping title text");
        return texts;
    }
    if config.horizontal_title() {
        let at = Point::new(
            panel.max_x() - rails.horizontal() / 2.0,
            panel.max_y() - EDGE_INSET,
        );
        texts.push(draw.text(title, at, layer, style(90.0)));
    }
    if config.vertical_title() {
        let at = Point::new(
            panel.min_x() + EDGE_INSET,
            panel.max_y() - rails.vertical() / 2.0,
        );
        texts.push(draw.text(title, at, layer, style(0.0)));
    }
    texts
}

/// The generation note, if one is configured.
///
/// `{columns}` and `{rows}` in the configured text are replaced with the
/// grid size.
pub(crate) fn report_text(
    draw: &Draw,
    plan: &LayoutPlan,
    config: &ReportConfig,
    layer: &str,
    lower_extent: f64,
) -> Option<List> {
    let text = config
        .text()?
        .replace("{columns}", &plan.columns().to_string())
        .replace("{rows}", &plan.rows().to_string());
    let at = Point::new(plan.panel().center().x(), lower_extent + REPORT_OFFSET);
    let style = TextStyle {
        size: config.text_size(),
        thickness: TEXT_THICKNESS,
        angle: 0.0,
        justify: Justify::Center,
    };
    Some(draw.text(&text, at, layer, style))
}
