//! V-score cut lines and their labels.

use kipanel_core::{document::List, geometry::Point};

use super::draw::{Draw, Justify, TextStyle};
use crate::{config::VScoreConfig, layout::LayoutPlan};

/// Gap between the end of a v-score line and its label, in millimetres.
const LABEL_GAP: f64 = 2.0;

/// Where the cut lines go.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CutPositions {
    /// X coordinates of the vertical lines, left to right.
    pub(crate) columns: Vec<f64>,
    /// Y coordinates of the horizontal lines, top to bottom.
    pub(crate) rows: Vec<f64>,
}

/// Cut positions: the centre of every gap between boards, plus the
/// rail/board boundaries on sides that carry a rail.
pub(crate) fn positions(plan: &LayoutPlan) -> CutPositions {
    let board = plan.board();
    let rails = plan.rails();
    let half_gap = plan.padding() / 2.0;

    let axis = |start: f64, pitch: f64, count: u32, rail: bool, end: f64| {
        let mut cuts = Vec::new();
        if rail {
            cuts.push(start);
        }
        cuts.extend((1..count).map(|k| start + f64::from(k) * pitch - half_gap));
        if rail {
            cuts.push(end);
        }
        cuts
    };

    let panel = plan.panel();
    CutPositions {
        columns: axis(
            board.min_x(),
            plan.column_pitch(),
            plan.columns(),
            rails.horizontal() > 0.0,
            panel.max_x() - rails.horizontal(),
        ),
        rows: axis(
            board.min_y(),
            plan.row_pitch(),
            plan.rows(),
            rails.vertical() > 0.0,
            panel.max_y() - rails.vertical(),
        ),
    }
}

/// Lowest y reached by the vertical lines.
pub(crate) fn lower_extent(plan: &LayoutPlan, config: &VScoreConfig) -> f64 {
    plan.panel().max_y() + config.extension()
}

/// V-score lines with their labels.
///
/// Lines span the panel plus `extension` at both ends. Labels sit beyond
/// the start of each line: above vertical lines, rotated and left
/// justified, and left of horizontal lines, right justified.
pub(crate) fn vscores(
    draw: &Draw,
    plan: &LayoutPlan,
    config: &VScoreConfig,
    line_layer: &str,
    text_layer: &str,
    width: f64,
) -> Vec<List> {
    let panel = plan.panel();
    let extension = config.extension();
    let top = panel.min_y() - extension;
    let bottom = panel.max_y() + extension;
    let left = panel.min_x() - extension;
    let right = panel.max_x() + extension;

    let style = TextStyle {
        size: config.text_size(),
        thickness: config.text_thickness(),
        angle: 90.0,
        justify: Justify::Left,
    };

    let cuts = positions(plan);
    let mut items = Vec::new();
    for x in cuts.columns {
        items.push(draw.line(Point::new(x, top), Point::new(x, bottom), line_layer, width));
        items.push(draw.text(
            config.text(),
            Point::new(x, top - LABEL_GAP),
            text_layer,
            style,
        ));
    }

    let style = TextStyle {
        angle: 0.0,
        justify: Justify::Right,
        ..style
    };
    for y in cuts.rows {
        items.push(draw.line(Point::new(left, y), Point::new(right, y), line_layer, width));
        items.push(draw.text(
            config.text(),
            Point::new(left - LABEL_GAP, y),
            text_layer,
            style,
        ));
    }
    items
}
