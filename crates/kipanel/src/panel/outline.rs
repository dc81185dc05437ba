//! The panel frame on the outline layer.

use kipanel_core::{
    document::List,
    geometry::{Bounds, Point},
};

use super::draw::Draw;

/// Four outline segments around `panel`, clockwise from the top-left corner.
pub(crate) fn frame(draw: &Draw, panel: Bounds, layer: &str, width: f64) -> Vec<List> {
    let corners = [
        panel.min_point(),
        Point::new(panel.max_x(), panel.min_y()),
        panel.max_point(),
        Point::new(panel.min_x(), panel.max_y()),
    ];

    (0..corners.len())
        .map(|i| draw.line(corners[i], corners[(i + 1) % corners.len()], layer, width))
        .collect()
}
