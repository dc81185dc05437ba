//! Moving replicated items into their grid cell.

use kipanel_core::{
    document::{Atom, List},
    geometry::Transform,
};

use super::element::ItemKind;
use crate::error::PanelError;

/// Tags whose first two atoms are board coordinates.
const COORDINATE_TAGS: &[&str] = &["at", "start", "mid", "end", "center", "xy"];

/// Move a copied item with `transform`.
///
/// Footprint contents are stored relative to the footprint, so only its own
/// `(at ...)` moves, together with zones embedded in it which use board
/// coordinates. Every other item moves all of its coordinates.
///
/// # Errors
///
/// Returns [`PanelError::Geometry`] if a coordinate tag holds neither a
/// coordinate pair nor nested lists.
pub(crate) fn translate(
    item: &mut List,
    kind: ItemKind,
    transform: Transform,
) -> Result<(), PanelError> {
    if transform.is_identity() {
        return Ok(());
    }

    match kind {
        ItemKind::Footprint => {
            if let Some(at) = item.find_mut("at") {
                move_coordinate(at, transform)?;
            }
            for zone in item.lists_mut().filter(|list| list.tag() == "zone") {
                move_descendants(zone, transform)?;
            }
            Ok(())
        }
        ItemKind::Drawing | ItemKind::Track | ItemKind::Zone | ItemKind::Generated => {
            move_descendants(item, transform)
        }
        ItemKind::Group => Ok(()),
    }
}

fn move_descendants(list: &mut List, transform: Transform) -> Result<(), PanelError> {
    for child in list.lists_mut() {
        if COORDINATE_TAGS.contains(&child.tag()) {
            move_coordinate(child, transform)?;
        } else {
            move_descendants(child, transform)?;
        }
    }
    Ok(())
}

fn move_coordinate(list: &mut List, transform: Transform) -> Result<(), PanelError> {
    if let Some(point) = list.point() {
        let moved = transform.apply(point).snapped();
        list.set_number(0, moved.x());
        list.set_number(1, moved.y());

        if list.tag() == "at" && transform.rotation() != 0.0 {
            let angle = transform.apply_angle(list.number(2).unwrap_or(0.0));
            if !list.set_number(2, angle) {
                list.push(Atom::Number(angle));
            }
        }
        return Ok(());
    }

    if list.lists().next().is_some() {
        return move_descendants(list, transform);
    }

    Err(PanelError::Geometry(format!(
        "`({} ...)` does not hold a coordinate pair",
        list.tag()
    )))
}
