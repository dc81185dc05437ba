//! Advisories about a finished panel.
//!
//! [`review`] reads the final panel design and reports conditions worth a
//! warning. It never changes the design and never fails: advisories do not
//! affect whether the panel is written.

use std::fmt;

use log::debug;

use kipanel_core::{
    document::Document,
    geometry::{Bounds, Size},
};

use crate::config::AppConfig;

/// A non-fatal finding.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// The panel outline is smaller than the fabrication minimum.
    PanelTooSmall { size: Size, minimum: Size },
    /// Rails are used on all four sides.
    BothRails,
    /// A configured shared net does not exist on the board.
    MissingSharedNet { name: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::PanelTooSmall { size, minimum } => write!(
                f,
                "panel is {}x{}mm, under the {}x{}mm minimum",
                size.width(),
                size.height(),
                minimum.width(),
                minimum.height()
            ),
            Advisory::BothRails => write!(
                f,
                "using both horizontal and vertical rails; most fabricators only need one pair"
            ),
            Advisory::MissingSharedNet { name } => {
                write!(f, "shared net `{name}` does not exist on the board")
            }
        }
    }
}

/// Review a finished panel.
///
/// `frame` is the panel outline drawn by the assembler. V-score lines on the
/// outline layer are not part of it.
pub fn review(document: &Document, frame: Bounds, config: &AppConfig) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    let size = frame.size();
    let minimum = Size::new(config.report().min_width(), config.report().min_height());
    debug!(width = size.width(), height = size.height(); "Checking panel size");
    if size.is_smaller_than(minimum) {
        advisories.push(Advisory::PanelTooSmall { size, minimum });
    }

    if config.rails().widths().both() {
        advisories.push(Advisory::BothRails);
    }

    let root = document.root();
    for name in config.identifiers().shared_nets() {
        let exists = root
            .find_all("net")
            .any(|net| net.text(1) == Some(name.as_str()));
        if !exists {
            advisories.push(Advisory::MissingSharedNet { name: name.clone() });
        }
    }

    advisories
}

#[cfg(test)]
mod tests {
    use kipanel_core::{document::List, geometry::Point};

    use super::*;

    fn panel() -> Document {
        Document::new(
            List::new("kicad_pcb")
                .with_list(List::new("net").with_number(0.0).with_string(""))
                .with_list(List::new("net").with_number(1.0).with_string("GND")),
        )
    }

    fn frame(width: f64, height: f64) -> Bounds {
        Bounds::new(Point::new(100.0, 50.0), Point::new(100.0 + width, 50.0 + height))
    }

    #[test]
    fn test_small_panel() {
        let advisories = review(&panel(), frame(60.0, 60.0), &AppConfig::default());
        assert_eq!(
            advisories,
            vec![Advisory::PanelTooSmall {
                size: Size::new(60.0, 60.0),
                minimum: Size::new(70.0, 70.0),
            }]
        );
        assert_eq!(
            advisories[0].to_string(),
            "panel is 60x60mm, under the 70x70mm minimum"
        );
    }

    #[test]
    fn test_large_panel() {
        assert!(review(&panel(), frame(80.0, 80.0), &AppConfig::default()).is_empty());
    }

    #[test]
    fn test_one_short_side_is_too_small() {
        let advisories = review(&panel(), frame(100.0, 50.0), &AppConfig::default());
        assert_eq!(advisories.len(), 1);
    }

    #[test]
    fn test_both_rails_and_missing_net() {
        let mut config = AppConfig::default();
        config.rails_mut().set_widths(5.0, 5.0);
        config
            .identifiers_mut()
            .add_shared_nets(["GND".to_string(), "VBUS".to_string()]);

        let advisories = review(&panel(), frame(80.0, 80.0), &config);
        assert_eq!(
            advisories,
            vec![
                Advisory::BothRails,
                Advisory::MissingSharedNet {
                    name: "VBUS".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_review_does_not_modify() {
        let document = panel();
        let before = document.clone();
        let _ = review(&document, frame(10.0, 10.0), &AppConfig::default());
        assert_eq!(document, before);
    }
}
