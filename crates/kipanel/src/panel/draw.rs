//! Builders for synthesized board graphics.

use kipanel_core::{document::List, geometry::Point};

use crate::board::FileFlavor;

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Justify {
    Left,
    Center,
    Right,
}

/// Font and placement of a text item.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextStyle {
    pub(crate) size: f64,
    pub(crate) thickness: f64,
    pub(crate) angle: f64,
    pub(crate) justify: Justify,
}

/// Writes graphics in the syntax of the source file.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Draw {
    flavor: FileFlavor,
}

impl Draw {
    pub(crate) fn new(flavor: FileFlavor) -> Self {
        Self { flavor }
    }

    /// `(gr_line (start ..) (end ..) (stroke ..) (layer ..))`
    pub(crate) fn line(&self, start: Point, end: Point, layer: &str, width: f64) -> List {
        let line = List::new("gr_line")
            .with_list(point("start", start))
            .with_list(point("end", end));

        if self.flavor.stroke() {
            line.with_list(
                List::new("stroke")
                    .with_list(List::new("width").with_number(width))
                    .with_list(List::new("type").with_symbol("solid")),
            )
            .with_list(self.layer(layer))
        } else {
            line.with_list(self.layer(layer))
                .with_list(List::new("width").with_number(width))
        }
    }

    /// `(gr_text "text" (at ..) (layer ..) (effects ..))`
    pub(crate) fn text(&self, text: &str, at: Point, layer: &str, style: TextStyle) -> List {
        let mut position = point("at", at);
        if style.angle != 0.0 {
            position = position.with_number(style.angle);
        }

        let mut effects = List::new("effects").with_list(
            List::new("font")
                .with_list(
                    List::new("size")
                        .with_number(style.size)
                        .with_number(style.size),
                )
                .with_list(List::new("thickness").with_number(style.thickness)),
        );
        match style.justify {
            Justify::Left => effects = effects.with_list(List::new("justify").with_symbol("left")),
            Justify::Right => {
                effects = effects.with_list(List::new("justify").with_symbol("right"))
            }
            Justify::Center => {}
        }

        List::new("gr_text")
            .with_string(text)
            .with_list(position)
            .with_list(self.layer(layer))
            .with_list(effects)
    }

    /// Replace the layer of an existing item.
    pub(crate) fn set_layer(&self, item: &mut List, layer: &str) {
        match item.find_mut("layer") {
            Some(current) => {
                current.set_text(0, layer);
            }
            None => item.push(self.layer(layer)),
        }
    }

    fn layer(&self, layer: &str) -> List {
        if self.flavor.quoted_layers() {
            List::new("layer").with_string(layer)
        } else {
            List::new("layer").with_symbol(layer)
        }
    }
}

fn point(tag: &str, at: Point) -> List {
    let at = at.snapped();
    List::new(tag).with_number(at.x()).with_number(at.y())
}

#[cfg(test)]
mod tests {
    use kipanel_core::document::{Atom, Document};

    use super::*;
    use crate::export;

    fn flavor(version: f64, quoted: bool) -> FileFlavor {
        let layer = if quoted {
            List::new("layer").with_string("F.Cu")
        } else {
            List::new("layer").with_symbol("F.Cu")
        };
        let document = Document::new(
            List::new("kicad_pcb")
                .with_list(List::new("version").with_number(version))
                .with_list(List::new("segment").with_list(layer)),
        );
        FileFlavor::detect(&document)
    }

    fn render(list: List) -> String {
        export::to_string(&Document::new(list))
    }

    #[test]
    fn test_modern_line() {
        let draw = Draw::new(flavor(20240108.0, true));
        let line = draw.line(Point::new(0.0, 0.0), Point::new(10.0, 0.0), "Edge.Cuts", 0.1);
        assert_eq!(
            render(line),
            "(gr_line\n  (start 0 0)\n  (end 10 0)\n  (stroke\n    (width 0.1)\n    (type solid)\n  )\n  (layer \"Edge.Cuts\")\n)\n"
        );
    }

    #[test]
    fn test_legacy_line() {
        let draw = Draw::new(flavor(20171130.0, false));
        let line = draw.line(Point::new(0.0, 0.0), Point::new(10.0, 0.0), "Edge.Cuts", 0.1);
        assert_eq!(line.find("layer").and_then(|layer| layer.atom(0)), Some(&Atom::Symbol("Edge.Cuts".into())));
        assert_eq!(line.find("width").and_then(|width| width.number(0)), Some(0.1));
        assert!(line.find("stroke").is_none());
    }

    #[test]
    fn test_text() {
        let draw = Draw::new(flavor(20240108.0, true));
        let style = TextStyle {
            size: 2.0,
            thickness: 0.1,
            angle: 90.0,
            justify: Justify::Left,
        };
        let text = draw.text("V-SCORE", Point::new(5.0, -2.05), "User.Comments", style);
        assert_eq!(
            render(text),
            "(gr_text \"V-SCORE\"\n  (at 5 -2.05 90)\n  (layer \"User.Comments\")\n  (effects\n    (font\n      (size 2 2)\n      (thickness 0.1)\n    )\n    (justify left)\n  )\n)\n"
        );

        let centered = draw.text(
            "note",
            Point::new(0.0, 0.0),
            "User.Comments",
            TextStyle {
                justify: Justify::Center,
                angle: 0.0,
                ..style
            },
        );
        let effects = centered.find("effects").unwrap();
        assert!(effects.find("justify").is_none());
        assert_eq!(centered.find("at").unwrap().children().len(), 2);
    }

    #[test]
    fn test_set_layer() {
        let draw = Draw::new(flavor(20240108.0, true));
        let mut line = draw.line(Point::new(0.0, 0.0), Point::new(1.0, 0.0), "Edge.Cuts", 0.1);
        draw.set_layer(&mut line, "Dwgs.User");
        assert_eq!(line.layer(), Some("Dwgs.User"));
    }
}
