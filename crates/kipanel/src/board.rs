//! Facts read from the source board before assembly.
//!
//! [`BoardInfo`] gathers everything the assembler needs to know about the
//! source: the layer table, the syntax flavour of the file, the title block
//! and the board outline with its bounding box.

use std::collections::HashSet;

use log::debug;

use kipanel_core::{
    document::{Atom, Document, List, Node},
    geometry::{Bounds, Point, Transform, arc_bounds, circle_bounds},
};

use crate::{error::PanelError, identifier::is_footprint};

/// First file version that writes `(stroke (width w) (type solid))`.
const STROKE_VERSION: u64 = 20221018;

/// Endpoints closer than this are considered connected.
const JOIN_TOLERANCE: f64 = 1e-3;

/// Contours closer than this to the bounding box touch it.
const EDGE_TOLERANCE: f64 = 1e-4;

/// Standard user-facing layer names and their canonical counterparts.
const STANDARD_NAMES: &[(&str, &str)] = &[
    ("F.Adhesive", "F.Adhes"),
    ("B.Adhesive", "B.Adhes"),
    ("F.Silkscreen", "F.SilkS"),
    ("B.Silkscreen", "B.SilkS"),
    ("F.Courtyard", "F.CrtYd"),
    ("B.Courtyard", "B.CrtYd"),
    ("F.Fabrication", "F.Fab"),
    ("B.Fabrication", "B.Fab"),
    ("User.Drawings", "Dwgs.User"),
    ("User.Comments", "Cmts.User"),
    ("User.Eco1", "Eco1.User"),
    ("User.Eco2", "Eco2.User"),
];

/// The `(layers ...)` table of a board.
///
/// Entries look like `(44 "Edge.Cuts" user)` or, with a user name,
/// `(49 "F.Fab" user "F.Fabrication")`.
#[derive(Debug, Clone, Default)]
pub(crate) struct LayerTable {
    entries: Vec<LayerEntry>,
}

#[derive(Debug, Clone)]
struct LayerEntry {
    canonical: String,
    user: Option<String>,
}

impl LayerTable {
    /// Read the layer table, or `None` if the document has none.
    pub(crate) fn from_document(document: &Document) -> Option<Self> {
        let layers = document.root().find("layers")?;
        let entries = layers
            .lists()
            .filter_map(|entry| {
                let canonical = entry.text(0)?.to_string();
                let user = entry.text(2).map(str::to_string);
                Some(LayerEntry { canonical, user })
            })
            .collect();
        Some(Self { entries })
    }

    /// Canonical name for a canonical, user or standard layer name.
    pub(crate) fn canonical(&self, name: &str) -> Option<&str> {
        let standard = STANDARD_NAMES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, canonical)| *canonical);

        self.entries
            .iter()
            .find(|entry| entry.canonical == name)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|entry| entry.user.as_deref() == Some(name))
            })
            .or_else(|| {
                let standard = standard?;
                self.entries.iter().find(|entry| entry.canonical == standard)
            })
            .map(|entry| entry.canonical.as_str())
    }
}

/// Syntax details that differ between file versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FileFlavor {
    /// Use `(stroke ...)` instead of a bare `(width ...)`.
    stroke: bool,
    /// Layer names are written as quoted strings.
    quoted_layers: bool,
}

impl FileFlavor {
    pub(crate) fn detect(document: &Document) -> Self {
        let stroke = document
            .version()
            .is_none_or(|version| version >= STROKE_VERSION);

        let mut quoted_layers = None;
        document.root().walk(&mut |list| {
            if quoted_layers.is_none() && list.tag() == "layer" {
                quoted_layers = list.atom(0).map(Atom::is_string);
            }
        });

        Self {
            stroke,
            quoted_layers: quoted_layers.unwrap_or(true),
        }
    }

    pub(crate) fn stroke(self) -> bool {
        self.stroke
    }

    pub(crate) fn quoted_layers(self) -> bool {
        self.quoted_layers
    }
}

/// The outline of the source board.
#[derive(Debug, Clone)]
pub(crate) struct BoardOutline {
    bounds: Bounds,
    /// Root child indices of the top-level items forming the outer contour.
    outer: HashSet<usize>,
}

impl BoardOutline {
    pub(crate) fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns `true` if the root child at `index` is part of the outer contour.
    pub(crate) fn is_outer(&self, index: usize) -> bool {
        self.outer.contains(&index)
    }
}

/// Everything the assembler reads from the source board.
#[derive(Debug, Clone)]
pub(crate) struct BoardInfo {
    layers: Option<LayerTable>,
    flavor: FileFlavor,
    outline_layer: String,
    outline: BoardOutline,
    title: String,
}

impl BoardInfo {
    /// Inspect the source board.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Config`] if `outline_layer` is not in the layer
    /// table and [`PanelError::Geometry`] if the board has no outline.
    pub(crate) fn read(document: &Document, outline_layer: &str) -> Result<Self, PanelError> {
        let layers = LayerTable::from_document(document);
        let outline_layer = resolve_layer(layers.as_ref(), outline_layer)?;
        let outline = analyze_outline(document, &outline_layer)?;
        let flavor = FileFlavor::detect(document);
        let title = title_text(document);

        debug!(
            width = outline.bounds.width(),
            height = outline.bounds.height(),
            contour_items = outline.outer.len(),
            stroke = flavor.stroke;
            "Read source board"
        );

        Ok(Self {
            layers,
            flavor,
            outline_layer,
            outline,
            title,
        })
    }

    pub(crate) fn flavor(&self) -> FileFlavor {
        self.flavor
    }

    /// Canonical name of the outline layer.
    pub(crate) fn outline_layer(&self) -> &str {
        &self.outline_layer
    }

    pub(crate) fn outline(&self) -> &BoardOutline {
        &self.outline
    }

    /// Title block text, empty if the board has none.
    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    /// Resolve a configured layer name against the layer table.
    pub(crate) fn layer(&self, name: &str) -> Result<String, PanelError> {
        resolve_layer(self.layers.as_ref(), name)
    }
}

/// Resolve a layer name to its canonical form.
///
/// Without a layer table every name is accepted verbatim.
pub(crate) fn resolve_layer(table: Option<&LayerTable>, name: &str) -> Result<String, PanelError> {
    match table {
        None => Ok(name.to_string()),
        Some(table) => table
            .canonical(name)
            .map(str::to_string)
            .ok_or_else(|| PanelError::Config(format!("unknown layer `{name}`"))),
    }
}

/// Title block as `title Rev. rev, date (c) company`, skipping empty fields.
pub(crate) fn title_text(document: &Document) -> String {
    let Some(block) = document.root().find("title_block") else {
        return String::new();
    };
    let field = |tag: &str| block.value_text(tag).filter(|text| !text.is_empty());

    let mut parts = Vec::new();
    if let Some(title) = field("title") {
        parts.push(title.to_string());
    }
    if let Some(rev) = field("rev") {
        parts.push(format!("Rev. {rev}"));
    }
    if let Some(date) = field("date") {
        parts.push(date.to_string());
    }
    if let Some(company) = field("company") {
        parts.push(format!("(c) {company}"));
    }

    let mut parts = parts.into_iter();
    let mut text = parts.next().unwrap_or_default();
    for part in parts {
        if part.starts_with("Rev.") || part.starts_with("(c)") {
            text.push(' ');
        } else {
            text.push_str(", ");
        }
        text.push_str(&part);
    }
    text
}

/// Geometry of one outline item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Shape {
    bounds: Bounds,
    /// Start and end of an open segment; `None` for closed shapes.
    ends: Option<(Point, Point)>,
}

/// Geometry of a drawing (`gr_*` or `fp_*`), mapped through `transform`.
///
/// Returns `None` for items that are not outline shapes, such as text.
pub(crate) fn shape_of(item: &List, transform: Transform) -> Option<Shape> {
    let kind = item
        .tag()
        .strip_prefix("gr_")
        .or_else(|| item.tag().strip_prefix("fp_"))?;
    let point = |tag: &str| item.point_of(tag).map(|p| transform.apply(p));

    match kind {
        "line" => {
            let (start, end) = (point("start")?, point("end")?);
            Some(open(Bounds::new(start, end), start, end))
        }
        "arc" => {
            if let Some(mid) = point("mid") {
                let (start, end) = (point("start")?, point("end")?);
                return Some(open(arc_bounds(start, mid, end), start, end));
            }
            // Legacy form: centre in `start`, arc start in `end`, sweep in `angle`.
            let center = item.point_of("start")?;
            let first = item.point_of("end")?;
            let sweep = item.find("angle").and_then(|angle| angle.number(0))?;
            if sweep.abs() >= 360.0 {
                let radius = center.distance(first);
                return Some(closed(circle_bounds(transform.apply(center), radius)));
            }
            let swing = |degrees: f64| first.sub_point(center).rotate(-degrees).add_point(center);
            let (start, mid, end) = (
                transform.apply(first),
                transform.apply(swing(sweep / 2.0)),
                transform.apply(swing(sweep)),
            );
            Some(open(arc_bounds(start, mid, end), start, end))
        }
        "circle" => {
            let center = point("center")?;
            let radius = center.distance(point("end")?);
            Some(closed(circle_bounds(center, radius)))
        }
        "rect" => {
            let (start, end) = (item.point_of("start")?, item.point_of("end")?);
            let corners = [
                start,
                Point::new(end.x(), start.y()),
                end,
                Point::new(start.x(), end.y()),
            ];
            Bounds::from_points(corners.map(|p| transform.apply(p))).map(closed)
        }
        "poly" => polyline_bounds(item.find("pts")?, transform).map(closed),
        "curve" => {
            let pts = item.find("pts")?;
            let controls: Vec<Point> = pts
                .find_all("xy")
                .filter_map(List::point)
                .map(|p| transform.apply(p))
                .collect();
            let (first, last) = (*controls.first()?, *controls.last()?);
            Bounds::from_points(controls).map(|bounds| open(bounds, first, last))
        }
        _ => None,
    }
}

fn open(bounds: Bounds, start: Point, end: Point) -> Shape {
    Shape {
        bounds,
        ends: Some((start, end)),
    }
}

fn closed(bounds: Bounds) -> Shape {
    Shape { bounds, ends: None }
}

/// Bounds of a `(pts (xy ..) (arc (start ..) (mid ..) (end ..)) ...)` list.
fn polyline_bounds(pts: &List, transform: Transform) -> Option<Bounds> {
    pts.lists()
        .filter_map(|vertex| match vertex.tag() {
            "xy" => vertex
                .point()
                .map(|p| Bounds::new(transform.apply(p), transform.apply(p))),
            "arc" => {
                let start = transform.apply(vertex.point_of("start")?);
                let mid = transform.apply(vertex.point_of("mid")?);
                let end = transform.apply(vertex.point_of("end")?);
                Some(arc_bounds(start, mid, end))
            }
            _ => None,
        })
        .reduce(|acc, bounds| acc.merge(&bounds))
}

/// Placement of a footprint's local coordinates on the board.
pub(crate) fn footprint_placement(footprint: &List) -> Transform {
    let at = footprint.find("at");
    let origin = at.and_then(List::point).unwrap_or_default();
    let angle = at.and_then(|at| at.number(2)).unwrap_or(0.0);
    Transform::placement(origin, angle)
}

/// Find the board bounding box and the items of the outer contour.
///
/// Top-level items whose endpoints meet form connected contours; closed
/// shapes are contours of their own. A contour touching the bounding box is
/// part of the outer outline, everything else is an internal cut-out.
/// Outline drawings inside footprints count towards the bounding box only.
pub(crate) fn analyze_outline(
    document: &Document,
    outline_layer: &str,
) -> Result<BoardOutline, PanelError> {
    let mut items: Vec<(usize, Shape)> = Vec::new();
    let mut bounds: Option<Bounds> = None;
    let mut include = |shape: &Shape| {
        bounds = Some(match bounds {
            Some(bounds) => bounds.merge(&shape.bounds),
            None => shape.bounds,
        });
    };

    for (index, node) in document.root().children().iter().enumerate() {
        let Node::List(list) = node else {
            continue;
        };

        if is_footprint(list.tag()) {
            let placement = footprint_placement(list);
            for item in list.lists().filter(|item| item.layer() == Some(outline_layer)) {
                if let Some(shape) = shape_of(item, placement) {
                    include(&shape);
                }
            }
        } else if list.tag().starts_with("gr_") && list.layer() == Some(outline_layer) {
            if let Some(shape) = shape_of(list, Transform::identity()) {
                include(&shape);
                items.push((index, shape));
            }
        }
    }

    let Some(bounds) = bounds else {
        return Err(PanelError::Geometry(format!(
            "no board outline found on layer `{outline_layer}`"
        )));
    };

    let mut contours = Contours::new(items.len());
    for a in 0..items.len() {
        for b in (a + 1)..items.len() {
            if connected(&items[a].1, &items[b].1) {
                contours.join(a, b);
            }
        }
    }

    let mut extents: Vec<Option<Bounds>> = vec![None; items.len()];
    for (position, (_, shape)) in items.iter().enumerate() {
        let root = contours.find(position);
        extents[root] = Some(match extents[root] {
            Some(extent) => extent.merge(&shape.bounds),
            None => shape.bounds,
        });
    }

    let touches = |extent: Bounds| {
        bounds.touches_edge(extent.min_point(), EDGE_TOLERANCE)
            || bounds.touches_edge(extent.max_point(), EDGE_TOLERANCE)
    };
    let outer = items
        .iter()
        .enumerate()
        .filter(|(position, _)| {
            let root = contours.find(*position);
            extents[root].is_some_and(|extent| touches(extent))
        })
        .map(|(_, (index, _))| *index)
        .collect();

    Ok(BoardOutline { bounds, outer })
}

fn connected(a: &Shape, b: &Shape) -> bool {
    let (Some((a_start, a_end)), Some((b_start, b_end))) = (a.ends, b.ends) else {
        return false;
    };
    [a_start, a_end].into_iter().any(|p| {
        p.approx_eq(b_start, JOIN_TOLERANCE) || p.approx_eq(b_end, JOIN_TOLERANCE)
    })
}

/// Union-find over outline items.
struct Contours {
    parent: Vec<usize>,
}

impl Contours {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&self, mut item: usize) -> usize {
        while self.parent[item] != item {
            item = self.parent[item];
        }
        item
    }

    fn join(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b {
            self.parent[b] = a;
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use kipanel_core::document::List;

    use super::*;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> List {
        List::new("gr_line")
            .with_list(List::new("start").with_number(x1).with_number(y1))
            .with_list(List::new("end").with_number(x2).with_number(y2))
            .with_list(List::new("layer").with_string("Edge.Cuts"))
    }

    fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Vec<List> {
        vec![
            line(x, y, x + w, y),
            line(x + w, y, x + w, y + h),
            line(x + w, y + h, x, y + h),
            line(x, y + h, x, y),
        ]
    }

    fn board(items: Vec<List>) -> Document {
        let mut root = List::new("kicad_pcb")
            .with_list(List::new("version").with_number(20221018.0))
            .with_list(
                List::new("layers")
                    .with_list(
                        List::new("0")
                            .with_string("F.Cu")
                            .with_symbol("signal"),
                    )
                    .with_list(
                        List::new("44")
                            .with_string("Edge.Cuts")
                            .with_symbol("user"),
                    )
                    .with_list(
                        List::new("49")
                            .with_string("F.Fab")
                            .with_symbol("user")
                            .with_string("F.Fabrication"),
                    ),
            );
        for item in items {
            root.push(item);
        }
        Document::new(root)
    }

    #[test]
    fn test_layer_resolution() {
        let document = board(Vec::new());
        let table = LayerTable::from_document(&document);
        assert_eq!(resolve_layer(table.as_ref(), "F.Fab").unwrap(), "F.Fab");
        assert_eq!(
            resolve_layer(table.as_ref(), "F.Fabrication").unwrap(),
            "F.Fab"
        );
        assert!(matches!(
            resolve_layer(table.as_ref(), "Nope"),
            Err(PanelError::Config(_))
        ));
        assert_eq!(resolve_layer(None, "Anything").unwrap(), "Anything");
        // no user name in the table, but a standard one
        assert!(matches!(
            resolve_layer(table.as_ref(), "User.Comments"),
            Err(PanelError::Config(_))
        ));
        assert_eq!(resolve_layer(table.as_ref(), "F.Fabrication").unwrap(), "F.Fab");
    }

    #[test]
    fn test_outer_contour_and_cutout() {
        let mut items = rectangle(0.0, 0.0, 40.0, 30.0);
        items.extend(rectangle(10.0, 10.0, 5.0, 5.0));
        let document = board(items);

        let outline = analyze_outline(&document, "Edge.Cuts").unwrap();
        assert_eq!(outline.bounds(), Bounds::new(Point::new(0.0, 0.0), Point::new(40.0, 30.0)));

        // version and layers come first
        assert!((2..6).all(|index| outline.is_outer(index)));
        assert!((6..10).all(|index| !outline.is_outer(index)));
    }

    #[test]
    fn test_missing_outline() {
        let document = board(vec![List::new("gr_text").with_string("hello")]);
        let err = analyze_outline(&document, "Edge.Cuts").unwrap_err();
        assert!(matches!(err, PanelError::Geometry(_)));
    }

    #[test]
    fn test_footprint_outline_counts_towards_bounds() {
        let mut items = rectangle(0.0, 0.0, 40.0, 30.0);
        items.push(
            List::new("footprint")
                .with_string("Tab")
                .with_list(List::new("at").with_number(40.0).with_number(15.0).with_number(90.0))
                .with_list(
                    List::new("fp_line")
                        .with_list(List::new("start").with_number(0.0).with_number(0.0))
                        .with_list(List::new("end").with_number(5.0).with_number(0.0))
                        .with_list(List::new("layer").with_string("Edge.Cuts")),
                ),
        );
        let outline = analyze_outline(&board(items), "Edge.Cuts").unwrap();
        // Rotating (5, 0) by 90 degrees moves it to (0, -5) in board space.
        assert_approx_eq!(f64, outline.bounds().min_y(), 0.0, epsilon = 1e-9);
        assert_approx_eq!(f64, outline.bounds().max_x(), 40.0, epsilon = 1e-9);
        assert_approx_eq!(f64, outline.bounds().height(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arc_shapes() {
        let modern = List::new("gr_arc")
            .with_list(List::new("start").with_number(-10.0).with_number(0.0))
            .with_list(List::new("mid").with_number(0.0).with_number(-10.0))
            .with_list(List::new("end").with_number(10.0).with_number(0.0));
        let shape = shape_of(&modern, Transform::identity()).unwrap();
        assert_approx_eq!(f64, shape.bounds.min_y(), -10.0, epsilon = 1e-9);
        assert_approx_eq!(f64, shape.bounds.max_y(), 0.0, epsilon = 1e-9);

        let full = List::new("gr_arc")
            .with_list(List::new("start").with_number(0.0).with_number(0.0))
            .with_list(List::new("end").with_number(3.0).with_number(0.0))
            .with_list(List::new("angle").with_number(360.0));
        let shape = shape_of(&full, Transform::identity()).unwrap();
        assert_eq!(shape.ends, None);
        assert_approx_eq!(f64, shape.bounds.width(), 6.0);
    }

    #[test]
    fn test_rounded_corner_joins_contour() {
        let items = vec![
            line(0.0, 0.0, 40.0, 0.0),
            line(40.0, 0.0, 40.0, 30.0),
            line(40.0, 30.0, 5.0, 30.0),
            List::new("gr_arc")
                .with_list(List::new("start").with_number(5.0).with_number(30.0))
                .with_list(List::new("mid").with_number(1.464466).with_number(28.535534))
                .with_list(List::new("end").with_number(0.0).with_number(25.0))
                .with_list(List::new("layer").with_string("Edge.Cuts")),
            line(0.0, 25.0, 0.0, 0.0),
        ];
        let outline = analyze_outline(&board(items), "Edge.Cuts").unwrap();
        assert!((2..7).all(|index| outline.is_outer(index)));
    }

    #[test]
    fn test_title_text() {
        let document = Document::new(
            List::new("kicad_pcb").with_list(
                List::new("title_block")
                    .with_list(List::new("title").with_string("Blinky"))
                    .with_list(List::new("date").with_string("2024-03-01"))
                    .with_list(List::new("rev").with_string("B"))
                    .with_list(List::new("company").with_string("ACME")),
            ),
        );
        assert_eq!(title_text(&document), "Blinky Rev. B, 2024-03-01 (c) ACME");

        let partial = Document::new(
            List::new("kicad_pcb").with_list(
                List::new("title_block")
                    .with_list(List::new("date").with_string("2024-03-01"))
                    .with_list(List::new("company").with_string("ACME")),
            ),
        );
        assert_eq!(title_text(&partial), "2024-03-01 (c) ACME");
        assert_eq!(title_text(&board(Vec::new())), "");
    }

    #[test]
    fn test_flavor() {
        let modern = FileFlavor::detect(&board(rectangle(0.0, 0.0, 1.0, 1.0)));
        assert!(modern.stroke());
        assert!(modern.quoted_layers());

        let legacy = Document::new(
            List::new("kicad_pcb")
                .with_list(List::new("version").with_number(20171130.0))
                .with_list(
                    List::new("gr_line").with_list(List::new("layer").with_symbol("Edge.Cuts")),
                ),
        );
        let legacy = FileFlavor::detect(&legacy);
        assert!(!legacy.stroke());
        assert!(!legacy.quoted_layers());
    }
}
