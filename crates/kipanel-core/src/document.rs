//! In-memory model of a nested-list board document.
//!
//! A board file is a single tagged list (the root) whose children are atoms
//! and further tagged lists:
//!
//! ```text
//! (kicad_pcb (version 20221018) (generator pcbnew)
//!   (net 0 "")
//!   (gr_line (start 0 0) (end 40 0) (layer "Edge.Cuts"))
//! )
//! ```
//!
//! # Overview
//!
//! - [`Document`] - Owns the root [`List`]
//! - [`Node`] - Either an [`Atom`] or a [`List`]
//! - [`List`] - A tag followed by ordered children
//! - [`Atom`] - A number, a quoted string, or a bare symbol
//!
//! The model keeps every node it does not understand so that untouched
//! parts of a board survive a parse/write cycle unchanged. Cloning a
//! [`List`] clones its whole subtree; no children are shared between
//! clones.

use crate::geometry::Point;

/// A leaf value in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// A bare token that is not a number, e.g. `smd`, `Edge.Cuts` or a hex mask.
    Symbol(String),
    /// A decimal number in board units.
    Number(f64),
    /// A double-quoted string with escapes already decoded.
    String(String),
}

impl Atom {
    /// Classifies a bare (unquoted) token as a number or a symbol.
    ///
    /// Only plain decimal literals become numbers. Anything else, including
    /// tokens with leading zeros such as `0001`, stays a symbol so it is
    /// written back exactly as read.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kipanel_core::document::Atom;
    /// assert_eq!(Atom::from_bare("-1.25"), Atom::Number(-1.25));
    /// assert_eq!(Atom::from_bare("smd"), Atom::Symbol("smd".to_string()));
    /// assert_eq!(Atom::from_bare("0001"), Atom::Symbol("0001".to_string()));
    /// ```
    pub fn from_bare(raw: &str) -> Self {
        if is_number_literal(raw) {
            if let Ok(value) = raw.parse::<f64>() {
                return Atom::Number(value);
            }
        }
        Atom::Symbol(raw.to_string())
    }

    /// Returns the numeric value if this atom is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Atom::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text of a symbol or string atom.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Atom::Symbol(text) | Atom::String(text) => Some(text),
            Atom::Number(_) => None,
        }
    }

    /// Returns `true` if this atom was written as a quoted string.
    pub fn is_string(&self) -> bool {
        matches!(self, Atom::String(_))
    }
}

/// Strict decimal grammar: `-?(0|[1-9][0-9]*)(\.[0-9]*)?` or `-?\.[0-9]+`.
fn is_number_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let integer_ok = match integer {
        "" => fraction.is_some_and(|f| !f.is_empty()),
        "0" => true,
        digits => !digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit()),
    };
    let fraction_ok = fraction.is_none_or(|f| f.bytes().all(|b| b.is_ascii_digit()));

    integer_ok && fraction_ok
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Atom(Atom),
    List(List),
}

impl Node {
    /// Returns the list if this node is a list.
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Node::List(list) => Some(list),
            Node::Atom(_) => None,
        }
    }

    /// Returns the list mutably if this node is a list.
    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match self {
            Node::List(list) => Some(list),
            Node::Atom(_) => None,
        }
    }

    /// Returns the atom if this node is an atom.
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Node::Atom(atom) => Some(atom),
            Node::List(_) => None,
        }
    }

    /// Returns `true` if this node is a list with the given tag.
    pub fn is_tagged(&self, tag: &str) -> bool {
        self.as_list().is_some_and(|list| list.tag() == tag)
    }
}

impl From<Atom> for Node {
    fn from(atom: Atom) -> Self {
        Node::Atom(atom)
    }
}

impl From<List> for Node {
    fn from(list: List) -> Self {
        Node::List(list)
    }
}

/// A tagged list: `(tag child child ...)`.
///
/// # Examples
///
/// ```
/// # use kipanel_core::document::List;
/// let line = List::new("gr_line")
///     .with_list(List::new("start").with_number(0.0).with_number(0.0))
///     .with_list(List::new("end").with_number(40.0).with_number(0.0))
///     .with_list(List::new("layer").with_string("Edge.Cuts"));
///
/// assert_eq!(line.tag(), "gr_line");
/// assert_eq!(line.layer(), Some("Edge.Cuts"));
/// assert_eq!(line.find("end").and_then(|end| end.number(0)), Some(40.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    tag: String,
    children: Vec<Node>,
}

impl List {
    /// Creates an empty list with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            children: Vec::new(),
        }
    }

    /// Creates a list from a tag and existing children.
    pub fn with_children(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            tag: tag.into(),
            children,
        }
    }

    /// Returns the tag of this list.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the children of this list.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the children of this list mutably.
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Consumes the list and returns its children.
    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Appends a child node.
    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    /// Appends a bare symbol and returns the list.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.push(Atom::Symbol(symbol.into()));
        self
    }

    /// Appends a number and returns the list.
    pub fn with_number(mut self, value: f64) -> Self {
        self.push(Atom::Number(value));
        self
    }

    /// Appends a quoted string and returns the list.
    pub fn with_string(mut self, text: impl Into<String>) -> Self {
        self.push(Atom::String(text.into()));
        self
    }

    /// Appends a child list and returns the list.
    pub fn with_list(mut self, list: List) -> Self {
        self.push(list);
        self
    }

    /// Returns the child atom at `index` (counting all children).
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.children.get(index).and_then(Node::as_atom)
    }

    /// Returns the child number at `index`.
    pub fn number(&self, index: usize) -> Option<f64> {
        self.atom(index).and_then(Atom::as_number)
    }

    /// Returns the child text (symbol or string) at `index`.
    pub fn text(&self, index: usize) -> Option<&str> {
        self.atom(index).and_then(Atom::as_text)
    }

    /// Replaces the child at `index` with a number.
    ///
    /// Returns `false` if there is no child at `index`.
    pub fn set_number(&mut self, index: usize, value: f64) -> bool {
        match self.children.get_mut(index) {
            Some(child) => {
                *child = Node::Atom(Atom::Number(value));
                true
            }
            None => false,
        }
    }

    /// Replaces the text of the atom at `index`, keeping its quoting.
    ///
    /// Returns `false` if the child at `index` is not a symbol or string.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.children.get_mut(index) {
            Some(Node::Atom(Atom::String(current))) | Some(Node::Atom(Atom::Symbol(current))) => {
                *current = text.into();
                true
            }
            _ => false,
        }
    }

    /// Iterates over the child lists.
    pub fn lists(&self) -> impl Iterator<Item = &List> {
        self.children.iter().filter_map(Node::as_list)
    }

    /// Iterates mutably over the child lists.
    pub fn lists_mut(&mut self) -> impl Iterator<Item = &mut List> {
        self.children.iter_mut().filter_map(Node::as_list_mut)
    }

    /// Returns the first child list with the given tag.
    pub fn find(&self, tag: &str) -> Option<&List> {
        self.lists().find(|list| list.tag == tag)
    }

    /// Returns the first child list with the given tag mutably.
    pub fn find_mut(&mut self, tag: &str) -> Option<&mut List> {
        self.lists_mut().find(|list| list.tag == tag)
    }

    /// Iterates over every child list with the given tag.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a List> + 'a {
        self.lists().filter(move |list| list.tag == tag)
    }

    /// Returns the text value of a `(tag value)` child, e.g. `(layer "F.Cu")`.
    pub fn value_text(&self, tag: &str) -> Option<&str> {
        self.find(tag).and_then(|list| list.text(0))
    }

    /// Returns the layer named by a `(layer ...)` child.
    pub fn layer(&self) -> Option<&str> {
        self.value_text("layer")
    }

    /// Interprets the first two children as a point.
    pub fn point(&self) -> Option<Point> {
        Some(Point::new(self.number(0)?, self.number(1)?))
    }

    /// Returns the point stored in a `(tag x y)` child.
    pub fn point_of(&self, tag: &str) -> Option<Point> {
        self.find(tag).and_then(List::point)
    }

    /// Keeps only the children for which `keep` returns `true`.
    pub fn retain(&mut self, keep: impl FnMut(&Node) -> bool) {
        self.children.retain(keep);
    }

    /// Visits this list and every descendant list, parents first.
    pub fn walk(&self, visit: &mut impl FnMut(&List)) {
        visit(self);
        for child in self.lists() {
            child.walk(visit);
        }
    }

    /// Visits this list and every descendant list mutably, parents first.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut List)) {
        visit(self);
        for child in self.lists_mut() {
            child.walk_mut(visit);
        }
    }
}

/// A parsed board document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: List,
}

impl Document {
    /// Creates a document from its root list.
    pub fn new(root: List) -> Self {
        Self { root }
    }

    /// Returns the root list.
    pub fn root(&self) -> &List {
        &self.root
    }

    /// Returns the root list mutably.
    pub fn root_mut(&mut self) -> &mut List {
        &mut self.root
    }

    /// Consumes the document and returns the root list.
    pub fn into_root(self) -> List {
        self.root
    }

    /// Returns the file format version from `(version N)`, if present.
    pub fn version(&self) -> Option<u64> {
        self.root
            .find("version")
            .and_then(|version| version.number(0))
            .filter(|value| *value >= 0.0)
            .map(|value| value as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bare_numbers() {
        assert_eq!(Atom::from_bare("0"), Atom::Number(0.0));
        assert_eq!(Atom::from_bare("42"), Atom::Number(42.0));
        assert_eq!(Atom::from_bare("-3.5"), Atom::Number(-3.5));
        assert_eq!(Atom::from_bare(".25"), Atom::Number(0.25));
        assert_eq!(Atom::from_bare("-.5"), Atom::Number(-0.5));
        assert_eq!(Atom::from_bare("5."), Atom::Number(5.0));
        assert_eq!(Atom::from_bare("20221018"), Atom::Number(20221018.0));
    }

    #[test]
    fn test_from_bare_symbols() {
        for raw in [
            "smd",
            "Edge.Cuts",
            "0x00010fc_ffffffff",
            "0001",
            "1.2.3",
            "-",
            ".",
            "inf",
            "NaN",
            "1e5",
            "5e3a0c1d-0000-4000-8000-000000000001",
        ] {
            assert_eq!(
                Atom::from_bare(raw),
                Atom::Symbol(raw.to_string()),
                "`{raw}` should stay a symbol"
            );
        }
    }

    #[test]
    fn test_atom_accessors() {
        assert_eq!(Atom::Number(1.5).as_number(), Some(1.5));
        assert_eq!(Atom::Symbol("x".into()).as_number(), None);
        assert_eq!(Atom::String("GND".into()).as_text(), Some("GND"));
        assert_eq!(Atom::Symbol("smd".into()).as_text(), Some("smd"));
        assert_eq!(Atom::Number(1.0).as_text(), None);
        assert!(Atom::String(String::new()).is_string());
        assert!(!Atom::Symbol("a".into()).is_string());
    }

    #[test]
    fn test_list_queries() {
        let segment = List::new("segment")
            .with_list(List::new("start").with_number(1.0).with_number(2.0))
            .with_list(List::new("end").with_number(3.0).with_number(4.0))
            .with_list(List::new("width").with_number(0.25))
            .with_list(List::new("layer").with_string("F.Cu"))
            .with_list(List::new("net").with_number(2.0));

        assert_eq!(segment.point_of("start"), Some(Point::new(1.0, 2.0)));
        assert_eq!(segment.point_of("end"), Some(Point::new(3.0, 4.0)));
        assert_eq!(segment.point_of("width"), None);
        assert_eq!(segment.layer(), Some("F.Cu"));
        assert_eq!(segment.find("net").and_then(|net| net.number(0)), Some(2.0));
        assert!(segment.find("missing").is_none());
    }

    #[test]
    fn test_set_text_keeps_quoting() {
        let mut reference = List::new("fp_text")
            .with_symbol("reference")
            .with_string("R1");

        assert!(reference.set_text(1, "R1_2"));
        assert_eq!(reference.atom(1), Some(&Atom::String("R1_2".into())));

        assert!(reference.set_text(0, "value"));
        assert_eq!(reference.atom(0), Some(&Atom::Symbol("value".into())));

        let mut at = List::new("at").with_number(1.0);
        assert!(!at.set_text(0, "x"));
        assert!(!at.set_text(5, "x"));
    }

    #[test]
    fn test_clone_is_deep() {
        let original = List::new("gr_poly").with_list(
            List::new("pts").with_list(List::new("xy").with_number(0.0).with_number(0.0)),
        );
        let mut copy = original.clone();

        copy.walk_mut(&mut |list| {
            if list.tag() == "xy" {
                list.set_number(0, 10.0);
            }
        });

        let original_x = original
            .find("pts")
            .and_then(|pts| pts.find("xy"))
            .and_then(|xy| xy.number(0));
        let copy_x = copy
            .find("pts")
            .and_then(|pts| pts.find("xy"))
            .and_then(|xy| xy.number(0));
        assert_eq!(original_x, Some(0.0));
        assert_eq!(copy_x, Some(10.0));
    }

    #[test]
    fn test_walk_visits_parents_first() {
        let tree = List::new("a").with_list(List::new("b").with_list(List::new("c")));
        let mut tags = Vec::new();
        tree.walk(&mut |list| tags.push(list.tag().to_string()));
        assert_eq!(tags, ["a", "b", "c"]);
    }

    #[test]
    fn test_document_version() {
        let document = Document::new(
            List::new("kicad_pcb").with_list(List::new("version").with_number(20221018.0)),
        );
        assert_eq!(document.version(), Some(20221018));

        let unversioned = Document::new(List::new("kicad_pcb"));
        assert_eq!(unversioned.version(), None);
    }
}
