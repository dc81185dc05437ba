//! Panel assembly.
//!
//! The assembler walks the top-level sections of the source board once.
//! Sections that describe the whole design are copied once, the net table
//! is replaced by the panel net table, and every board item is copied into
//! each grid cell, moved and relabelled. The panel frame, v-scores, rail
//! text and the generation note are appended at the end.

mod draw;
mod element;
mod outline;
mod rails;
mod relabel;
mod transform;
mod vscore;

use log::{debug, info};

use kipanel_core::document::{Document, List, Node};

use crate::{
    board::BoardInfo,
    config::{AppConfig, OutlineStrategy},
    error::PanelError,
    identifier::{IdentifierTable, NamingScheme, SourceIdentifiers},
    layout::{self, LayoutPlan},
    report::{self, Advisory},
};

use draw::Draw;
use element::Placement;

/// A panelized board.
#[derive(Debug, Clone)]
pub struct Panel {
    document: Document,
    plan: LayoutPlan,
    advisories: Vec<Advisory>,
}

impl Panel {
    /// The panel design.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consumes the panel and returns the design.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// The layout the panel was built from.
    pub fn plan(&self) -> &LayoutPlan {
        &self.plan
    }

    /// Non-fatal findings about the finished panel.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }
}

/// Build a panel from a source board.
pub(crate) fn assemble(
    source: &Document,
    config: &AppConfig,
    scheme: &dyn NamingScheme,
) -> Result<Panel, PanelError> {
    let board = BoardInfo::read(source, config.outline().layer())?;
    let plan = layout::plan(
        config.panel().grid()?,
        board.outline().bounds(),
        config.panel().padding(),
        config.rails().widths(),
    )?;

    let identifiers = SourceIdentifiers::collect(source);
    let table = IdentifierTable::build(
        &identifiers,
        config.identifiers().shared_nets(),
        scheme,
        plan.cells().len(),
    )?;

    let contour_layer = match config.outline().strategy() {
        OutlineStrategy::Discard => None,
        OutlineStrategy::MoveToLayer(layer) => Some(board.layer(layer)?),
    };

    let assembler = Assembler {
        config,
        board: &board,
        plan: &plan,
        table: &table,
        draw: Draw::new(board.flavor()),
        contour_layer,
    };
    let document = assembler.run(source)?;
    let advisories = report::review(&document, plan.panel(), config);

    Ok(Panel {
        document,
        plan,
        advisories,
    })
}

struct Assembler<'a> {
    config: &'a AppConfig,
    board: &'a BoardInfo,
    plan: &'a LayoutPlan,
    table: &'a IdentifierTable,
    draw: Draw,
    /// Where copies of the outer contour go; `None` discards them.
    contour_layer: Option<String>,
}

impl Assembler<'_> {
    fn run(&self, source: &Document) -> Result<Document, PanelError> {
        let root = source.root();
        let mut panel = List::new(root.tag());
        let mut nets_written = false;
        let mut replicated = 0usize;

        for (index, node) in root.children().iter().enumerate() {
            let list = match node {
                Node::Atom(_) => {
                    panel.push(node.clone());
                    continue;
                }
                Node::List(list) => list,
            };

            let placement = Placement::classify(list.tag()).ok_or_else(|| {
                PanelError::Geometry(format!(
                    "unsupported top-level element `({} ...)`",
                    list.tag()
                ))
            })?;

            match placement {
                Placement::Once if list.tag() == "net_class" => {
                    panel.push(self.expand_net_class(list));
                }
                Placement::Once => panel.push(list.clone()),
                Placement::NetTable => {
                    if !nets_written {
                        nets_written = true;
                        for (code, name) in self.table.nets() {
                            panel.push(
                                List::new("net")
                                    .with_number(f64::from(*code))
                                    .with_string(name.as_str()),
                            );
                        }
                    }
                }
                Placement::Replicated(kind) => {
                    let outer = self.board.outline().is_outer(index);
                    if outer && self.contour_layer.is_none() {
                        continue;
                    }
                    for (cell, instance) in self.plan.cells().iter().zip(self.table.instances()) {
                        let mut copy = list.clone();
                        transform::translate(&mut copy, kind, cell.transform())?;
                        relabel::relabel(&mut copy, instance, self.table)?;
                        if let (true, Some(layer)) = (outer, &self.contour_layer) {
                            self.draw.set_layer(&mut copy, layer);
                        }
                        panel.push(copy);
                    }
                    replicated += 1;
                }
            }
        }

        info!(
            items = replicated,
            copies = self.plan.cells().len(),
            nets = self.table.nets().len();
            "Replicated board items"
        );

        let synthesized = self.synthesize()?;
        debug!(items = synthesized.len(); "Added panel artwork");
        for item in synthesized {
            panel.push(item);
        }

        Ok(Document::new(panel))
    }

    /// Frame, v-scores, rail text and the generation note.
    fn synthesize(&self) -> Result<Vec<List>, PanelError> {
        let config = self.config;
        let width = config.outline().line_width();
        let mut items = outline::frame(
            &self.draw,
            self.plan.panel(),
            self.board.outline_layer(),
            width,
        );

        let vscore = config.vscore();
        items.extend(vscore::vscores(
            &self.draw,
            self.plan,
            vscore,
            &self.board.layer(vscore.layer())?,
            &self.board.layer(vscore.text_layer())?,
            width,
        ));

        let rails = config.rails();
        let wants_rail_text = rails.horizontal_text().is_some()
            || rails.vertical_text().is_some()
            || rails.horizontal_title()
            || rails.vertical_title();
        if wants_rail_text {
            items.extend(rails::rail_texts(
                &self.draw,
                self.plan,
                rails,
                &self.board.layer(rails.text_layer())?,
                self.board.title(),
            ));
        }

        let report = config.report();
        if report.text().is_some() {
            let layer = self.board.layer(report.layer())?;
            let lower_extent = vscore::lower_extent(self.plan, vscore);
            items.extend(rails::report_text(
                &self.draw,
                self.plan,
                report,
                &layer,
                lower_extent,
            ));
        }

        Ok(items)
    }

    /// List every instance's name for each `(add_net "name")` of a net class.
    fn expand_net_class(&self, net_class: &List) -> List {
        let mut expanded = List::new(net_class.tag());
        for child in net_class.children() {
            match child {
                Node::List(entry) if entry.tag() == "add_net" => {
                    let Some(name) = entry.text(0) else {
                        expanded.push(child.clone());
                        continue;
                    };
                    for name in self.table.expanded_net_names(name) {
                        expanded.push(List::new("add_net").with_string(name));
                    }
                }
                _ => expanded.push(child.clone()),
            }
        }
        expanded
    }
}
