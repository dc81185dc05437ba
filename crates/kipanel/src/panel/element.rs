//! Classification of top-level board sections.

/// What the assembler does with a top-level section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Copied once, unchanged apart from net class expansion.
    Once,
    /// A source net table entry, replaced by the panel net table.
    NetTable,
    /// Copied once per grid cell.
    Replicated(ItemKind),
}

/// Kinds of replicated items, by how their coordinates move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemKind {
    /// Moves only its own `(at ...)` and embedded zones.
    Footprint,
    /// Board graphics: lines, shapes, text, dimensions, images.
    Drawing,
    /// Copper: segments, arcs and vias.
    Track,
    Zone,
    /// Holds member ids only.
    Group,
    /// Generated objects such as tuning patterns.
    Generated,
}

impl Placement {
    /// Classify a top-level tag, or `None` if it is not a known section.
    pub(crate) fn classify(tag: &str) -> Option<Self> {
        let placement = match tag {
            "version" | "generator" | "generator_version" | "host" | "general" | "paper"
            | "page" | "title_block" | "layers" | "setup" | "property" | "net_class"
            | "embedded_fonts" | "embedded_files" => Placement::Once,
            "net" => Placement::NetTable,
            "footprint" | "module" => Placement::Replicated(ItemKind::Footprint),
            "gr_line" | "gr_rect" | "gr_circle" | "gr_arc" | "gr_poly" | "gr_curve"
            | "gr_bbox" | "gr_text" | "gr_text_box" | "table" | "dimension" | "image"
            | "target" => Placement::Replicated(ItemKind::Drawing),
            "segment" | "arc" | "via" => Placement::Replicated(ItemKind::Track),
            "zone" => Placement::Replicated(ItemKind::Zone),
            "group" => Placement::Replicated(ItemKind::Group),
            "generated" => Placement::Replicated(ItemKind::Generated),
            _ => return None,
        };
        Some(placement)
    }
}
