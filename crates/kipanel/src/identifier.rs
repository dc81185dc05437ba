//! Globally unique identifiers across panel instances.
//!
//! Every copy of the board needs its own reference designators, net codes
//! and net names so the panel stays a valid design. This module plans the
//! renaming up front:
//!
//! - [`SourceIdentifiers`] collects references and the net table of the
//!   source board.
//! - A [`NamingScheme`] turns a source name and an instance index into a
//!   new name ([`SuffixScheme`] appends `_1`, `_2`, ...).
//! - [`IdentifierTable`] allocates net codes with a per-run counter,
//!   records the origin of every produced identifier and rejects
//!   collisions.
//! - [`InstanceIdentifiers`] answers lookups for one instance while its
//!   elements are relabelled.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use kipanel_core::document::{Document, List};

/// Multiplier applied per instance to the trailing hex field of UUIDs.
const UUID_STRIDE: u128 = 0x9E37_79B1;

/// Produces instance-specific names.
///
/// `instance` is the zero-based index of the grid cell in row-major order.
pub trait NamingScheme {
    /// New reference designator for `source` in `instance`.
    fn reference(&self, source: &str, instance: usize) -> String;

    /// New name for the non-shared net `source` in `instance`.
    fn net_name(&self, source: &str, instance: usize) -> String;
}

/// Appends a separator and the one-based instance number: `R1` becomes `R1_2`.
///
/// # Examples
///
/// ```
/// # use kipanel::identifier::{NamingScheme, SuffixScheme};
/// let scheme = SuffixScheme::default();
/// assert_eq!(scheme.reference("R1", 0), "R1_1");
/// assert_eq!(scheme.net_name("/SDA", 5), "/SDA_6");
/// ```
#[derive(Debug, Clone)]
pub struct SuffixScheme {
    separator: String,
}

impl SuffixScheme {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for SuffixScheme {
    fn default() -> Self {
        Self::new("_")
    }
}

impl NamingScheme for SuffixScheme {
    fn reference(&self, source: &str, instance: usize) -> String {
        format!("{source}{}{}", self.separator, instance + 1)
    }

    fn net_name(&self, source: &str, instance: usize) -> String {
        format!("{source}{}{}", self.separator, instance + 1)
    }
}

/// The kind of a produced identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Reference,
    NetName,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::Reference => write!(f, "reference"),
            IdentifierKind::NetName => write!(f, "net name"),
        }
    }
}

/// Where a produced identifier came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// `None` for shared nets, which belong to every instance.
    instance: Option<usize>,
    source: String,
}

impl Origin {
    pub fn instance(&self) -> Option<usize> {
        self.instance
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance {
            Some(instance) => write!(f, "`{}` of board {}", self.source, instance + 1),
            None => write!(f, "shared `{}`", self.source),
        }
    }
}

/// Identifier rewriting failures.
#[derive(Debug, Error)]
pub enum IdentifierError {
    #[error("{kind} `{identifier}` was produced for both {first} and {second}")]
    Collision {
        kind: IdentifierKind,
        identifier: String,
        first: Origin,
        second: Origin,
    },

    #[error("net code {code} is used but missing from the net table")]
    UnknownNet { code: u32 },
}

/// Identifiers found in the source board.
#[derive(Debug, Clone, Default)]
pub struct SourceIdentifiers {
    references: Vec<String>,
    nets: IndexMap<u32, String>,
}

impl SourceIdentifiers {
    /// Collect distinct references and the top-level net table.
    ///
    /// References come from `(fp_text reference ...)` (older files) and
    /// `(property "Reference" ...)` inside footprints. Empty references are
    /// skipped.
    pub fn collect(document: &Document) -> Self {
        let root = document.root();

        let mut nets = IndexMap::new();
        for net in root.find_all("net") {
            if let Some(code) = net.number(0).and_then(net_code) {
                let name = net.text(1).unwrap_or_default().to_string();
                nets.entry(code).or_insert(name);
            }
        }

        let mut seen = HashSet::new();
        let mut references = Vec::new();
        for footprint in root.lists().filter(|list| is_footprint(list.tag())) {
            for child in footprint.lists() {
                if let Some(reference) = reference_text(child) {
                    if !reference.is_empty() && seen.insert(reference.to_string()) {
                        references.push(reference.to_string());
                    }
                }
            }
        }

        Self { references, nets }
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Source net table in file order.
    pub fn nets(&self) -> &IndexMap<u32, String> {
        &self.nets
    }

    /// Returns `true` if a net with this name exists.
    pub fn has_net(&self, name: &str) -> bool {
        self.nets.values().any(|net| net == name)
    }
}

/// Per-run identifier allocation for all panel instances.
#[derive(Debug)]
pub struct IdentifierTable {
    next_code: u32,
    nets: IndexMap<u32, String>,
    origins: HashMap<(IdentifierKind, String), Origin>,
    instances: Vec<InstanceIdentifiers>,
}

impl IdentifierTable {
    /// Plan identifiers for `instance_count` copies of the source board.
    ///
    /// Net code 0 keeps its code and name. Shared nets get the next codes
    /// once and keep their names. Every other net then gets a fresh code
    /// per instance, in cell order and source order.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::Collision`] if two different origins
    /// produce the same reference or net name.
    pub fn build(
        source: &SourceIdentifiers,
        shared_nets: &[String],
        scheme: &dyn NamingScheme,
        instance_count: usize,
    ) -> Result<Self, IdentifierError> {
        let mut table = Self {
            next_code: 1,
            nets: IndexMap::new(),
            origins: HashMap::new(),
            instances: Vec::with_capacity(instance_count),
        };

        let shared: HashSet<&str> = shared_nets.iter().map(String::as_str).collect();
        let mut common_codes = HashMap::new();

        if let Some(name) = source.nets.get(&0) {
            table.nets.insert(0, name.clone());
            common_codes.insert(0, 0);
        }

        for (&code, name) in &source.nets {
            if code != 0 && shared.contains(name.as_str()) {
                let new_code = table.allocate_code();
                table.nets.insert(new_code, name.clone());
                table.record(
                    IdentifierKind::NetName,
                    name,
                    Origin {
                        instance: None,
                        source: name.clone(),
                    },
                )?;
                common_codes.insert(code, new_code);
            }
        }

        for index in 0..instance_count {
            let mut instance = InstanceIdentifiers {
                index,
                references: HashMap::new(),
                net_codes: common_codes.clone(),
                net_names: HashMap::new(),
            };

            for (&code, name) in &source.nets {
                if common_codes.contains_key(&code) {
                    continue;
                }
                let new_name = if name.is_empty() {
                    String::new()
                } else {
                    let new_name = scheme.net_name(name, index);
                    table.record(
                        IdentifierKind::NetName,
                        &new_name,
                        Origin {
                            instance: Some(index),
                            source: name.clone(),
                        },
                    )?;
                    instance.net_names.insert(name.clone(), new_name.clone());
                    new_name
                };
                let new_code = table.allocate_code();
                table.nets.insert(new_code, new_name);
                instance.net_codes.insert(code, new_code);
            }

            for reference in &source.references {
                let new_reference = scheme.reference(reference, index);
                table.record(
                    IdentifierKind::Reference,
                    &new_reference,
                    Origin {
                        instance: Some(index),
                        source: reference.clone(),
                    },
                )?;
                instance
                    .references
                    .insert(reference.clone(), new_reference);
            }

            table.instances.push(instance);
        }

        debug!(
            instances = instance_count,
            nets = table.nets.len(),
            references = source.references.len() * instance_count;
            "Planned panel identifiers"
        );
        Ok(table)
    }

    /// Identifiers for one instance.
    pub fn instance(&self, index: usize) -> Option<&InstanceIdentifiers> {
        self.instances.get(index)
    }

    /// Identifiers for every instance, in cell order.
    pub fn instances(&self) -> &[InstanceIdentifiers] {
        &self.instances
    }

    /// The panel net table: code to name, in allocation order.
    pub fn nets(&self) -> &IndexMap<u32, String> {
        &self.nets
    }

    /// Name of a panel net code.
    pub fn net_name(&self, code: u32) -> Option<&str> {
        self.nets.get(&code).map(String::as_str)
    }

    /// Panel net names a source net is known by, one per instance.
    ///
    /// Shared nets and the unconnected net map to their own name once.
    pub fn expanded_net_names(&self, source: &str) -> Vec<String> {
        let renamed: Vec<String> = self
            .instances
            .iter()
            .filter_map(|instance| instance.net_names.get(source).cloned())
            .collect();
        if renamed.is_empty() {
            vec![source.to_string()]
        } else {
            renamed
        }
    }

    /// The per-run net code counter
    fn allocate_code(&mut self) -> u32 {
        let code = self.next_code;
        self.next_code += 1;
        code
    }

    fn record(
        &mut self,
        kind: IdentifierKind,
        identifier: &str,
        origin: Origin,
    ) -> Result<(), IdentifierError> {
        let key = (kind, identifier.to_string());
        match self.origins.get(&key) {
            Some(first) if *first != origin => Err(IdentifierError::Collision {
                kind,
                identifier: identifier.to_string(),
                first: first.clone(),
                second: origin,
            }),
            Some(_) => Ok(()),
            None => {
                self.origins.insert(key, origin);
                Ok(())
            }
        }
    }
}

/// Lookups for one panel instance.
#[derive(Debug, Clone)]
pub struct InstanceIdentifiers {
    index: usize,
    references: HashMap<String, String>,
    net_codes: HashMap<u32, u32>,
    net_names: HashMap<String, String>,
}

impl InstanceIdentifiers {
    /// Zero-based instance index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// New reference for a source reference, if it is one.
    pub fn reference(&self, source: &str) -> Option<&str> {
        self.references.get(source).map(String::as_str)
    }

    /// Panel net code for a source net code.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::UnknownNet`] if the code is not in the
    /// source net table.
    pub fn net_code(&self, source: u32) -> Result<u32, IdentifierError> {
        self.net_codes
            .get(&source)
            .copied()
            .ok_or(IdentifierError::UnknownNet { code: source })
    }

    /// Panel net name for a source net name. Shared and unconnected nets
    /// keep their name.
    pub fn net_name<'a>(&'a self, source: &'a str) -> &'a str {
        self.net_names
            .get(source)
            .map(String::as_str)
            .unwrap_or(source)
    }

    /// Shift a UUID or timestamp so it is unique to this instance.
    pub fn uuid(&self, uuid: &str) -> String {
        shift_uuid(uuid, self.index)
    }
}

/// Shift the trailing hexadecimal field of a UUID by `instance` strides.
///
/// Instance 0 keeps the UUID unchanged. The field keeps its width and case;
/// values wrap around within that width. Tokens whose trailing field is not
/// 1 to 16 hex digits are returned unchanged.
///
/// # Examples
///
/// ```
/// # use kipanel::identifier::shift_uuid;
/// let uuid = "0c1b2d9e-35f6-4d0b-9a43-000000000000";
/// assert_eq!(shift_uuid(uuid, 0), uuid);
/// assert_eq!(shift_uuid(uuid, 1), "0c1b2d9e-35f6-4d0b-9a43-00009e3779b1");
/// assert_eq!(shift_uuid("5C3A1B2D", 1), "FA7194DE");
/// ```
pub fn shift_uuid(uuid: &str, instance: usize) -> String {
    if instance == 0 {
        return uuid.to_string();
    }

    let split = uuid.rfind('-').map_or(0, |dash| dash + 1);
    let (head, field) = uuid.split_at(split);
    let width = field.len();
    if !(1..=16).contains(&width) || !field.bytes().all(|b| b.is_ascii_hexdigit()) {
        return uuid.to_string();
    }
    let Ok(value) = u64::from_str_radix(field, 16) else {
        return uuid.to_string();
    };

    let modulus = 1u128 << (4 * width);
    let shifted = (u128::from(value) + instance as u128 * UUID_STRIDE) % modulus;

    if field.bytes().any(|b| b.is_ascii_uppercase()) {
        format!("{head}{shifted:0width$X}")
    } else {
        format!("{head}{shifted:0width$x}")
    }
}

pub(crate) fn is_footprint(tag: &str) -> bool {
    matches!(tag, "footprint" | "module")
}

/// Reference text held by a footprint child, if the child is its reference.
pub(crate) fn reference_text(list: &List) -> Option<&str> {
    match (list.tag(), list.text(0)) {
        ("fp_text", Some("reference")) | ("property", Some("Reference")) => list.text(1),
        _ => None,
    }
}

/// Convert a numeric atom to a net code.
pub(crate) fn net_code(value: f64) -> Option<u32> {
    (value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
}
