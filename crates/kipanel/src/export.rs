//! Serializer for board documents.
//!
//! Writes a [`Document`] back to the nested-list text format:
//!
//! - two-space indentation per nesting level
//! - a list whose children are all atoms stays on one line
//! - otherwise every child after the first nested list starts a new line
//!   and the closing parenthesis gets its own line
//! - numbers use at most six decimals without trailing zeros
//!
//! The output always ends with a newline and parses back to the same tree.

use kipanel_core::document::{Atom, Document, List, Node};

const INDENT: &str = "  ";

/// Serialize a document to text.
///
/// # Examples
///
/// ```
/// # use kipanel_core::document::{Document, List};
/// let document = Document::new(
///     List::new("kicad_pcb")
///         .with_list(List::new("version").with_number(20221018.0))
///         .with_list(List::new("net").with_number(0.0).with_string("")),
/// );
///
/// assert_eq!(
///     kipanel::export::to_string(&document),
///     "(kicad_pcb\n  (version 20221018)\n  (net 0 \"\")\n)\n"
/// );
/// ```
pub fn to_string(document: &Document) -> String {
    let mut out = String::new();
    write_list(document.root(), 0, &mut out);
    out.push('\n');
    out
}

fn write_list(list: &List, depth: usize, out: &mut String) {
    out.push('(');
    out.push_str(list.tag());

    let mut broken = false;
    for child in list.children() {
        match child {
            Node::Atom(atom) if !broken => {
                out.push(' ');
                write_atom(atom, out);
            }
            Node::Atom(atom) => {
                newline(depth + 1, out);
                write_atom(atom, out);
            }
            Node::List(child) => {
                broken = true;
                newline(depth + 1, out);
                write_list(child, depth + 1, out);
            }
        }
    }

    if broken {
        newline(depth, out);
    }
    out.push(')');
}

fn newline(depth: usize, out: &mut String) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_atom(atom: &Atom, out: &mut String) {
    match atom {
        Atom::Symbol(symbol) => out.push_str(symbol),
        Atom::Number(value) => out.push_str(&format_number(*value)),
        Atom::String(text) => write_string(text, out),
    }
}

fn write_string(text: &str, out: &mut String) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
}

/// Format a number the way board files expect it.
///
/// Writes the shortest decimal that reads back as the same value, without
/// an exponent. Integers have no decimal point and negative zero is
/// written as `0`.
///
/// # Examples
///
/// ```
/// # use kipanel::export::format_number;
/// assert_eq!(format_number(42.0), "42");
/// assert_eq!(format_number(-0.05), "-0.05");
/// assert_eq!(format_number(0.1234567), "0.1234567");
/// assert_eq!(format_number(-0.0), "0");
/// ```
pub fn format_number(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0".to_string();
    }

    // `Display` for f64 never switches to exponent notation.
    value.to_string()
}
