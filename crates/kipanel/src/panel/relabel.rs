//! Rewriting identifiers inside one copied item.

use std::ops::Range;

use kipanel_core::document::{Atom, List, Node};

use crate::{
    export::format_number,
    identifier::{
        IdentifierError, IdentifierTable, InstanceIdentifiers, net_code, reference_text,
    },
};

/// Give a copied item the identifiers of its instance.
///
/// Rewrites net references (`(net code "name")`, `(net code)`,
/// `(net "name")` and `(net_name "name")`), reference designators, and
/// `uuid`/`tstamp`/group ids so every copy is distinct.
///
/// # Errors
///
/// Returns [`IdentifierError::UnknownNet`] for a net code that is not in
/// the source net table.
pub(crate) fn relabel(
    item: &mut List,
    instance: &InstanceIdentifiers,
    table: &IdentifierTable,
) -> Result<(), IdentifierError> {
    let mut failure = None;
    item.walk_mut(&mut |list| {
        if failure.is_none() {
            if let Err(err) = relabel_list(list, instance, table) {
                failure = Some(err);
            }
        }
    });
    failure.map_or(Ok(()), Err)
}

fn relabel_list(
    list: &mut List,
    instance: &InstanceIdentifiers,
    table: &IdentifierTable,
) -> Result<(), IdentifierError> {
    match list.tag() {
        "net" => {
            if let Some(code) = list.number(0).and_then(net_code) {
                let code = instance.net_code(code)?;
                list.set_number(0, f64::from(code));
                if let Some(name) = table.net_name(code) {
                    let name = name.to_string();
                    list.set_text(1, name);
                }
            } else if let Some(name) = list.text(0) {
                let name = instance.net_name(name).to_string();
                list.set_text(0, name);
            }
        }
        "net_name" => {
            if let Some(name) = list.text(0) {
                let name = instance.net_name(name).to_string();
                list.set_text(0, name);
            }
        }
        "uuid" | "tstamp" | "id" => shift_ids(list, instance, 0..1),
        "members" => {
            let count = list.children().len();
            shift_ids(list, instance, 0..count);
        }
        _ => {
            if let Some(reference) = reference_text(list) {
                if let Some(renamed) = instance.reference(reference) {
                    let renamed = renamed.to_string();
                    list.set_text(1, renamed);
                }
            }
        }
    }
    Ok(())
}

fn shift_ids(list: &mut List, instance: &InstanceIdentifiers, range: Range<usize>) {
    for index in range {
        let (id, numeric) = match list.atom(index) {
            Some(Atom::Symbol(id) | Atom::String(id)) => (id.clone(), false),
            // Legacy timestamps such as `11223344` lex as numbers.
            Some(Atom::Number(value)) if *value >= 0.0 && value.fract() == 0.0 => {
                (format_number(*value), true)
            }
            _ => continue,
        };
        let mut shifted = instance.uuid(&id);
        if shifted == id {
            continue;
        }
        if numeric {
            shifted.make_ascii_uppercase();
        }
        if let Some(Node::Atom(atom)) = list.children_mut().get_mut(index) {
            *atom = match atom {
                Atom::String(_) => Atom::String(shifted),
                _ => Atom::Symbol(shifted),
            };
        }
    }
}
