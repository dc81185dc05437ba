use proptest::prelude::*;

use kipanel::{
    document::{Atom, Document, List, Node},
    export,
};
use kipanel_parser::{ParseConfig, parse};

fn tag() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}"
}

fn atom() -> impl Strategy<Value = Node> {
    prop_oneof![
        (-1.0e6f64..1.0e6).prop_map(|value| Node::Atom(Atom::Number(value))),
        (-1_000_000i64..1_000_000).prop_map(|value| Node::Atom(Atom::Number(value as f64))),
        "[A-Za-z_][A-Za-z0-9_.:+-]{0,10}".prop_map(|symbol| Node::Atom(Atom::Symbol(symbol))),
        "[ -~\n\t]{0,12}".prop_map(|text| Node::Atom(Atom::String(text))),
    ]
}

fn list() -> impl Strategy<Value = List> {
    let leaf = (tag(), prop::collection::vec(atom(), 0..4))
        .prop_map(|(tag, children)| List::with_children(tag, children));

    leaf.prop_recursive(4, 48, 6, |inner| {
        (
            tag(),
            prop::collection::vec(
                prop_oneof![atom(), inner.prop_map(Node::List)],
                0..6,
            ),
        )
            .prop_map(|(tag, children)| List::with_children(tag, children))
    })
}

fn check_round_trip(root: List) -> Result<(), TestCaseError> {
    let document = Document::new(root);
    let text = export::to_string(&document);

    let parsed = parse(&text, &ParseConfig::new())
        .map_err(|err| TestCaseError::fail(format!("{err}\n{text}")))?;
    prop_assert_eq!(&parsed, &document);

    // Writing again gives the same text
    prop_assert_eq!(export::to_string(&parsed), text);
    Ok(())
}

#[test]
fn test_precise_numbers_survive() {
    let source = "(kicad_pcb (version 20221018) (x 0.1234567) (y -0.000000123 123456.789012345))";
    let parsed = parse(source, &ParseConfig::new()).unwrap();

    let text = export::to_string(&parsed);
    assert!(text.contains("(x 0.1234567)"));
    assert_eq!(parse(&text, &ParseConfig::new()).unwrap(), parsed);
}

proptest! {
    #[test]
    fn round_trip(root in list()) {
        check_round_trip(root)?;
    }
}
