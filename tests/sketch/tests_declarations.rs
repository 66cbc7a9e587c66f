//! Sketch declarations through the typed wrappers.

use rstest::rstest;
use stubtree::parser::{FunDecl, SketchFile};
use stubtree::psi::PsiNode;

use crate::helpers::file_helpers::*;
use crate::helpers::source_fixtures::*;

const NESTED: &str = "class Outer {\n  class Inner { val deep; }\n  fun f() { }\n}\n";

fn top_level_functions(text: &str, indexed: bool) -> Vec<(String, usize)> {
    let manager = manager();
    let anchor = if indexed {
        open_indexed(&manager, text)
    } else {
        open_parsed(&manager, text)
    };
    let access = manager.read();
    let file = SketchFile::cast(anchor.file_element()).unwrap();
    file.functions(&access)
        .unwrap()
        .iter()
        .map(|fun: &FunDecl| {
            (
                fun.name(&access).unwrap().unwrap_or_default().to_string(),
                fun.param_count(&access).unwrap(),
            )
        })
        .collect()
}

#[rstest]
#[case::from_stubs(true)]
#[case::from_nodes(false)]
fn test_functions_agree_between_representations(#[case] indexed: bool) {
    let text = "fun a() { }\nfun b(x) { x; }\nfun c(x, y, z) { }\n";
    assert_eq!(
        top_level_functions(text, indexed),
        vec![
            ("a".to_string(), 0),
            ("b".to_string(), 1),
            ("c".to_string(), 3)
        ]
    );
}

#[rstest]
#[case::from_stubs(true)]
#[case::from_nodes(false)]
fn test_nested_classes(#[case] indexed: bool) {
    let manager = manager();
    let anchor = if indexed {
        open_indexed(&manager, NESTED)
    } else {
        open_parsed(&manager, NESTED)
    };
    let access = manager.read();
    let file = SketchFile::cast(anchor.file_element()).unwrap();

    let outer = file.classes(&access).unwrap().remove(0);
    let inner = outer.classes(&access).unwrap().remove(0);
    assert_eq!(inner.name(&access).unwrap().as_deref(), Some("Inner"));
    let deep = inner.fields(&access).unwrap().remove(0);
    assert_eq!(deep.name(&access).unwrap().as_deref(), Some("deep"));
    assert_eq!(outer.functions(&access).unwrap().len(), 1);
    assert_eq!(anchor.is_tree_loaded(), !indexed);
}

#[test]
fn test_function_body_statements() {
    let manager = manager();
    let anchor = open_indexed(&manager, NESTED_BODIES);
    let access = manager.read();
    let file = SketchFile::cast(anchor.file_element()).unwrap();
    let outer = file.functions(&access).unwrap().remove(0);

    let statements = outer.statements(&access).unwrap();
    let texts: Vec<_> = statements
        .iter()
        .map(|statement| statement.text(&access).unwrap())
        .collect();
    assert_eq!(texts, vec!["val y = x;", "{ inner(y); }", "return y;"]);
    assert_eq!(anchor.text(&access).unwrap(), NESTED_BODIES);
}

#[test]
fn test_missing_name_falls_back_to_none() {
    let manager = manager();
    let anchor = open_parsed(&manager, "class { }");
    let access = manager.read();
    let file = SketchFile::cast(anchor.file_element()).unwrap();

    let class = file.classes(&access).unwrap().remove(0);
    assert_eq!(class.name(&access).unwrap(), None);
    assert!(class.name_identifier(&access).unwrap().is_none());
}

#[test]
fn test_fields_of_file() {
    let manager = manager();
    let anchor = open_indexed(&manager, CLASS_WITH_MEMBERS);
    let access = manager.read();
    let file = SketchFile::cast(anchor.file_element()).unwrap();

    let names: Vec<_> = file
        .fields(&access)
        .unwrap()
        .iter()
        .map(|field| field.name(&access).unwrap())
        .collect();
    assert_eq!(names, vec![Some("top".into())]);
    assert!(!anchor.is_tree_loaded());
}
