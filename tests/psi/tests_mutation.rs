//! Structural edits through element handles.

use rstest::rstest;
use stubtree::core::{ConsistencyError, TreeError};
use stubtree::file::FileView;
use stubtree::parser::{SKETCH, SyntaxKind};
use stubtree::{TextRange, TextSize};

use crate::helpers::file_helpers::*;

const SOURCE: &str = "class A {\n  val x = 1;\n}\nval y = 2;\n";

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(TextSize::new(start), TextSize::new(end))
}

#[test]
fn test_add_after_anchor_inserts_copy() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let class = child(&file, &write, SyntaxKind::CLASS);
    let field = child(&file, &write, SyntaxKind::FIELD);

    let copy = file.add_after(&write, &field, Some(&class)).unwrap();

    assert_eq!(
        file_text(&anchor, &write),
        "class A {\n  val x = 1;\n}val y = 2;\nval y = 2;\n"
    );
    assert_eq!(copy.text(&write).unwrap(), "val y = 2;");
    assert_ne!(copy, field);
    assert_eq!(copy.prev_sibling(&write).unwrap(), Some(class));
    assert_eq!(field.text_range(&write).unwrap(), range(35, 45));

    let hints = anchor.take_formatting_hints();
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].range, range(24, 34));
    assert_eq!(hints[0].source, range(25, 35));
    assert!(anchor.take_formatting_hints().is_empty());
}

#[rstest]
#[case::append(false, "class A {\n  val x = 1;\n}\nval y = 2;\nval y = 2;")]
#[case::prepend(true, "val y = 2;class A {\n  val x = 1;\n}\nval y = 2;\n")]
fn test_add_without_anchor(#[case] before: bool, #[case] expected: &str) {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let field = child(&file, &write, SyntaxKind::FIELD);

    if before {
        file.add_before(&write, &field, None).unwrap();
    } else {
        file.add_after(&write, &field, None).unwrap();
    }
    assert_eq!(file_text(&anchor, &write), expected);
}

#[test]
fn test_add_appends_last_child() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let class = child(&file, &write, SyntaxKind::CLASS);
    let field = child(&class, &write, SyntaxKind::FIELD);

    let copy = file.add(&write, &field).unwrap();
    assert_eq!(file.last_child(&write).unwrap(), Some(copy.clone()));
    assert_eq!(copy.parent(&write).unwrap(), Some(file.clone()));
    assert!(file_text(&anchor, &write).ends_with("val y = 2;\nval x = 1;"));
}

#[test]
fn test_add_range_before_keeps_order() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let class = child(&file, &write, SyntaxKind::CLASS);
    let field = child(&file, &write, SyntaxKind::FIELD);
    let newline = field.next_sibling(&write).unwrap().unwrap();

    let copies = file
        .add_range_before(&write, &field, &newline, Some(&class))
        .unwrap();
    assert_eq!(copies.len(), 2);
    assert_eq!(
        file_text(&anchor, &write),
        "val y = 2;\nclass A {\n  val x = 1;\n}\nval y = 2;\n"
    );
    assert_eq!(anchor.take_formatting_hints().len(), 2);
}

#[test]
fn test_add_range_rejects_non_siblings() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let class = child(&file, &write, SyntaxKind::CLASS);
    let inner = child(&class, &write, SyntaxKind::FIELD);
    let outer = child(&file, &write, SyntaxKind::FIELD);

    let err = file.add_range(&write, &inner, &outer).unwrap_err();
    assert!(matches!(
        err,
        TreeError::Consistency(ConsistencyError::MismatchedParents { .. })
    ));
    assert_eq!(file_text(&anchor, &write), SOURCE);
}

#[test]
fn test_add_to_read_only_file_is_unsupported() {
    let manager = manager();
    let anchor = open_view(&manager, FileView::new(FILE_NAME, SOURCE, &SKETCH).read_only());
    let write = manager.write();
    let file = anchor.file_element();
    let class = child(&file, &write, SyntaxKind::CLASS);
    let field = child(&file, &write, SyntaxKind::FIELD);

    let err = file.add_after(&write, &field, Some(&class)).unwrap_err();
    assert!(err.is_unsupported());
    assert!(field.delete(&write).unwrap_err().is_unsupported());
    assert_eq!(file_text(&anchor, &write), SOURCE);
}

#[test]
fn test_add_to_leaf_is_unsupported() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let field = child(&file, &write, SyntaxKind::FIELD);
    let ident = child(&field, &write, SyntaxKind::IDENT);

    assert!(ident.add(&write, &field).unwrap_err().is_unsupported());
    assert_eq!(file_text(&anchor, &write), SOURCE);
}

#[test]
fn test_anchor_from_other_file_is_unsupported() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let other = open_view(&manager, FileView::new("other.sk", SOURCE, &SKETCH));
    let write = manager.write();
    let file = anchor.file_element();
    let field = child(&file, &write, SyntaxKind::FIELD);
    let foreign = child(&other.file_element(), &write, SyntaxKind::CLASS);

    assert!(file.add_after(&write, &field, Some(&foreign)).unwrap_err().is_unsupported());

    // Copying from another file is fine.
    file.add(&write, &foreign).unwrap();
    assert!(file_text(&anchor, &write).ends_with("val y = 2;\nclass A {\n  val x = 1;\n}"));
}

#[test]
fn test_delete_removes_text_span() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let field = child(&file, &write, SyntaxKind::FIELD);
    let span = field.text_range(&write).unwrap();

    field.delete(&write).unwrap();

    let mut expected = SOURCE.to_string();
    expected.replace_range(usize::from(span.start())..usize::from(span.end()), "");
    assert_eq!(file_text(&anchor, &write), expected);
    assert!(!field.is_valid(&write));
    assert!(field.text(&write).unwrap_err().is_invalid_element());
}

#[test]
fn test_delete_file_element_is_unsupported() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();

    let err = anchor.file_element().delete(&write).unwrap_err();
    assert!(err.is_unsupported());
    assert!(err.to_string().contains("cannot delete SOURCE_FILE under null"));
}

#[test]
fn test_delete_inside_lazy_body_is_unsupported() {
    let manager = manager();
    let anchor = open_parsed(&manager, "fun f() { a; b; }");
    let write = manager.write();
    let fun = child(&anchor.file_element(), &write, SyntaxKind::FUN);
    let body = child(&fun, &write, SyntaxKind::BLOCK);
    let statement = child(&body, &write, SyntaxKind::STATEMENT);

    assert!(statement.delete(&write).unwrap_err().is_unsupported());
    assert_eq!(file_text(&anchor, &write), "fun f() { a; b; }");
}

#[test]
fn test_delete_child_range_inside_lazy_body_is_unsupported() {
    let manager = manager();
    let anchor = open_parsed(&manager, "fun f() { a; b; }");
    let write = manager.write();
    let fun = child(&anchor.file_element(), &write, SyntaxKind::FUN);
    let body = child(&fun, &write, SyntaxKind::BLOCK);
    let statement = child(&body, &write, SyntaxKind::STATEMENT);

    let err = body
        .delete_child_range(&write, &statement, &statement)
        .unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(file_text(&anchor, &write), "fun f() { a; b; }");
    assert!(statement.is_valid(&write));
}

#[test]
fn test_delete_child_range() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let class = child(&file, &write, SyntaxKind::CLASS);
    let newline = class.next_sibling(&write).unwrap().unwrap();

    file.delete_child_range(&write, &class, &newline).unwrap();
    assert_eq!(file_text(&anchor, &write), "val y = 2;\n");
    assert!(!class.is_valid(&write));
}

#[test]
fn test_delete_child_range_with_mismatched_parents() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let class = child(&file, &write, SyntaxKind::CLASS);
    let inner = child(&class, &write, SyntaxKind::FIELD);

    let err = file.delete_child_range(&write, &class, &inner).unwrap_err();
    match err {
        TreeError::Consistency(ConsistencyError::MismatchedParents {
            first,
            last,
            last_parent,
            ..
        }) => {
            assert_eq!(first, "CLASS");
            assert_eq!(last, "FIELD");
            assert!(last_parent.starts_with("CLASS@"));
        }
        other => panic!("expected mismatched parents, got {other:?}"),
    }
    assert_eq!(file_text(&anchor, &write), SOURCE);
    assert!(class.is_valid(&write));
}

#[test]
fn test_delete_child_range_reversed_is_unsupported() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let class = child(&file, &write, SyntaxKind::CLASS);
    let field = child(&file, &write, SyntaxKind::FIELD);

    assert!(file.delete_child_range(&write, &field, &class).unwrap_err().is_unsupported());
    assert_eq!(file_text(&anchor, &write), SOURCE);
}

#[test]
fn test_replace_swaps_in_copy() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let file = anchor.file_element();
    let class = child(&file, &write, SyntaxKind::CLASS);
    let inner = child(&class, &write, SyntaxKind::FIELD);
    let outer = child(&file, &write, SyntaxKind::FIELD);

    let copy = inner.replace(&write, &outer).unwrap();
    assert_eq!(
        file_text(&anchor, &write),
        "class A {\n  val y = 2;\n}\nval y = 2;\n"
    );
    assert_eq!(copy.parent(&write).unwrap(), Some(class));
    assert!(!inner.is_valid(&write));
    assert!(outer.is_valid(&write));
    assert_eq!(anchor.take_formatting_hints().len(), 1);
}

#[test]
fn test_replace_inside_lazy_body() {
    let manager = manager();
    let anchor = open_parsed(&manager, "fun f() { a; b; }");
    let write = manager.write();
    let fun = child(&anchor.file_element(), &write, SyntaxKind::FUN);
    let body = child(&fun, &write, SyntaxKind::BLOCK);
    let statements = body
        .find_children_by_type(&write, SyntaxKind::STATEMENT.element_type())
        .unwrap();

    statements[0].replace(&write, &statements[1]).unwrap();
    assert_eq!(file_text(&anchor, &write), "fun f() { b; b; }");
}

#[test]
fn test_edit_drops_stub_tree() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let stubs = manager.index(anchor.view(), &SKETCH, &write).unwrap();
    anchor.replace_stubs(stubs, &write);
    assert!(anchor.stub_tree().is_some());

    let file = anchor.file_element();
    let field = child(&file, &write, SyntaxKind::FIELD);
    file.add(&write, &field).unwrap();
    assert!(anchor.stub_tree().is_none());

    // Bound elements keep answering from their nodes.
    assert_eq!(field.text(&write).unwrap(), "val y = 2;");
}

#[test]
fn test_failed_edit_keeps_stub_tree() {
    let manager = manager();
    let anchor = open_parsed(&manager, SOURCE);
    let write = manager.write();
    let stubs = manager.index(anchor.view(), &SKETCH, &write).unwrap();
    anchor.replace_stubs(stubs, &write);

    assert!(anchor.file_element().delete(&write).is_err());
    assert!(anchor.stub_tree().is_some());
}
