//! Stub to node promotion, seen from outside the crate.

use stubtree::core::{BindPhase, ConsistencyError, TreeError};
use stubtree::parser::{ClassDecl, FunDecl, SketchFile, SyntaxKind};
use stubtree::psi::{ElementState, PsiNode};

use crate::helpers::file_helpers::*;
use crate::helpers::source_fixtures::*;

fn binding_phase(err: TreeError) -> BindPhase {
    match err {
        TreeError::Consistency(ConsistencyError::StubBinding(failure)) => failure.phase,
        other => panic!("expected a binding failure, got {other:?}"),
    }
}

#[test]
fn test_class_name_then_body_loads_tree_once() {
    let manager = manager();
    let anchor = open_indexed(&manager, CLASS_WITH_MEMBERS);
    let access = manager.read();
    let file = SketchFile::cast(anchor.file_element()).unwrap();

    let class = file.classes(&access).unwrap().remove(0);
    assert_eq!(class.name(&access).unwrap().as_deref(), Some("Foo"));
    let fun = class.functions(&access).unwrap().remove(0);
    assert_eq!(fun.name(&access).unwrap().as_deref(), Some("bar"));
    assert_eq!(fun.param_count(&access).unwrap(), 2);
    assert!(!anchor.is_tree_loaded());
    assert!(!fun.element().is_bound());

    let body = fun.body_text(&access).unwrap();
    assert_eq!(body.as_deref(), Some("{ return a + b; }"));
    assert!(fun.element().is_bound());
    assert_eq!(anchor.tree_loads(), 1);

    // Answers do not change once bound.
    assert_eq!(class.name(&access).unwrap().as_deref(), Some("Foo"));
    assert_eq!(fun.param_count(&access).unwrap(), 2);
    assert_eq!(fun.statements(&access).unwrap().len(), 1);
    assert_eq!(anchor.tree_loads(), 1);
}

#[test]
fn test_node_is_identical_across_calls() {
    let manager = manager();
    let anchor = open_indexed(&manager, CLASS_WITH_MEMBERS);
    let access = manager.read();
    let class = stub_children(&anchor.file_element(), &access, SyntaxKind::CLASS).remove(0);

    assert!(matches!(class.state().unwrap(), ElementState::Unbound(_)));
    let first = class.node(&access).unwrap();
    let second = class.node(&access).unwrap();
    assert_eq!(first, second);
    assert_eq!(class.state().unwrap(), ElementState::Bound(first));
}

#[test]
fn test_typed_cast_checks_element_type() {
    let manager = manager();
    let anchor = open_parsed(&manager, CLASS_WITH_MEMBERS);
    let access = manager.read();
    let file = anchor.file_element();
    let class = child(&file, &access, SyntaxKind::CLASS);

    assert!(ClassDecl::cast(class.clone()).is_some());
    assert!(FunDecl::cast(class.clone()).is_none());
    assert!(ClassDecl::can_cast(SyntaxKind::CLASS.element_type()));
    assert_eq!(ClassDecl::cast(class.clone()).unwrap().element(), &class);
}

#[test]
fn test_parsed_file_answers_from_nodes() {
    let manager = manager();
    let anchor = open_parsed(&manager, CLASS_WITH_MEMBERS);
    let access = manager.read();
    let file = SketchFile::cast(anchor.file_element()).unwrap();

    let class = file.classes(&access).unwrap().remove(0);
    assert!(class.element().is_bound());
    assert_eq!(class.name(&access).unwrap().as_deref(), Some("Foo"));
    assert_eq!(class.fields(&access).unwrap().len(), 1);
    assert_eq!(file.fields(&access).unwrap()[0].name(&access).unwrap().as_deref(), Some("top"));
    let ident = class.name_identifier(&access).unwrap().unwrap();
    assert_eq!(ident.text(&access).unwrap(), "Foo");
}

#[test]
fn test_binding_failure_when_tree_already_loaded() {
    let manager = manager();
    let anchor = open_with_stubs(&manager, ONE_CLASS, TWO_CLASSES);
    let access = manager.read();
    let classes = stub_children(&anchor.file_element(), &access, SyntaxKind::CLASS);

    // Materialize through the file element; neither class is bound yet.
    anchor.file_element().node(&access).unwrap();
    assert!(anchor.is_tree_loaded());
    assert!(!classes[1].is_bound());

    assert_eq!(
        binding_phase(classes[1].node(&access).unwrap_err()),
        BindPhase::TreeAlreadyLoaded
    );
    assert!(classes[0].node(&access).is_ok());
}

#[test]
fn test_binding_failure_after_load() {
    let manager = manager();
    let anchor = open_with_stubs(&manager, ONE_CLASS, TWO_CLASSES);
    let access = manager.read();
    let classes = stub_children(&anchor.file_element(), &access, SyntaxKind::CLASS);

    assert_eq!(binding_phase(classes[1].node(&access).unwrap_err()), BindPhase::AfterLoad);
    assert!(anchor.is_tree_loaded());
    assert!(classes[0].node(&access).is_ok());
}

#[test]
fn test_edit_invalidates_elements_without_nodes() {
    let manager = manager();
    let anchor = open_with_stubs(&manager, ONE_CLASS, TWO_CLASSES);
    let write = manager.write();
    let classes = stub_children(&anchor.file_element(), &write, SyntaxKind::CLASS);
    let first = classes[0].clone();

    first.node(&write).unwrap();
    let copy = anchor.file_element().add(&write, &first).unwrap();
    assert!(copy.is_bound());
    assert!(anchor.stub_tree().is_none());

    let err = classes[1].node(&write).unwrap_err();
    assert!(err.is_invalid_element());
    assert!(first.is_valid(&write));
}
