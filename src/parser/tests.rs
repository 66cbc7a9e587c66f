use rstest::rstest;

use super::*;
use crate::core::ModelLock;
use crate::file::ParserDefinition;
use crate::stubs::StubTree;

const SAMPLE: &str = "class Foo {\n  val x = 1;\n  fun bar(a, b) { return a + b; }\n}\nfun main() { }\n";

fn kinds_of(node: &SyntaxNode) -> Vec<SyntaxKind> {
    node.children_with_tokens().map(|child| child.kind()).collect()
}

#[test]
fn test_parse_is_lossless() {
    let parse = parse(SAMPLE);
    assert!(parse.ok(), "{:?}", parse.errors);
    assert_eq!(parse.syntax().text().to_string(), SAMPLE);
}

#[test]
fn test_top_level_items() {
    let parse = parse(SAMPLE);
    let items: Vec<_> = parse.syntax().children().map(|node| node.kind()).collect();
    assert_eq!(items, vec![SyntaxKind::CLASS, SyntaxKind::FUN]);
}

#[test]
fn test_function_body_is_single_block_token() {
    let parse = parse("fun f(x) { if (x) { y; } }");
    let fun = parse.syntax().first_child().unwrap();
    assert_eq!(fun.kind(), SyntaxKind::FUN);

    let blocks: Vec<_> = fun
        .children_with_tokens()
        .filter_map(|child| child.into_token())
        .filter(|token| token.kind() == SyntaxKind::BLOCK)
        .collect();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].text(), "{ if (x) { y; } }");
}

#[test]
fn test_param_list() {
    let parse = parse("fun f(a, b, c) {}");
    let fun = parse.syntax().first_child().unwrap();
    let params = fun
        .children()
        .find(|node| node.kind() == SyntaxKind::PARAM_LIST)
        .unwrap();
    assert_eq!(
        params
            .children()
            .filter(|node| node.kind() == SyntaxKind::PARAM)
            .count(),
        3
    );
}

#[test]
fn test_parse_block_structure() {
    let parse = parse_block("{ a = 1; { b; } c; }");
    assert!(parse.ok(), "{:?}", parse.errors);
    let block = parse.syntax();
    assert_eq!(block.kind(), SyntaxKind::BLOCK);
    assert_eq!(block.text().to_string(), "{ a = 1; { b; } c; }");

    let kinds = kinds_of(&block);
    assert_eq!(kinds.first(), Some(&SyntaxKind::L_BRACE));
    assert_eq!(kinds.last(), Some(&SyntaxKind::R_BRACE));
    assert_eq!(
        block
            .children()
            .filter(|node| node.kind() == SyntaxKind::STATEMENT)
            .count(),
        3
    );

    // Nested blocks stay lazy inside their statement.
    let nested = block
        .children()
        .nth(1)
        .unwrap()
        .children_with_tokens()
        .any(|child| child.kind() == SyntaxKind::BLOCK);
    assert!(nested);
}

#[rstest]
#[case::missing_name("class { }")]
#[case::stray_token("; val x;")]
#[case::unterminated_block("fun f() { a;")]
#[case::missing_semicolon("val x = 1")]
fn test_errors_keep_text(#[case] input: &str) {
    let parse = parse(input);
    assert!(!parse.ok());
    assert_eq!(parse.syntax().text().to_string(), input);
}

#[test]
fn test_error_recovery_continues_with_next_item() {
    let parse = parse("??? class A { }");
    let kinds: Vec<_> = parse.syntax().children().map(|node| node.kind()).collect();
    assert_eq!(kinds, vec![SyntaxKind::ERROR, SyntaxKind::CLASS]);
}

#[test]
fn test_element_type_mapping() {
    let definition = SketchParserDefinition;
    for kind in [SyntaxKind::CLASS, SyntaxKind::BLOCK, SyntaxKind::IDENT] {
        let ty = definition.element_type(kind.into());
        assert_eq!(ty, kind.element_type());
        assert_eq!(SyntaxKind::from_element_type(ty), Some(kind));
    }
    assert_eq!(
        definition.element_type(rowan::SyntaxKind(u16::MAX)),
        SyntaxKind::ERROR.element_type()
    );
    assert!(SyntaxKind::FUN.element_type().is_stubbed());
    assert!(!SyntaxKind::STATEMENT.element_type().is_stubbed());
}

#[test]
fn test_stubs_from_text() {
    let lock = ModelLock::new();
    let access = lock.read();
    let stubs = StubTree::from_text(&SketchParserDefinition, SAMPLE, &access).unwrap();

    assert_eq!(
        stubs.dump(),
        "SOURCE_FILE\n  CLASS \"Foo\"\n    FIELD \"x\"\n    FUN \"bar\" params=2\n  FUN \"main\" params=0\n"
    );
}

#[test]
fn test_declarations_inside_bodies_are_not_stubbed() {
    let lock = ModelLock::new();
    let access = lock.read();
    let stubs = StubTree::from_text(&SketchParserDefinition, "fun f() { val hidden = 1; }", &access).unwrap();
    assert_eq!(stubs.len(), 2);
}
