//! Sketch's [`ParserDefinition`].

use std::sync::{Arc, LazyLock};

use rowan::GreenNode;
use tracing::{debug, trace};

use super::parser::{parse, parse_block};
use super::syntax_kind::{SKETCH, SyntaxKind};
use crate::base::{ElementType, Language, TokenSet};
use crate::core::{ReadAccess, Result};
use crate::file::{LanguageRegistry, ParserDefinition};
use crate::stubs::StubData;
use crate::tree::{NodeArena, NodeId};

/// Stub field holding a function's parameter count.
pub const PARAMS_FIELD: &str = "params";

static WHITESPACE_TOKENS: LazyLock<TokenSet> =
    LazyLock::new(|| TokenSet::of(&[SyntaxKind::WHITESPACE.element_type()]));
static COMMENT_TOKENS: LazyLock<TokenSet> =
    LazyLock::new(|| TokenSet::of(&[SyntaxKind::LINE_COMMENT.element_type()]));

#[derive(Debug, Default, Clone, Copy)]
pub struct SketchParserDefinition;

impl SketchParserDefinition {
    /// A registry with Sketch registered.
    pub fn registry() -> Arc<LanguageRegistry> {
        Arc::new(LanguageRegistry::new().with(Arc::new(SketchParserDefinition)))
    }
}

impl ParserDefinition for SketchParserDefinition {
    fn language(&self) -> &'static Language {
        &SKETCH
    }

    fn file_node_type(&self) -> ElementType {
        SyntaxKind::SOURCE_FILE.element_type()
    }

    fn whitespace_type(&self) -> ElementType {
        SyntaxKind::WHITESPACE.element_type()
    }

    fn whitespace_tokens(&self) -> &TokenSet {
        &WHITESPACE_TOKENS
    }

    fn comment_tokens(&self) -> &TokenSet {
        &COMMENT_TOKENS
    }

    fn element_type(&self, raw: rowan::SyntaxKind) -> ElementType {
        SyntaxKind::from_raw(raw.0)
            .unwrap_or(SyntaxKind::ERROR)
            .element_type()
    }

    fn parse(&self, text: &str, access: &ReadAccess<'_>) -> Result<GreenNode> {
        access.check_canceled()?;
        let parse = parse(text);
        if !parse.ok() {
            debug!(errors = parse.errors.len(), "parsed with syntax errors");
        }
        Ok(parse.green)
    }

    fn parse_lazy(&self, ty: ElementType, text: &str) -> GreenNode {
        trace!(?ty, len = text.len(), "parsing lazy block");
        parse_block(text).green
    }

    fn create_stub(&self, arena: &NodeArena, node: NodeId) -> Option<StubData> {
        let kind = SyntaxKind::from_element_type(arena.ty(node).ok()?)?;
        match kind {
            SyntaxKind::SOURCE_FILE => Some(StubData::default()),
            SyntaxKind::CLASS | SyntaxKind::FIELD => Some(declared_name(arena, node)),
            SyntaxKind::FUN => {
                let params = child_of_kind(arena, node, SyntaxKind::PARAM_LIST)
                    .map(|list| children_of_kind(arena, list, SyntaxKind::PARAM).count())
                    .unwrap_or(0);
                Some(declared_name(arena, node).with_field(PARAMS_FIELD, params.to_string()))
            }
            _ => None,
        }
    }
}

fn children_of_kind(arena: &NodeArena, node: NodeId, kind: SyntaxKind) -> impl Iterator<Item = NodeId> + '_ {
    let ty = kind.element_type();
    arena
        .children(node)
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(move |child| arena.ty(*child).is_ok_and(|child_ty| child_ty == ty))
}

fn child_of_kind(arena: &NodeArena, node: NodeId, kind: SyntaxKind) -> Option<NodeId> {
    children_of_kind(arena, node, kind).next()
}

fn declared_name(arena: &NodeArena, node: NodeId) -> StubData {
    child_of_kind(arena, node, SyntaxKind::IDENT)
        .and_then(|ident| arena.kind(ident).ok()?.leaf_text().map(StubData::named))
        .unwrap_or_default()
}
