//! Node factory: element type tag in, node payload out.
//!
//! Dispatch order for every creation path:
//! 1. the element type's own constructor, if it carries one
//! 2. the language's [`FactoryOverride`], if the parser definition supplies one
//! 3. built-in defaults keyed on [`ElementKind`]
//!
//! Every path ends in a default, so creation cannot fail.

use std::sync::Arc;

use super::{NodeData, NodeKind};
use crate::base::{ElementKind, ElementType};
use crate::core::Interner;

/// Per-language hook for node kinds the defaults do not cover.
///
/// Returning `None` falls through to the built-in defaults.
pub trait FactoryOverride: Send + Sync {
    fn create_composite(&self, _ty: ElementType) -> Option<NodeKind> {
        None
    }

    fn create_leaf(&self, _ty: ElementType, _text: &str) -> Option<NodeKind> {
        None
    }
}

/// Creates nodes for one file, interning whitespace against a table shared by
/// every node of that file.
pub struct NodeFactory {
    whitespace: Interner,
    whitespace_type: ElementType,
    override_: Option<Arc<dyn FactoryOverride>>,
}

impl std::fmt::Debug for NodeFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeFactory")
            .field("whitespace_type", &self.whitespace_type)
            .field("interned", &self.whitespace.len())
            .field("has_override", &self.override_.is_some())
            .finish()
    }
}

impl NodeFactory {
    pub fn new(whitespace_type: ElementType, override_: Option<Arc<dyn FactoryOverride>>) -> Self {
        Self {
            whitespace: Interner::new(),
            whitespace_type,
            override_,
        }
    }

    pub fn interner(&self) -> &Interner {
        &self.whitespace
    }

    pub fn create_composite(&self, ty: ElementType) -> NodeData {
        let kind = ty
            .constructor()
            .map(|construct| construct(ty, None))
            .or_else(|| self.override_.as_ref()?.create_composite(ty))
            .unwrap_or(match ty.kind() {
                ElementKind::CodeFragment => NodeKind::CodeFragment,
                _ => NodeKind::Composite,
            });
        NodeData::new(ty, kind)
    }

    pub fn create_leaf(&self, ty: ElementType, text: &str) -> NodeData {
        let kind = ty
            .constructor()
            .map(|construct| construct(ty, Some(text)))
            .or_else(|| self.override_.as_ref()?.create_leaf(ty, text))
            .unwrap_or_else(|| self.default_leaf(ty, text));
        NodeData::new(ty, kind)
    }

    /// Create an unexpanded chameleon holding `text`.
    pub fn create_lazy(&self, ty: ElementType, text: &str) -> NodeData {
        let kind = ty
            .constructor()
            .map(|construct| construct(ty, Some(text)))
            .unwrap_or_else(|| NodeKind::Lazy {
                text: Some(Arc::from(text)),
            });
        NodeData::new(ty, kind)
    }

    /// Whitespace produced by the tree itself rather than by a parser.
    pub fn create_whitespace(&self, text: &str) -> NodeData {
        NodeData::new(
            self.whitespace_type,
            NodeKind::Whitespace {
                text: self.whitespace.intern(text),
                generated: true,
            },
        )
    }

    fn default_leaf(&self, ty: ElementType, text: &str) -> NodeKind {
        match ty.kind() {
            ElementKind::Whitespace => NodeKind::Whitespace {
                text: self.whitespace.intern(text),
                generated: false,
            },
            ElementKind::Lazy => NodeKind::Lazy {
                text: Some(Arc::from(text)),
            },
            _ => NodeKind::Leaf {
                text: Arc::from(text),
            },
        }
    }
}
