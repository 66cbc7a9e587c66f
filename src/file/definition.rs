//! Parser definitions and the registry that resolves them per language.

use std::sync::Arc;

use rowan::GreenNode;
use rustc_hash::FxHashMap;

use crate::base::{ElementType, Language, TokenSet};
use crate::core::{ReadAccess, Result};
use crate::stubs::StubData;
use crate::tree::{FactoryOverride, NodeArena, NodeId};

/// Everything the core needs to know about one language's syntax.
pub trait ParserDefinition: Send + Sync {
    fn language(&self) -> &'static Language;

    /// Element type of the root node every parse produces.
    fn file_node_type(&self) -> ElementType;

    /// Element type used for whitespace created by the tree itself.
    fn whitespace_type(&self) -> ElementType;

    fn whitespace_tokens(&self) -> &TokenSet;

    fn comment_tokens(&self) -> &TokenSet;

    /// Map a raw rowan kind produced by this parser to its element type.
    ///
    /// Unknown kinds map to the language's error type.
    fn element_type(&self, raw: rowan::SyntaxKind) -> ElementType;

    /// Parse a whole file. The root of the result has `file_node_type()`.
    fn parse(&self, text: &str, access: &ReadAccess<'_>) -> Result<GreenNode>;

    /// Re-parse the text of a lazy chameleon. The children of the returned
    /// root must reproduce `text` exactly.
    fn parse_lazy(&self, ty: ElementType, text: &str) -> GreenNode;

    fn factory_override(&self) -> Option<Arc<dyn FactoryOverride>> {
        None
    }

    /// Summary data for a node of a stubbed type.
    fn create_stub(&self, arena: &NodeArena, node: NodeId) -> Option<StubData>;
}

/// Resolves a language to its parser definition.
pub trait ParserRegistry: Send + Sync {
    fn definition(&self, language: &Language) -> Option<Arc<dyn ParserDefinition>>;
}

/// Map-backed [`ParserRegistry`].
///
/// A dialect without its own definition resolves to its base language's.
#[derive(Default)]
pub struct LanguageRegistry {
    definitions: FxHashMap<&'static str, Arc<dyn ParserDefinition>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: Arc<dyn ParserDefinition>) {
        self.definitions.insert(definition.language().id(), definition);
    }

    pub fn with(mut self, definition: Arc<dyn ParserDefinition>) -> Self {
        self.register(definition);
        self
    }

    pub fn languages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.keys().copied()
    }
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.definitions.keys()).finish()
    }
}

impl ParserRegistry for LanguageRegistry {
    fn definition(&self, language: &Language) -> Option<Arc<dyn ParserDefinition>> {
        let mut current = Some(language);
        while let Some(language) = current {
            if let Some(definition) = self.definitions.get(language.id()) {
                return Some(Arc::clone(definition));
            }
            current = language.base();
        }
        None
    }
}
