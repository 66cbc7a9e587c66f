//! Element type tags.
//!
//! Every node and stub carries an [`ElementType`]: a pointer to a `static`
//! [`ElementTypeDef`] describing what kind of node the type produces, which
//! language it belongs to and whether it is a declaration boundary that gets a
//! stub.

use std::fmt;

use super::Language;
use crate::tree::NodeKind;

/// Self-describing node construction hook.
///
/// Receives the element type and the token text (`None` for composites).
pub type NodeConstructor = fn(ElementType, Option<&str>) -> NodeKind;

/// What kind of node an element type produces by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Interior node with children.
    Composite,
    /// Token leaf.
    Leaf,
    /// Whitespace leaf (interned).
    Whitespace,
    /// Comment leaf.
    Comment,
    /// Lazily-parsed chameleon region.
    Lazy,
    /// The root node of a file.
    File,
    /// Synthetic holder for a detached code fragment.
    CodeFragment,
}

impl ElementKind {
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::Leaf | Self::Whitespace | Self::Comment)
    }

    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }
}

/// Static definition behind an [`ElementType`].
pub struct ElementTypeDef {
    name: &'static str,
    raw: u16,
    language: &'static Language,
    kind: ElementKind,
    stubbed: bool,
    constructor: Option<NodeConstructor>,
}

impl ElementTypeDef {
    pub const fn new(
        name: &'static str,
        raw: u16,
        language: &'static Language,
        kind: ElementKind,
    ) -> Self {
        Self {
            name,
            raw,
            language,
            kind,
            stubbed: false,
            constructor: None,
        }
    }

    /// Mark this type as a declaration boundary that is summarized by a stub.
    pub const fn stubbed(mut self) -> Self {
        self.stubbed = true;
        self
    }

    /// Let the type construct its own nodes, bypassing the factory.
    pub const fn with_constructor(mut self, constructor: NodeConstructor) -> Self {
        self.constructor = Some(constructor);
        self
    }
}

/// Cheap, copyable handle to a static [`ElementTypeDef`].
///
/// Two element types are equal iff they point at the same definition.
#[derive(Clone, Copy)]
pub struct ElementType(&'static ElementTypeDef);

impl ElementType {
    pub const fn new(def: &'static ElementTypeDef) -> Self {
        Self(def)
    }

    pub fn name(self) -> &'static str {
        self.0.name
    }

    /// The raw kind used in rowan green trees.
    pub fn raw(self) -> rowan::SyntaxKind {
        rowan::SyntaxKind(self.0.raw)
    }

    pub fn language(self) -> &'static Language {
        self.0.language
    }

    pub fn kind(self) -> ElementKind {
        self.0.kind
    }

    pub fn is_stubbed(self) -> bool {
        self.0.stubbed
    }

    pub fn constructor(self) -> Option<NodeConstructor> {
        self.0.constructor
    }
}

impl From<&'static ElementTypeDef> for ElementType {
    fn from(def: &'static ElementTypeDef) -> Self {
        Self(def)
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for ElementType {}

impl std::hash::Hash for ElementType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.0, state);
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.language.id(), self.0.name)
    }
}
