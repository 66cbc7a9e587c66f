//! Syntax kinds of the Sketch language
//!
//! Every kind is both a raw rowan kind (for the green trees the parser builds)
//! and an [`ElementType`] (for the node and stub trees).

use crate::base::{ElementKind, ElementType, ElementTypeDef, Language};

/// The Sketch language.
pub static SKETCH: Language = Language::new("Sketch");

macro_rules! syntax_kinds {
    ($($kind:ident => $element:ident $(+ $flag:ident)?),* $(,)?) => {
        /// All syntax kinds (tokens and nodes) in Sketch
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        #[allow(non_camel_case_types)]
        pub enum SyntaxKind {
            $($kind,)*
            #[doc(hidden)]
            __LAST,
        }

        static ELEMENT_TYPES: [ElementTypeDef; SyntaxKind::__LAST as usize] = [
            $(syntax_kinds!(@def $kind, $element $(, $flag)?),)*
        ];

        const ALL: [SyntaxKind; SyntaxKind::__LAST as usize] = [$(SyntaxKind::$kind,)*];
    };
    (@def $kind:ident, $element:ident) => {
        ElementTypeDef::new(stringify!($kind), SyntaxKind::$kind as u16, &SKETCH, ElementKind::$element)
    };
    (@def $kind:ident, $element:ident, stubbed) => {
        ElementTypeDef::new(stringify!($kind), SyntaxKind::$kind as u16, &SKETCH, ElementKind::$element)
            .stubbed()
    };
}

syntax_kinds! {
    // Trivia
    WHITESPACE => Whitespace,
    LINE_COMMENT => Comment,

    // Literals
    IDENT => Leaf,
    NUMBER => Leaf,
    STRING => Leaf,
    OPERATOR => Leaf,

    // Keywords
    CLASS_KW => Leaf,
    FUN_KW => Leaf,
    VAL_KW => Leaf,

    // Punctuation
    L_BRACE => Leaf,
    R_BRACE => Leaf,
    L_PAREN => Leaf,
    R_PAREN => Leaf,
    SEMICOLON => Leaf,
    COMMA => Leaf,
    EQ => Leaf,

    // Function bodies, parsed on demand
    BLOCK => Lazy,

    // Nodes
    SOURCE_FILE => File + stubbed,
    CLASS => Composite + stubbed,
    FUN => Composite + stubbed,
    FIELD => Composite + stubbed,
    PARAM_LIST => Composite,
    PARAM => Composite,
    STATEMENT => Composite,
    ERROR => Composite,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT)
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, Self::CLASS_KW | Self::FUN_KW | Self::VAL_KW)
    }

    /// Keywords that start a declaration.
    pub fn starts_item(self) -> bool {
        self.is_keyword()
    }

    pub fn from_raw(raw: u16) -> Option<SyntaxKind> {
        ALL.get(raw as usize).copied()
    }

    /// The element type tagging nodes and stubs of this kind.
    pub fn element_type(self) -> ElementType {
        ElementType::new(&ELEMENT_TYPES[self as usize])
    }

    /// The kind behind a Sketch element type.
    pub fn from_element_type(ty: ElementType) -> Option<SyntaxKind> {
        if ty.language() != &SKETCH {
            return None;
        }
        Self::from_raw(ty.raw().0).filter(|kind| kind.element_type() == ty)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<SyntaxKind> for ElementType {
    fn from(kind: SyntaxKind) -> Self {
        kind.element_type()
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SketchLanguage {}

impl rowan::Language for SketchLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SyntaxKind::from_raw(raw.0).unwrap_or(SyntaxKind::ERROR)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<SketchLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<SketchLanguage>;
