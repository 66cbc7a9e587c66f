//! Sketch: a small declaration language built on the core
//!
//! Sketch is the worked example of a [`ParserDefinition`](crate::file::ParserDefinition):
//! - **logos** for lexing
//! - **rowan** green trees as parser output
//! - lazily parsed function bodies
//! - stubs for classes, functions and fields
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → GreenNode tree (function bodies kept as BLOCK tokens)
//!     ↓
//! Node factory → mutable node tree; BLOCK tokens become lazy nodes
//!     ↓
//! Stub builder → CLASS / FUN / FIELD stubs
//!     ↓
//! Typed wrappers (SketchFile, ClassDecl, FunDecl, FieldDecl)
//! ```
//!
//! ```text
//! file    := item*
//! item    := class | fun | field
//! class   := 'class' IDENT '{' (fun | field)* '}'
//! fun     := 'fun' IDENT '(' (IDENT (',' IDENT)*)? ')' block
//! field   := 'val' IDENT ('=' expr)? ';'
//! ```

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
mod definition;
mod lexer;
mod syntax_kind;

#[cfg(test)]
mod tests;

pub use ast::{ClassDecl, FieldDecl, FunDecl, SketchFile};
pub use definition::{PARAMS_FIELD, SketchParserDefinition};
pub use lexer::{Lexer, Token, tokenize};
pub use parser::{Parse, SyntaxError, parse, parse_block};
pub use syntax_kind::{SKETCH, SketchLanguage, SyntaxKind, SyntaxNode, SyntaxToken};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
