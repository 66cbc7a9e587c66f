//! # stubtree-base
//!
//! Dual-representation syntax trees: every file can be answered from a compact
//! stub tree (declarations only, built by an indexer) or from the full mutable
//! node tree, and element handles move from the first to the second on demand
//! without changing identity.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! parser    → Sketch: a small reference language (lexer, parser, stubs, typed wrappers)
//!   ↓
//! file      → File views, parser definitions, file anchors, the manager
//!   ↓
//! psi       → Element handles: promotion, navigation, structural edits
//!   ↓
//! stubs     → Immutable stub trees and their builder
//!   ↓
//! tree      → Mutable node arena, node factory, copy utility, dumps
//!   ↓
//! core      → Errors, read/write access tokens, options, interning
//!   ↓
//! base      → Languages, element types, token sets
//! ```
//!
//! ## Example
//!
//! ```
//! use stubtree::file::{FileView, PsiManager};
//! use stubtree::parser::{ClassDecl, SKETCH, SketchParserDefinition};
//! use stubtree::psi::PsiNode;
//!
//! let manager = PsiManager::new(SketchParserDefinition::registry());
//! let view = FileView::new("a.sk", "class Foo { fun bar() { } }", &SKETCH);
//! let access = manager.read();
//! let stubs = manager.index(&view, &SKETCH, &access).unwrap();
//! let anchor = manager.open_indexed(view, &SKETCH, stubs).unwrap();
//!
//! let file = anchor.file_element();
//! let class = file
//!     .stub_or_psi_children(&access, stubtree::parser::SyntaxKind::CLASS.element_type())
//!     .unwrap()
//!     .into_iter()
//!     .find_map(ClassDecl::cast)
//!     .unwrap();
//! assert_eq!(class.name(&access).unwrap().as_deref(), Some("Foo"));
//! assert!(!anchor.is_tree_loaded());
//! ```

// ============================================================================
// MODULES (dependency order: base → core → tree → stubs → psi → file → parser)
// ============================================================================

/// Foundation types: languages, element types, token sets
pub mod base;

/// Errors, access tokens, diagnostics options
pub mod core;

/// Mutable node tree
pub mod tree;

/// Stub trees
pub mod stubs;

/// Element handles over stubs and nodes
pub mod psi;

/// File views, anchors and the manager
pub mod file;

/// Sketch reference language
pub mod parser;

// Re-export foundation types
pub use base::{ElementKind, ElementType, ElementTypeDef, Language, TextRange, TextSize, TokenSet};
pub use crate::core::{ModelLock, ReadAccess, Result, TreeError, TreeOptions, WriteAccess};
pub use file::{FileAnchor, FileView, ParserDefinition, PsiManager};
pub use psi::{PsiElement, PsiNode};
