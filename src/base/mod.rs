//! Foundation types for the stub/AST core.
//!
//! This module provides the tags every other layer is keyed on:
//! - [`Language`] - language identity and dialect chains
//! - [`ElementType`], [`ElementTypeDef`], [`ElementKind`] - node/stub type tags
//! - [`TokenSet`] - sets of element types used as child filters
//! - [`TextRange`], [`TextSize`] - byte offsets (re-exported from `text-size`)

mod element_type;
mod language;
mod token_set;

pub use element_type::{ElementKind, ElementType, ElementTypeDef, NodeConstructor};
pub use language::Language;
pub use token_set::TokenSet;

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
