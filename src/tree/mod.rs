//! Mutable concrete syntax tree.
//!
//! A file's nodes live in a [`NodeArena`]. Parsed rowan green trees are loaded
//! into it through the [`NodeFactory`], which decides per element type whether a
//! node is a composite, a token leaf, interned whitespace or a lazily-parsed
//! chameleon. Structural edits splice child lists directly and keep cached text
//! lengths of all ancestors in sync.

mod arena;
pub mod copy;
mod dump;
mod factory;
mod loader;
mod node;


pub use arena::{Descendants, NodeArena, NodeId};
pub use copy::{CopiedNode, CopySource, FormattingHint};
pub use dump::{dump_creation_traces, dump_tree};
pub use factory::{FactoryOverride, NodeFactory};
pub use loader::{load_children, load_root};
pub use node::{Key, NodeData, NodeKind, UserData};
