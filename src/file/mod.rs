//! Files: content views, parser definitions and the anchors that root a
//! file's trees.

mod anchor;
mod definition;
mod manager;
mod view;


pub use anchor::FileAnchor;
pub use definition::{LanguageRegistry, ParserDefinition, ParserRegistry};
pub use manager::PsiManager;
pub use view::FileView;
