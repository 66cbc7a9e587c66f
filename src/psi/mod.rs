//! Element handles over the stub tree and the node tree.
//!
//! A [`PsiElement`] is a stable handle to one syntactic element of a file. It
//! starts out either answered by a stub (unbound) or bound to a node, and an
//! unbound element is promoted to a bound one the first time it is asked
//! something the stub cannot answer. The handle itself never changes, so
//! elements can be cached across promotion.
//!
//! ## Modules
//!
//! - `promotion` - stub to node binding, containing-file lookup, validity
//! - `navigation` - read-only tree queries
//! - `mutation` - structural edits

mod mutation;
mod navigation;
mod promotion;
mod table;


use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::base::ElementType;
use crate::core::{Result, TreeError};
use crate::file::FileAnchor;
use crate::stubs::StubId;
use crate::tree::NodeId;

pub use table::{ElementId, ElementState};
pub(crate) use table::ElementTable;

/// Handle to one element of a file.
///
/// Equality is identity: same file anchor, same element slot.
#[derive(Clone)]
pub struct PsiElement {
    file: Arc<FileAnchor>,
    id: ElementId,
    ty: ElementType,
}

impl PsiElement {
    pub(crate) fn new(file: Arc<FileAnchor>, id: ElementId, ty: ElementType) -> Self {
        Self { file, id, ty }
    }

    pub(crate) fn for_node(file: &Arc<FileAnchor>, node: NodeId, ty: ElementType) -> Self {
        let id = file.elements.lock().for_node(node, ty);
        Self::new(Arc::clone(file), id, ty)
    }

    pub(crate) fn for_stub(file: &Arc<FileAnchor>, stub: StubId, ty: ElementType) -> Self {
        let id = file.elements.lock().for_stub(stub, ty);
        Self::new(Arc::clone(file), id, ty)
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// The anchor of the file this element belongs to.
    pub fn anchor(&self) -> &Arc<FileAnchor> {
        &self.file
    }

    /// Answered from the handle itself; never promotes.
    pub fn element_type(&self) -> ElementType {
        self.ty
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state(), Ok(ElementState::Bound(_)))
    }

    pub fn is_file(&self) -> bool {
        self.id == ElementId::FILE
    }

    pub fn state(&self) -> Result<ElementState> {
        self.file
            .elements
            .lock()
            .state(self.id)
            .ok_or_else(|| {
                if self.file.is_valid() {
                    TreeError::invalid(format!("{:?} was removed from its tree", self.ty))
                } else {
                    self.file.invalid_error()
                }
            })
    }
}

impl PartialEq for PsiElement {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.file, &other.file) && self.id == other.id
    }
}

impl Eq for PsiElement {}

impl Hash for PsiElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.file).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for PsiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} in {})", self.ty, self.id, self.file.view().name())
    }
}

/// Typed view of a [`PsiElement`] of particular element types.
pub trait PsiNode: Sized {
    fn can_cast(ty: ElementType) -> bool;
    fn cast(element: PsiElement) -> Option<Self>;
    fn element(&self) -> &PsiElement;
}

/// Declare a `PsiNode` wrapper for one element type.
macro_rules! psi_node {
    ($name:ident, $ty:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name($crate::psi::PsiElement);

        impl $crate::psi::PsiNode for $name {
            fn can_cast(ty: $crate::base::ElementType) -> bool {
                ty == $ty
            }

            fn cast(element: $crate::psi::PsiElement) -> Option<Self> {
                if Self::can_cast(element.element_type()) {
                    Some(Self(element))
                } else {
                    None
                }
            }

            fn element(&self) -> &$crate::psi::PsiElement {
                &self.0
            }
        }
    };
}

pub(crate) use psi_node;
