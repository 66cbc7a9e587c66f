//! Node payloads and per-node user data.

use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use text_size::TextSize;

use super::NodeId;
use crate::base::ElementType;
use crate::core::IStr;

/// What a node is, independent of its element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Interior node; its text is the concatenation of its children.
    Composite,
    /// Synthetic holder for a detached code fragment.
    CodeFragment,
    /// Token leaf.
    Leaf { text: IStr },
    /// Whitespace leaf. `generated` marks whitespace produced by the factory
    /// rather than by the parser; formatting collaborators may rewrite it.
    Whitespace { text: IStr, generated: bool },
    /// Lazily-parsed chameleon. `text` is `Some` until the region is expanded,
    /// after which the node behaves like a composite.
    Lazy { text: Option<IStr> },
}

impl NodeKind {
    pub fn leaf_text(&self) -> Option<&str> {
        match self {
            Self::Leaf { text } | Self::Whitespace { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Unexpanded chameleon text.
    pub fn lazy_text(&self) -> Option<&str> {
        match self {
            Self::Lazy { text } => text.as_deref(),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. } | Self::Whitespace { .. })
    }

    pub fn is_unexpanded(&self) -> bool {
        matches!(self, Self::Lazy { text: Some(_) })
    }

    /// Whether children can be spliced into this node directly.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Composite | Self::CodeFragment)
    }

    fn own_len(&self) -> TextSize {
        let text = match self {
            Self::Leaf { text } | Self::Whitespace { text, .. } => text,
            Self::Lazy { text: Some(text) } => text,
            _ => return TextSize::new(0),
        };
        TextSize::of(&**text)
    }
}

/// One node of the concrete syntax tree.
pub struct NodeData {
    pub(crate) ty: ElementType,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) text_len: TextSize,
    pub(crate) user_data: UserData,
    pub(crate) creation_trace: Option<Box<Backtrace>>,
}

impl NodeData {
    pub fn new(ty: ElementType, kind: NodeKind) -> Self {
        let text_len = kind.own_len();
        Self {
            ty,
            kind,
            parent: None,
            children: Vec::new(),
            text_len,
            user_data: UserData::default(),
            creation_trace: None,
        }
    }

    pub fn ty(&self) -> ElementType {
        self.ty
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn text_len(&self) -> TextSize {
        self.text_len
    }

    pub fn user_data(&self) -> &UserData {
        &self.user_data
    }

    pub fn user_data_mut(&mut self) -> &mut UserData {
        &mut self.user_data
    }

    pub fn creation_trace(&self) -> Option<&Backtrace> {
        self.creation_trace.as_deref()
    }
}

impl fmt::Debug for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeData")
            .field("ty", &self.ty)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .field("text_len", &self.text_len)
            .finish_non_exhaustive()
    }
}

/// Typed key into a node's [`UserData`].
///
/// Copyable entries survive the change-tracking copy; the others stay with the
/// original node.
pub struct Key<T> {
    name: &'static str,
    copyable: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            copyable: false,
            _marker: PhantomData,
        }
    }

    pub const fn copyable(name: &'static str) -> Self {
        Self {
            name,
            copyable: true,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Clone)]
struct UserEntry {
    copyable: bool,
    value: Arc<dyn Any + Send + Sync>,
}

/// Small heterogeneous map attached to a node.
#[derive(Clone, Default)]
pub struct UserData {
    entries: FxHashMap<&'static str, UserEntry>,
}

impl UserData {
    pub fn get<T: Any + Send + Sync>(&self, key: &Key<T>) -> Option<&T> {
        self.entries.get(key.name)?.value.downcast_ref()
    }

    pub fn put<T: Any + Send + Sync>(&mut self, key: &Key<T>, value: T) {
        self.entries.insert(
            key.name,
            UserEntry {
                copyable: key.copyable,
                value: Arc::new(value),
            },
        );
    }

    pub fn remove<T: Any + Send + Sync>(&mut self, key: &Key<T>) -> Option<Arc<T>> {
        let entry = self.entries.remove(key.name)?;
        entry.value.downcast().ok()
    }

    pub fn contains<T>(&self, key: &Key<T>) -> bool {
        self.entries.contains_key(key.name)
    }

    /// The entries that travel with a copy of the node.
    pub fn copyable(&self) -> UserData {
        UserData {
            entries: self
                .entries
                .iter()
                .filter(|(_, entry)| entry.copyable)
                .map(|(name, entry)| (*name, entry.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
