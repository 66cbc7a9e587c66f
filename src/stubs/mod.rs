//! Immutable stub trees.
//!
//! A stub summarizes one declaration-level construct (its element type, its
//! name and a few ordered key/value fields) without any expression bodies. The
//! stub tree of a file mirrors the node tree restricted to nodes of stubbed
//! element types, so an index can answer declaration queries without parsing.
//!
//! Stub trees are never patched. A structural edit discards the whole tree.

mod builder;


use std::fmt::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::ElementType;

pub use builder::{StubTreeBuilder, declaration_children};

static NEXT_STAMP: AtomicU32 = AtomicU32::new(1);

/// Identifies a stub within one specific [`StubTree`].
///
/// The stamp distinguishes trees, so an id from a discarded tree never resolves
/// in its replacement.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StubId {
    stamp: u32,
    index: u32,
}

impl StubId {
    pub fn stamp(self) -> u32 {
        self.stamp
    }
}

impl fmt::Debug for StubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stub#{}@{}", self.index, self.stamp)
    }
}

/// Summary fields of one stub.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubData {
    pub name: Option<SmolStr>,
    pub fields: IndexMap<SmolStr, SmolStr>,
}

impl StubData {
    pub fn named(name: impl Into<SmolStr>) -> Self {
        Self {
            name: Some(name.into()),
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(SmolStr::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct Stub {
    ty: ElementType,
    parent: Option<StubId>,
    children: Vec<StubId>,
    data: StubData,
}

impl Stub {
    pub fn ty(&self) -> ElementType {
        self.ty
    }

    pub fn parent(&self) -> Option<StubId> {
        self.parent
    }

    pub fn children(&self) -> &[StubId] {
        &self.children
    }

    pub fn data(&self) -> &StubData {
        &self.data
    }

    pub fn name(&self) -> Option<&SmolStr> {
        self.data.name.as_ref()
    }
}

/// A file's stub tree. The first stub is the file stub.
#[derive(Debug, Clone)]
pub struct StubTree {
    stamp: u32,
    stubs: Vec<Stub>,
}

impl StubTree {
    fn with_root(ty: ElementType, data: StubData) -> Self {
        Self {
            stamp: NEXT_STAMP.fetch_add(1, Ordering::Relaxed),
            stubs: vec![Stub {
                ty,
                parent: None,
                children: Vec::new(),
                data,
            }],
        }
    }

    fn push(&mut self, parent: StubId, ty: ElementType, data: StubData) -> Option<StubId> {
        let id = StubId {
            stamp: self.stamp,
            index: self.stubs.len() as u32,
        };
        let slot = self.slot(parent)?;
        self.stubs.get_mut(slot)?.children.push(id);
        self.stubs.push(Stub {
            ty,
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        Some(id)
    }

    fn slot(&self, id: StubId) -> Option<usize> {
        (id.stamp == self.stamp).then_some(id.index as usize)
    }

    pub fn stamp(&self) -> u32 {
        self.stamp
    }

    pub fn root(&self) -> StubId {
        StubId {
            stamp: self.stamp,
            index: 0,
        }
    }

    /// Whether `id` was issued by this tree.
    pub fn owns(&self, id: StubId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: StubId) -> Option<&Stub> {
        self.stubs.get(self.slot(id)?)
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    pub fn children_of_type(&self, id: StubId, ty: ElementType) -> Vec<StubId> {
        self.get(id)
            .map(|stub| {
                stub.children
                    .iter()
                    .copied()
                    .filter(|child| self.get(*child).is_some_and(|c| c.ty == ty))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Indented dump, one stub per line with its name and fields.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(stub) = self.get(id) else { continue };
            let _ = write!(out, "{:indent$}{:?}", "", stub.ty, indent = depth * 2);
            if let Some(name) = &stub.data.name {
                let _ = write!(out, " {name:?}");
            }
            for (key, value) in &stub.data.fields {
                let _ = write!(out, " {key}={value}");
            }
            out.push('\n');
            for child in stub.children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }
}
