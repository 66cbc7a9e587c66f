//! Structural edits.
//!
//! Every edit checks that the file is writable before touching anything,
//! then splices child lists of the live node tree directly. Inserted nodes are
//! always copies made through the change-tracking copy utility; the returned
//! elements wrap those copies. An edit discards the file's stub tree.

use tracing::{debug, error};

use super::PsiElement;
use crate::core::{ConsistencyError, Result, TreeError, WriteAccess};
use crate::tree::{CopiedNode, NodeArena, NodeId, copy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Before,
    After,
}

impl PsiElement {
    /// Append a copy of `element` as the last child.
    pub fn add(&self, access: &WriteAccess<'_>, element: &PsiElement) -> Result<PsiElement> {
        self.insert_one(access, element, None, Side::After)
    }

    /// Insert a copy of `element` right before `anchor`, or as the first
    /// child without one.
    pub fn add_before(
        &self,
        access: &WriteAccess<'_>,
        element: &PsiElement,
        anchor: Option<&PsiElement>,
    ) -> Result<PsiElement> {
        self.insert_one(access, element, anchor, Side::Before)
    }

    /// Insert a copy of `element` right after `anchor`, or as the last child
    /// without one.
    pub fn add_after(
        &self,
        access: &WriteAccess<'_>,
        element: &PsiElement,
        anchor: Option<&PsiElement>,
    ) -> Result<PsiElement> {
        self.insert_one(access, element, anchor, Side::After)
    }

    /// Append copies of the sibling run `first..=last`, keeping their order.
    pub fn add_range(
        &self,
        access: &WriteAccess<'_>,
        first: &PsiElement,
        last: &PsiElement,
    ) -> Result<Vec<PsiElement>> {
        self.add_range_after(access, first, last, None)
    }

    pub fn add_range_before(
        &self,
        access: &WriteAccess<'_>,
        first: &PsiElement,
        last: &PsiElement,
        anchor: Option<&PsiElement>,
    ) -> Result<Vec<PsiElement>> {
        self.file.ensure_writable()?;
        let copies = snapshot_run(access, first, last)?;
        self.insert_copies(access, &copies, anchor, Side::Before)
    }

    pub fn add_range_after(
        &self,
        access: &WriteAccess<'_>,
        first: &PsiElement,
        last: &PsiElement,
        anchor: Option<&PsiElement>,
    ) -> Result<Vec<PsiElement>> {
        self.file.ensure_writable()?;
        let copies = snapshot_run(access, first, last)?;
        self.insert_copies(access, &copies, anchor, Side::After)
    }

    fn insert_one(
        &self,
        access: &WriteAccess<'_>,
        element: &PsiElement,
        anchor: Option<&PsiElement>,
        side: Side,
    ) -> Result<PsiElement> {
        self.file.ensure_writable()?;
        let copy = element.snapshot(access)?;
        let mut inserted = self.insert_copies(access, &[copy], anchor, side)?;
        inserted
            .pop()
            .ok_or_else(|| TreeError::unsupported("nothing was inserted"))
    }

    fn snapshot(&self, access: &WriteAccess<'_>) -> Result<CopiedNode> {
        let node = self.node(access)?;
        self.with_arena(|arena| copy::snapshot(arena, node))
    }

    fn insert_copies(
        &self,
        access: &WriteAccess<'_>,
        copies: &[CopiedNode],
        anchor: Option<&PsiElement>,
        side: Side,
    ) -> Result<Vec<PsiElement>> {
        let parent = self.expanded_node(access)?;
        let anchor = match anchor {
            Some(anchor) if !std::sync::Arc::ptr_eq(&anchor.file, &self.file) => {
                return Err(TreeError::unsupported(format!(
                    "anchor {anchor:?} belongs to another file"
                )));
            }
            Some(anchor) => Some(anchor.node(access)?),
            None => None,
        };

        let mut tree = self.file.tree.write();
        let arena = tree.as_mut().ok_or_else(|| self.file.tree_not_loaded())?;
        if arena.kind(parent)?.is_leaf() {
            return Err(TreeError::unsupported(format!(
                "cannot add children to leaf {:?}",
                self.ty
            )));
        }
        let index = match (anchor, side) {
            (None, Side::Before) => 0,
            (None, Side::After) => arena.children(parent)?.len(),
            (Some(anchor), side) => {
                if arena.parent(anchor)? != Some(parent) {
                    return Err(TreeError::unsupported(format!(
                        "anchor is not a child of {:?}",
                        self.ty
                    )));
                }
                let index = arena
                    .index_in_parent(anchor)?
                    .ok_or_else(|| TreeError::invalid("anchor was removed from its tree"))?;
                if side == Side::Before { index } else { index + 1 }
            }
        };
        self.subtree_changed(access);

        let mut nodes = Vec::with_capacity(copies.len());
        for source in copies {
            let node = copy::instantiate(arena, self.file.factory(), source)?;
            copy::encode(arena, node, source)?;
            nodes.push(node);
        }
        arena.insert_children(parent, index, &nodes)?;
        for node in &nodes {
            if let Some(hint) = copy::decode(arena, *node)? {
                self.file.push_formatting_hint(hint);
            }
        }
        debug!(parent = ?self, index, count = nodes.len(), ?side, "inserted copies");
        nodes.iter().map(|node| self.wrap(arena, *node)).collect()
    }

    /// Remove this element's node from its parent.
    pub fn delete(&self, access: &WriteAccess<'_>) -> Result<()> {
        self.file.ensure_writable()?;
        let node = self.node(access)?;

        let mut tree = self.file.tree.write();
        let arena = tree.as_mut().ok_or_else(|| self.file.tree_not_loaded())?;
        let parent = arena.parent(node)?.ok_or_else(|| {
            TreeError::unsupported(format!("cannot delete {:?} under null", self.ty))
        })?;
        if !arena.kind(parent)?.is_structural() {
            return Err(TreeError::unsupported(format!(
                "cannot delete {:?} under {:?}",
                self.ty,
                arena.ty(parent)?
            )));
        }
        let index = arena
            .index_in_parent(node)?
            .ok_or_else(|| TreeError::invalid("element was removed from its tree"))?;
        self.subtree_changed(access);
        let removed = arena.detach_children(parent, index..=index)?;
        self.release(arena, removed)?;
        debug!(element = ?self, "deleted element");
        Ok(())
    }

    /// Remove the children `first..=last` of this element.
    ///
    /// Both endpoints must be children of this element; otherwise nothing is
    /// removed and a consistency error is returned.
    pub fn delete_child_range(
        &self,
        access: &WriteAccess<'_>,
        first: &PsiElement,
        last: &PsiElement,
    ) -> Result<()> {
        self.file.ensure_writable()?;
        let parent = self.node(access)?;
        let first_node = first.node(access)?;
        let last_node = last.node(access)?;

        {
            let tree = self.file.tree.read();
            let arena = tree.as_ref().ok_or_else(|| self.file.tree_not_loaded())?;
            let first_parent = first.parent_in(arena, first_node, self)?;
            let last_parent = last.parent_in(arena, last_node, self)?;
            if first_parent != Some(parent) || last_parent != Some(parent) {
                let err = ConsistencyError::MismatchedParents {
                    first: first.ty.name(),
                    first_parent: describe(arena, first_parent),
                    last: last.ty.name(),
                    last_parent: describe(arena, last_parent),
                    expected: describe(arena, Some(parent)),
                };
                error!(parent = ?self, %err, "child range does not belong to parent");
                return Err(err.into());
            }
        }

        let mut tree = self.file.tree.write();
        let arena = tree.as_mut().ok_or_else(|| self.file.tree_not_loaded())?;
        if !arena.kind(parent)?.is_structural() {
            return Err(TreeError::unsupported(format!(
                "cannot delete children of {:?}",
                self.ty
            )));
        }
        let (start, end) = run_bounds(arena, first_node, last_node)?;
        self.subtree_changed(access);
        let removed = arena.detach_children(parent, start..=end)?;
        debug!(parent = ?self, count = removed.len(), "deleted child range");
        self.release(arena, removed)
    }

    /// Replace this element with a copy of `replacement`. Returns the copy.
    pub fn replace(&self, access: &WriteAccess<'_>, replacement: &PsiElement) -> Result<PsiElement> {
        self.file.ensure_writable()?;
        let source = replacement.snapshot(access)?;
        let node = self.node(access)?;

        let mut tree = self.file.tree.write();
        let arena = tree.as_mut().ok_or_else(|| self.file.tree_not_loaded())?;
        let parent = arena.parent(node)?.ok_or_else(|| {
            TreeError::unsupported(format!("cannot replace {:?} without a parent", self.ty))
        })?;
        self.subtree_changed(access);
        let removed: Vec<NodeId> = arena.descendants(node).collect();
        let copy = copy::instantiate(arena, self.file.factory(), &source)?;
        copy::encode(arena, copy, &source)?;
        if arena.kind(parent)?.is_structural() {
            arena.replace_child(node, copy)?;
        } else {
            // Expanded chameleons splice by index.
            let index = arena
                .index_in_parent(node)?
                .ok_or_else(|| TreeError::invalid("element was removed from its tree"))?;
            let detached = arena.detach_children(parent, index..=index)?;
            arena.insert_children(parent, index, &[copy])?;
            for old in detached {
                arena.free_subtree(old)?;
            }
        }
        self.file.elements.lock().forget_nodes(removed);
        if let Some(hint) = copy::decode(arena, copy)? {
            self.file.push_formatting_hint(hint);
        }
        debug!(element = ?self, "replaced element");
        self.wrap(arena, copy)
    }

    /// Parent of `node` if the element lives in the same file as `owner`.
    fn parent_in(&self, arena: &NodeArena, node: NodeId, owner: &PsiElement) -> Result<Option<NodeId>> {
        if !std::sync::Arc::ptr_eq(&self.file, &owner.file) {
            return Ok(None);
        }
        arena.parent(node)
    }

    /// Free detached subtrees and forget their elements.
    fn release(&self, arena: &mut NodeArena, detached: Vec<NodeId>) -> Result<()> {
        let mut removed = Vec::new();
        for node in &detached {
            removed.extend(arena.descendants(*node));
        }
        for node in detached {
            arena.free_subtree(node)?;
        }
        self.file.elements.lock().forget_nodes(removed);
        Ok(())
    }
}

/// Snapshot the siblings `first..=last`, in order.
fn snapshot_run(access: &WriteAccess<'_>, first: &PsiElement, last: &PsiElement) -> Result<Vec<CopiedNode>> {
    let first_node = first.node(access)?;
    let last_node = last.node(access)?;
    first.with_arena(|arena| {
        let first_parent = arena.parent(first_node)?;
        let last_parent = last.parent_in(arena, last_node, first)?;
        let Some(parent) = first_parent.filter(|_| first_parent == last_parent) else {
            let err = ConsistencyError::MismatchedParents {
                first: first.ty.name(),
                first_parent: describe(arena, first_parent),
                last: last.ty.name(),
                last_parent: describe(arena, last_parent),
                expected: describe(arena, first_parent),
            };
            error!(%err, "copied range is not a sibling run");
            return Err(err.into());
        };
        let (start, end) = run_bounds(arena, first_node, last_node)?;
        arena.children(parent)?[start..=end]
            .iter()
            .map(|node| copy::snapshot(arena, *node))
            .collect()
    })
}

/// Indices of `first` and `last` within their common parent.
fn run_bounds(arena: &NodeArena, first: NodeId, last: NodeId) -> Result<(usize, usize)> {
    let start = arena
        .index_in_parent(first)?
        .ok_or_else(|| TreeError::invalid("range start was removed from its tree"))?;
    let end = arena
        .index_in_parent(last)?
        .ok_or_else(|| TreeError::invalid("range end was removed from its tree"))?;
    if start > end {
        return Err(TreeError::unsupported(format!(
            "range end precedes its start ({end} < {start})"
        )));
    }
    Ok((start, end))
}

fn describe(arena: &NodeArena, node: Option<NodeId>) -> String {
    match node {
        None => "<none>".to_string(),
        Some(node) => match (arena.ty(node), arena.text_range(node)) {
            (Ok(ty), Ok(range)) => format!("{ty:?}@{range:?}"),
            _ => format!("{node:?}"),
        },
    }
}
