//! Generational arena owning every node of one file's tree.
//!
//! The arena is the sole owner of node storage. Parents own their children
//! through ordered id lists; children point back with a non-owning parent id.
//! Freed slots bump their generation, so stale [`NodeId`]s are detected on
//! every access instead of aliasing a new node.

use std::backtrace::Backtrace;
use std::fmt;
use std::ops::RangeInclusive;

use text_size::{TextRange, TextSize};

use super::{NodeData, NodeKind};
use crate::base::ElementType;
use crate::core::{Result, TreeError};

/// Index of a node plus the generation of the slot it was allocated in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// Node storage for one tree.
pub struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: Option<NodeId>,
    creation_traces: bool,
}

impl fmt::Debug for NodeArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeArena")
            .field("live", &self.len())
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

fn stale(id: NodeId) -> TreeError {
    TreeError::invalid(format!("node {id:?} was removed from its tree"))
}

impl NodeArena {
    pub fn new(creation_traces: bool) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            creation_traces,
        }
    }

    /// Store a detached node and return its id.
    pub fn alloc(&mut self, mut data: NodeData) -> NodeId {
        if self.creation_traces {
            data.creation_trace = Some(Box::new(Backtrace::force_capture()));
        }
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                data: Some(data),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Result<NodeId> {
        self.root
            .ok_or_else(|| TreeError::invalid("node tree has no root"))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.data.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    pub fn get(&self, id: NodeId) -> Result<&NodeData> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
            .ok_or_else(|| stale(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
            .ok_or_else(|| stale(id))
    }

    pub fn ty(&self, id: NodeId) -> Result<ElementType> {
        Ok(self.get(id)?.ty)
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind> {
        Ok(&self.get(id)?.kind)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(id)?.children)
    }

    pub fn text_len(&self, id: NodeId) -> Result<TextSize> {
        Ok(self.get(id)?.text_len)
    }

    /// Whether the node is reachable from the root through parent links.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let mut current = id;
        loop {
            if current == root {
                return true;
            }
            match self.get(current).map(|node| node.parent) {
                Ok(Some(parent)) => current = parent,
                _ => return false,
            }
        }
    }

    pub fn index_in_parent(&self, id: NodeId) -> Result<Option<usize>> {
        let Some(parent) = self.parent(id)? else {
            return Ok(None);
        };
        Ok(self.children(parent)?.iter().position(|child| *child == id))
    }

    pub fn first_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.children(id)?.first().copied())
    }

    pub fn last_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.children(id)?.last().copied())
    }

    pub fn next_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.sibling(id, 1)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.sibling(id, -1)
    }

    fn sibling(&self, id: NodeId, step: isize) -> Result<Option<NodeId>> {
        let Some(parent) = self.parent(id)? else {
            return Ok(None);
        };
        let siblings = self.children(parent)?;
        let Some(index) = siblings.iter().position(|child| *child == id) else {
            return Ok(None);
        };
        Ok(index
            .checked_add_signed(step)
            .and_then(|target| siblings.get(target))
            .copied())
    }

    /// Offset of the node within its parent.
    pub fn start_offset_in_parent(&self, id: NodeId) -> Result<TextSize> {
        let Some(parent) = self.parent(id)? else {
            return Ok(TextSize::new(0));
        };
        let mut offset = TextSize::new(0);
        for sibling in self.children(parent)? {
            if *sibling == id {
                break;
            }
            offset += self.text_len(*sibling)?;
        }
        Ok(offset)
    }

    /// Absolute offset, derived from the lengths of earlier siblings.
    pub fn start_offset(&self, id: NodeId) -> Result<TextSize> {
        let mut offset = TextSize::new(0);
        let mut current = id;
        while let Some(parent) = self.parent(current)? {
            offset += self.start_offset_in_parent(current)?;
            current = parent;
        }
        Ok(offset)
    }

    pub fn text_range(&self, id: NodeId) -> Result<TextRange> {
        Ok(TextRange::at(self.start_offset(id)?, self.text_len(id)?))
    }

    pub fn text(&self, id: NodeId) -> Result<String> {
        let mut text = String::with_capacity(u32::from(self.text_len(id)?) as usize);
        self.push_text(id, &mut text)?;
        Ok(text)
    }

    fn push_text(&self, id: NodeId, out: &mut String) -> Result<()> {
        let node = self.get(id)?;
        if let Some(text) = node.kind.leaf_text().or(node.kind.lazy_text()) {
            out.push_str(text);
            return Ok(());
        }
        for child in &node.children {
            self.push_text(*child, out)?;
        }
        Ok(())
    }

    /// Pre-order walk of the subtree rooted at `id` (inclusive).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            arena: self,
            stack: vec![id],
        }
    }

    /// Deepest node whose range contains `offset`, relative to `id`'s start.
    pub fn find_leaf_at(&self, id: NodeId, offset: TextSize) -> Result<Option<NodeId>> {
        if offset >= self.text_len(id)? {
            return Ok(None);
        }
        let mut current = id;
        let mut local = offset;
        'descend: loop {
            let mut start = TextSize::new(0);
            for child in self.children(current)? {
                let len = self.text_len(*child)?;
                if local < start + len {
                    current = *child;
                    local -= start;
                    continue 'descend;
                }
                start += len;
            }
            return Ok(Some(current));
        }
    }

    /// Insert detached nodes as children of `parent` at `index`.
    pub fn insert_children(&mut self, parent: NodeId, index: usize, nodes: &[NodeId]) -> Result<()> {
        let mut added = TextSize::new(0);
        for node in nodes {
            let data = self.get(*node)?;
            if data.parent.is_some() {
                return Err(TreeError::unsupported(format!(
                    "node {node:?} is already attached"
                )));
            }
            added += data.text_len;
        }
        let len = self.children(parent)?.len();
        if index > len {
            return Err(TreeError::unsupported(format!(
                "insertion index {index} is out of bounds for {len} children"
            )));
        }
        for node in nodes {
            self.get_mut(*node)?.parent = Some(parent);
        }
        let children = &mut self.get_mut(parent)?.children;
        children.splice(index..index, nodes.iter().copied());
        self.resize(parent, added, TextSize::new(0))
    }

    /// Detach the children of `parent` at `range`, returning them in order.
    ///
    /// The detached subtrees stay allocated until [`NodeArena::free_subtree`].
    pub fn detach_children(
        &mut self,
        parent: NodeId,
        range: RangeInclusive<usize>,
    ) -> Result<Vec<NodeId>> {
        let len = self.children(parent)?.len();
        if range.is_empty() || *range.end() >= len {
            return Err(TreeError::unsupported(format!(
                "child range {range:?} is out of bounds for {len} children"
            )));
        }
        let removed: Vec<NodeId> = self.get_mut(parent)?.children.drain(range).collect();
        let mut removed_len = TextSize::new(0);
        for node in &removed {
            let data = self.get_mut(*node)?;
            data.parent = None;
            removed_len += data.text_len;
        }
        self.resize(parent, TextSize::new(0), removed_len)?;
        Ok(removed)
    }

    /// Replace child `old` of its parent with the detached node `new`, freeing
    /// `old`'s subtree.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let parent = self
            .parent(old)?
            .ok_or_else(|| TreeError::unsupported("cannot replace a node without a parent"))?;
        let index = self
            .index_in_parent(old)?
            .ok_or_else(|| stale(old))?;
        self.detach_children(parent, index..=index)?;
        self.insert_children(parent, index, &[new])?;
        self.free_subtree(old)
    }

    /// Give an unexpanded chameleon its parsed children.
    ///
    /// The children must reproduce the chameleon's text exactly.
    pub fn expand_lazy(&mut self, id: NodeId, children: &[NodeId]) -> Result<()> {
        let mut len = TextSize::new(0);
        for child in children {
            len += self.text_len(*child)?;
        }
        let node = self.get_mut(id)?;
        if !node.kind.is_unexpanded() {
            return Ok(());
        }
        if len != node.text_len {
            return Err(TreeError::unsupported(format!(
                "lazy reparse of {:?} produced {len:?} bytes, expected {:?}",
                node.ty, node.text_len
            )));
        }
        node.kind = NodeKind::Lazy { text: None };
        node.children.extend_from_slice(children);
        for child in children {
            self.get_mut(*child)?.parent = Some(id);
        }
        Ok(())
    }

    /// Release every slot of a detached subtree.
    pub fn free_subtree(&mut self, id: NodeId) -> Result<()> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index as usize)
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            if let Some(data) = slot.data.take() {
                stack.extend(data.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
        Ok(())
    }

    /// Apply a length change to `id` and all of its ancestors.
    fn resize(&mut self, id: NodeId, added: TextSize, removed: TextSize) -> Result<()> {
        let mut current = Some(id);
        while let Some(node) = current {
            let data = self.get_mut(node)?;
            data.text_len = data.text_len + added - removed;
            current = data.parent;
        }
        Ok(())
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    arena: &'a NodeArena,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Ok(children) = self.arena.children(id) {
            self.stack.extend(children.iter().rev().copied());
        }
        Some(id)
    }
}
