//! Read-only queries.
//!
//! `parent` and `stub_or_psi_children` are answered from the stub tree while
//! the element is unbound. Everything else needs the node and promotes.

use text_size::{TextRange, TextSize};
use tracing::error;

use super::{ElementState, PsiElement};
use crate::base::{ElementType, TokenSet};
use crate::core::{ConsistencyError, ReadAccess, Result};
use crate::stubs::Stub;
use crate::tree::{NodeArena, NodeId};

impl PsiElement {
    pub(super) fn with_arena<R>(&self, f: impl FnOnce(&NodeArena) -> Result<R>) -> Result<R> {
        let tree = self.file.tree.read();
        let arena = tree.as_ref().ok_or_else(|| self.file.tree_not_loaded())?;
        f(arena)
    }

    pub(super) fn wrap(&self, arena: &NodeArena, node: NodeId) -> Result<PsiElement> {
        Ok(PsiElement::for_node(&self.file, node, arena.ty(node)?))
    }

    fn wrap_all(&self, arena: &NodeArena, nodes: &[NodeId]) -> Result<Vec<PsiElement>> {
        nodes.iter().map(|node| self.wrap(arena, *node)).collect()
    }

    /// The node, with a lazy chameleon expanded so its children exist.
    pub(super) fn expanded_node(&self, access: &ReadAccess<'_>) -> Result<NodeId> {
        let node = self.node(access)?;
        self.file.expand_lazy(node, access)?;
        Ok(node)
    }

    pub fn parent(&self, access: &ReadAccess<'_>) -> Result<Option<PsiElement>> {
        access.check_canceled()?;
        match self.state()? {
            ElementState::Unbound(stub) => {
                let stubs = self.current_stubs(stub)?;
                let Some(parent) = stubs.get(stub).and_then(Stub::parent) else {
                    return Ok(None);
                };
                let ty = stubs
                    .get(parent)
                    .map(Stub::ty)
                    .ok_or_else(|| self.stale_stub_error())?;
                Ok(Some(PsiElement::for_stub(&self.file, parent, ty)))
            }
            ElementState::Bound(node) => {
                self.check_alive(node)?;
                self.with_arena(|arena| {
                    arena
                        .parent(node)?
                        .map(|parent| self.wrap(arena, parent))
                        .transpose()
                })
            }
        }
    }

    /// Children of type `ty`: stub children while unbound, node children once
    /// bound.
    pub fn stub_or_psi_children(&self, access: &ReadAccess<'_>, ty: ElementType) -> Result<Vec<PsiElement>> {
        access.check_canceled()?;
        match self.state()? {
            ElementState::Unbound(stub) => {
                let stubs = self.current_stubs(stub)?;
                Ok(stubs
                    .children_of_type(stub, ty)
                    .into_iter()
                    .map(|child| PsiElement::for_stub(&self.file, child, ty))
                    .collect())
            }
            ElementState::Bound(_) => self.find_children_by_type(access, ty),
        }
    }

    pub fn children(&self, access: &ReadAccess<'_>) -> Result<Vec<PsiElement>> {
        let node = self.expanded_node(access)?;
        self.with_arena(|arena| self.wrap_all(arena, arena.children(node)?))
    }

    pub fn first_child(&self, access: &ReadAccess<'_>) -> Result<Option<PsiElement>> {
        let node = self.expanded_node(access)?;
        self.with_arena(|arena| {
            arena
                .first_child(node)?
                .map(|child| self.wrap(arena, child))
                .transpose()
        })
    }

    pub fn last_child(&self, access: &ReadAccess<'_>) -> Result<Option<PsiElement>> {
        let node = self.expanded_node(access)?;
        self.with_arena(|arena| {
            arena
                .last_child(node)?
                .map(|child| self.wrap(arena, child))
                .transpose()
        })
    }

    pub fn next_sibling(&self, access: &ReadAccess<'_>) -> Result<Option<PsiElement>> {
        let node = self.node(access)?;
        self.with_arena(|arena| {
            arena
                .next_sibling(node)?
                .map(|sibling| self.wrap(arena, sibling))
                .transpose()
        })
    }

    pub fn prev_sibling(&self, access: &ReadAccess<'_>) -> Result<Option<PsiElement>> {
        let node = self.node(access)?;
        self.with_arena(|arena| {
            arena
                .prev_sibling(node)?
                .map(|sibling| self.wrap(arena, sibling))
                .transpose()
        })
    }

    pub fn text_range(&self, access: &ReadAccess<'_>) -> Result<TextRange> {
        let node = self.node(access)?;
        self.with_arena(|arena| arena.text_range(node))
    }

    pub fn start_offset(&self, access: &ReadAccess<'_>) -> Result<TextSize> {
        let node = self.node(access)?;
        self.with_arena(|arena| arena.start_offset(node))
    }

    pub fn start_offset_in_parent(&self, access: &ReadAccess<'_>) -> Result<TextSize> {
        let node = self.node(access)?;
        self.with_arena(|arena| arena.start_offset_in_parent(node))
    }

    /// Offset of the first leaf that is not whitespace or a comment, or the
    /// start offset if there is none.
    pub fn text_offset(&self, access: &ReadAccess<'_>) -> Result<TextSize> {
        let node = self.node(access)?;
        self.with_arena(|arena| {
            for candidate in arena.descendants(node) {
                let data = arena.get(candidate)?;
                let is_token = data.kind().is_leaf() || data.kind().is_unexpanded();
                if is_token && !data.ty().kind().is_trivia() && data.text_len() > TextSize::new(0) {
                    return arena.start_offset(candidate);
                }
            }
            arena.start_offset(node)
        })
    }

    pub fn text_len(&self, access: &ReadAccess<'_>) -> Result<TextSize> {
        let node = self.node(access)?;
        self.with_arena(|arena| arena.text_len(node))
    }

    pub fn text(&self, access: &ReadAccess<'_>) -> Result<String> {
        let node = self.node(access)?;
        self.with_arena(|arena| arena.text(node))
    }

    /// Characters of the element's text, in order.
    pub fn chars(&self, access: &ReadAccess<'_>) -> Result<Vec<char>> {
        Ok(self.text(access)?.chars().collect())
    }

    pub fn text_contains(&self, access: &ReadAccess<'_>, c: char) -> Result<bool> {
        Ok(self.text(access)?.contains(c))
    }

    /// Deepest element at `offset`, relative to this element's start.
    ///
    /// Lazy regions on the way down are expanded.
    pub fn find_element_at(&self, access: &ReadAccess<'_>, offset: TextSize) -> Result<Option<PsiElement>> {
        let node = self.node(access)?;
        loop {
            access.check_canceled()?;
            let found = self.with_arena(|arena| {
                let Some(leaf) = arena.find_leaf_at(node, offset)? else {
                    return Ok(None);
                };
                Ok(Some((leaf, arena.kind(leaf)?.is_unexpanded())))
            })?;
            match found {
                None => return Ok(None),
                Some((leaf, true)) => self.file.expand_lazy(leaf, access)?,
                Some((leaf, false)) => return self.with_arena(|arena| self.wrap(arena, leaf).map(Some)),
            }
        }
    }

    pub fn find_child_by_type(&self, access: &ReadAccess<'_>, ty: ElementType) -> Result<Option<PsiElement>> {
        self.find_child_by_filter(access, &TokenSet::of(&[ty]))
    }

    pub fn find_children_by_type(&self, access: &ReadAccess<'_>, ty: ElementType) -> Result<Vec<PsiElement>> {
        self.find_children_by_filter(access, &TokenSet::of(&[ty]))
    }

    pub fn find_children_by_filter(&self, access: &ReadAccess<'_>, filter: &TokenSet) -> Result<Vec<PsiElement>> {
        let node = self.expanded_node(access)?;
        self.with_arena(|arena| {
            let mut matching = Vec::new();
            for child in arena.children(node)? {
                if filter.contains(arena.ty(*child)?) {
                    matching.push(self.wrap(arena, *child)?);
                }
            }
            Ok(matching)
        })
    }

    pub fn find_child_by_filter(&self, access: &ReadAccess<'_>, filter: &TokenSet) -> Result<Option<PsiElement>> {
        let node = self.expanded_node(access)?;
        self.with_arena(|arena| {
            for child in arena.children(node)? {
                if filter.contains(arena.ty(*child)?) {
                    return self.wrap(arena, *child).map(Some);
                }
            }
            Ok(None)
        })
    }

    /// Like [`PsiElement::find_child_by_type`], for children the grammar
    /// guarantees.
    pub fn find_not_null_child_by_type(&self, access: &ReadAccess<'_>, ty: ElementType) -> Result<PsiElement> {
        self.find_child_by_type(access, ty)?.ok_or_else(|| {
            let err = ConsistencyError::MissingChild {
                parent: self.ty.name(),
                expected: ty.name(),
            };
            error!(element = ?self, %err, "missing required child");
            err.into()
        })
    }
}
