//! Building stub trees from node trees.

use tracing::debug;

use super::{StubData, StubId, StubTree};
use crate::base::ElementType;
use crate::core::{ReadAccess, Result, TreeError};
use crate::file::ParserDefinition;
use crate::tree::{NodeArena, NodeFactory, NodeId, NodeKind, load_root};

/// Incremental construction of a [`StubTree`].
#[derive(Debug)]
pub struct StubTreeBuilder {
    tree: StubTree,
}

impl StubTreeBuilder {
    pub fn new(root_ty: ElementType, root_data: StubData) -> Self {
        Self {
            tree: StubTree::with_root(root_ty, root_data),
        }
    }

    pub fn root(&self) -> StubId {
        self.tree.root()
    }

    /// Append a stub as the last child of `parent`.
    pub fn add(&mut self, parent: StubId, ty: ElementType, data: StubData) -> Result<StubId> {
        self.tree
            .push(parent, ty, data)
            .ok_or_else(|| TreeError::invalid(format!("{parent:?} is not part of this stub tree")))
    }

    pub fn finish(self) -> StubTree {
        self.tree
    }
}

/// The nearest stubbed descendants of `node`, in document order.
///
/// Lazy regions are never entered: declarations do not live in bodies.
pub fn declaration_children(arena: &NodeArena, node: NodeId) -> Result<Vec<NodeId>> {
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = arena.children(node)?.iter().rev().copied().collect();
    while let Some(current) = stack.pop() {
        let data = arena.get(current)?;
        if data.ty().is_stubbed() {
            found.push(current);
            continue;
        }
        if matches!(data.kind(), NodeKind::Lazy { .. }) {
            continue;
        }
        stack.extend(data.children().iter().rev().copied());
    }
    Ok(found)
}

impl StubTree {
    /// Summarize the node tree under `root`.
    pub fn build(
        arena: &NodeArena,
        root: NodeId,
        definition: &dyn ParserDefinition,
        access: &ReadAccess<'_>,
    ) -> Result<StubTree> {
        let root_data = definition.create_stub(arena, root).unwrap_or_default();
        let mut builder = StubTreeBuilder::new(arena.ty(root)?, root_data);
        let mut pending = vec![(root, builder.root())];
        while let Some((node, stub)) = pending.pop() {
            access.check_canceled()?;
            for child in declaration_children(arena, node)? {
                let data = definition.create_stub(arena, child).unwrap_or_default();
                let child_stub = builder.add(stub, arena.ty(child)?, data)?;
                pending.push((child, child_stub));
            }
        }
        let tree = builder.finish();
        debug!(stubs = tree.len(), "built stub tree");
        Ok(tree)
    }

    /// Parse `text` into a scratch tree and summarize it, as an indexer would.
    pub fn from_text(
        definition: &dyn ParserDefinition,
        text: &str,
        access: &ReadAccess<'_>,
    ) -> Result<StubTree> {
        let green = definition.parse(text, access)?;
        let factory = NodeFactory::new(definition.whitespace_type(), definition.factory_override());
        let mut arena = NodeArena::new(false);
        let root = load_root(&mut arena, &factory, definition, &green, access)?;
        Self::build(&arena, root, definition, access)
    }
}
