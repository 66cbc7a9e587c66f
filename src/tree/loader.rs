//! Materializes rowan green trees as arena nodes.

use rowan::{GreenNodeData, NodeOrToken};
use tracing::trace;

use super::{NodeArena, NodeFactory, NodeId};
use crate::core::{ReadAccess, Result};
use crate::file::ParserDefinition;

/// Load a parsed file into `arena` and make it the root.
pub fn load_root(
    arena: &mut NodeArena,
    factory: &NodeFactory,
    definition: &dyn ParserDefinition,
    green: &GreenNodeData,
    access: &ReadAccess<'_>,
) -> Result<NodeId> {
    let root = load_node(arena, factory, definition, green, access)?;
    arena.set_root(root);
    trace!(nodes = arena.len(), "loaded node tree");
    Ok(root)
}

/// Load the children of `green` as detached nodes, in order.
pub fn load_children(
    arena: &mut NodeArena,
    factory: &NodeFactory,
    definition: &dyn ParserDefinition,
    green: &GreenNodeData,
    access: &ReadAccess<'_>,
) -> Result<Vec<NodeId>> {
    let mut children = Vec::new();
    for child in green.children() {
        let id = match child {
            NodeOrToken::Node(node) => load_node(arena, factory, definition, node, access)?,
            NodeOrToken::Token(token) => {
                let ty = definition.element_type(token.kind());
                arena.alloc(factory.create_leaf(ty, token.text()))
            }
        };
        children.push(id);
    }
    Ok(children)
}

fn load_node(
    arena: &mut NodeArena,
    factory: &NodeFactory,
    definition: &dyn ParserDefinition,
    green: &GreenNodeData,
    access: &ReadAccess<'_>,
) -> Result<NodeId> {
    access.check_canceled()?;
    let ty = definition.element_type(green.kind());
    let id = arena.alloc(factory.create_composite(ty));
    let children = load_children(arena, factory, definition, green, access)?;
    arena.insert_children(id, 0, &children)?;
    Ok(id)
}
