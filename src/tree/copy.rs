//! Change-tracking copy utility.
//!
//! Nodes are copied in two steps so the source and target trees never have to
//! be locked at the same time: [`snapshot`] captures a detached description of
//! a subtree, [`instantiate`] materializes it in a target arena. Whitespace is
//! re-interned against the target file's table and only copyable user data
//! travels with the copy.
//!
//! [`encode`] marks an inserted copy with its source range; [`decode`] strips
//! the marker again and turns it into a [`FormattingHint`] for the formatter.

use text_size::TextRange;

use super::{Key, NodeArena, NodeData, NodeFactory, NodeId, NodeKind, UserData};
use crate::base::ElementType;
use crate::core::Result;

/// Marker left on a freshly inserted copy until it is decoded.
pub static COPY_SOURCE: Key<CopySource> = Key::new("copy-source");

/// Where an inserted copy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopySource {
    pub range: TextRange,
}

/// Request to reformat an inserted copy, produced by [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattingHint {
    /// Range of the copy in its new tree.
    pub range: TextRange,
    /// Range of the original in its tree at copy time.
    pub source: TextRange,
}

/// Detached copy of a subtree.
#[derive(Debug, Clone)]
pub struct CopiedNode {
    ty: ElementType,
    kind: NodeKind,
    user_data: UserData,
    children: Vec<CopiedNode>,
    source: TextRange,
}

impl CopiedNode {
    pub fn ty(&self) -> ElementType {
        self.ty
    }

    /// Range of the original node when the snapshot was taken.
    pub fn source_range(&self) -> TextRange {
        self.source
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        if let Some(text) = self.kind.leaf_text().or(self.kind.lazy_text()) {
            out.push_str(text);
        }
        for child in &self.children {
            child.push_text(out);
        }
    }
}

/// Capture the subtree rooted at `id`.
pub fn snapshot(arena: &NodeArena, id: NodeId) -> Result<CopiedNode> {
    let source = arena.text_range(id)?;
    snapshot_node(arena, id, source)
}

fn snapshot_node(arena: &NodeArena, id: NodeId, source: TextRange) -> Result<CopiedNode> {
    let node = arena.get(id)?;
    let mut children = Vec::with_capacity(node.children.len());
    let mut offset = source.start();
    for child in &node.children {
        let len = arena.text_len(*child)?;
        children.push(snapshot_node(arena, *child, TextRange::at(offset, len))?);
        offset += len;
    }
    Ok(CopiedNode {
        ty: node.ty,
        kind: node.kind.clone(),
        user_data: node.user_data.copyable(),
        children,
        source,
    })
}

/// Materialize a snapshot as a detached subtree of `arena`.
pub fn instantiate(arena: &mut NodeArena, factory: &NodeFactory, copy: &CopiedNode) -> Result<NodeId> {
    let kind = match &copy.kind {
        NodeKind::Whitespace { text, generated } => NodeKind::Whitespace {
            text: factory.interner().intern(text),
            generated: *generated,
        },
        other => other.clone(),
    };
    let mut data = NodeData::new(copy.ty, kind);
    data.user_data = copy.user_data.clone();
    let id = arena.alloc(data);
    let mut children = Vec::with_capacity(copy.children.len());
    for child in &copy.children {
        children.push(instantiate(arena, factory, child)?);
    }
    arena.insert_children(id, 0, &children)?;
    Ok(id)
}

/// Mark an inserted copy with the range it was copied from.
pub fn encode(arena: &mut NodeArena, id: NodeId, copy: &CopiedNode) -> Result<()> {
    arena.get_mut(id)?.user_data.put(
        &COPY_SOURCE,
        CopySource {
            range: copy.source_range(),
        },
    );
    Ok(())
}

/// Strip the copy marker from `id`, returning the formatting work it implies.
pub fn decode(arena: &mut NodeArena, id: NodeId) -> Result<Option<FormattingHint>> {
    let Some(source) = arena.get_mut(id)?.user_data.remove(&COPY_SOURCE) else {
        return Ok(None);
    };
    Ok(Some(FormattingHint {
        range: arena.text_range(id)?,
        source: source.range,
    }))
}
