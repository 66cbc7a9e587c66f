//! Textual dumps of node trees for diagnostics.

use std::fmt::Write;

use super::{NodeArena, NodeId, NodeKind};
use crate::core::Result;

const TRUNCATED: &str = "... (truncated)\n";

/// Indented dump of the subtree at `id`, one node per line.
///
/// Output past `limit` bytes is cut at a line boundary.
pub fn dump_tree(arena: &NodeArena, id: NodeId, limit: Option<usize>) -> Result<String> {
    let mut out = String::new();
    let mut stack = vec![(id, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let data = arena.get(node)?;
        let mut line = String::new();
        let range = arena.text_range(node)?;
        let _ = write!(line, "{:indent$}{:?}@{:?}", "", data.ty, range, indent = depth * 2);
        match &data.kind {
            NodeKind::Leaf { text } | NodeKind::Whitespace { text, .. } => {
                let _ = write!(line, " {text:?}");
            }
            NodeKind::Lazy { text: Some(_) } => line.push_str(" (lazy)"),
            _ => {}
        }
        line.push('\n');
        if limit.is_some_and(|limit| out.len() + line.len() > limit) {
            out.push_str(TRUNCATED);
            break;
        }
        out.push_str(&line);
        for child in data.children.iter().rev() {
            stack.push((*child, depth + 1));
        }
    }
    Ok(out)
}

/// Creation backtraces of every node in the subtree that recorded one.
pub fn dump_creation_traces(arena: &NodeArena, id: NodeId) -> Result<String> {
    let mut out = String::new();
    for node in arena.descendants(id) {
        let data = arena.get(node)?;
        if let Some(trace) = data.creation_trace() {
            let _ = writeln!(out, "--- {:?} {node:?} created at ---\n{trace}", data.ty);
        }
    }
    Ok(out)
}
