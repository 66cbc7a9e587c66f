//! Per-file element bookkeeping.
//!
//! Every element handle of a file is an index into its [`ElementTable`]. The
//! table records whether the element is still answered by a stub or already
//! bound to a node, and caches the stub/node correspondence found by the last
//! binding walk.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::base::ElementType;
use crate::core::MismatchNote;
use crate::stubs::{StubId, StubTree, declaration_children};
use crate::tree::{NodeArena, NodeId};

/// Slot of an element within its file. The generation tells a reused slot
/// apart from the element that held it before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    /// The file element of every anchor.
    pub const FILE: ElementId = ElementId {
        index: 0,
        generation: 0,
    };
}

/// The representation currently backing an element. Never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Unbound(StubId),
    Bound(NodeId),
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<(ElementType, ElementState)>,
}

#[derive(Debug)]
pub(crate) struct ElementTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_node: FxHashMap<NodeId, ElementId>,
    by_stub: FxHashMap<StubId, ElementId>,
    stub_nodes: FxHashMap<StubId, NodeId>,
    node_stubs: FxHashMap<NodeId, StubId>,
    /// Stamp of the stub tree `stub_nodes` was computed for.
    bound_stamp: Option<u32>,
    mismatch: MismatchNote,
    /// Why the stub tree was dropped, if it was.
    stubs_dropped: Option<String>,
}

impl ElementTable {
    pub(crate) fn new(file_ty: ElementType, file_state: ElementState) -> Self {
        let mut table = Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_node: FxHashMap::default(),
            by_stub: FxHashMap::default(),
            stub_nodes: FxHashMap::default(),
            node_stubs: FxHashMap::default(),
            bound_stamp: None,
            mismatch: MismatchNote::default(),
            stubs_dropped: None,
        };
        table.push(file_ty, file_state);
        table
    }

    fn push(&mut self, ty: ElementType, state: ElementState) -> ElementId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some((ty, state));
                ElementId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some((ty, state)),
                });
                ElementId {
                    index,
                    generation: 0,
                }
            }
        };
        match state {
            ElementState::Unbound(stub) => self.by_stub.insert(stub, id),
            ElementState::Bound(node) => self.by_node.insert(node, id),
        };
        id
    }

    fn entry_mut(&mut self, id: ElementId) -> Option<&mut (ElementType, ElementState)> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    pub(crate) fn state(&self, id: ElementId) -> Option<ElementState> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
            .map(|(_, state)| *state)
    }

    /// Number of live elements.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// The element for `node`, binding the stub element that corresponds to it
    /// if there is one, otherwise creating a fresh bound element.
    pub(crate) fn for_node(&mut self, node: NodeId, ty: ElementType) -> ElementId {
        if let Some(id) = self.by_node.get(&node) {
            return *id;
        }
        if let Some(id) = self
            .node_stubs
            .get(&node)
            .and_then(|stub| self.by_stub.get(stub))
            .copied()
        {
            self.bind(id, node);
            return id;
        }
        self.push(ty, ElementState::Bound(node))
    }

    /// The element for `stub`. A stub whose node is known resolves to the
    /// node's element.
    pub(crate) fn for_stub(&mut self, stub: StubId, ty: ElementType) -> ElementId {
        if let Some(id) = self.by_stub.get(&stub) {
            return *id;
        }
        if let Some(node) = self.stub_nodes.get(&stub).copied() {
            let id = self.for_node(node, ty);
            self.by_stub.insert(stub, id);
            return id;
        }
        self.push(ty, ElementState::Unbound(stub))
    }

    /// Promote `id` using the last binding walk. Returns the bound node.
    pub(crate) fn try_bind(&mut self, id: ElementId) -> Option<NodeId> {
        match self.state(id)? {
            ElementState::Bound(node) => Some(node),
            ElementState::Unbound(stub) => {
                let node = *self.stub_nodes.get(&stub)?;
                self.bind(id, node);
                Some(node)
            }
        }
    }

    fn bind(&mut self, id: ElementId, node: NodeId) {
        if let Some(entry) = self.entry_mut(id) {
            trace!(element = ?id, ?node, "bound element");
            entry.1 = ElementState::Bound(node);
            self.by_node.insert(node, id);
        }
    }

    pub(crate) fn is_binding_current(&self, stubs: &StubTree) -> bool {
        self.bound_stamp == Some(stubs.stamp())
    }

    pub(crate) fn mismatch(&self) -> &MismatchNote {
        &self.mismatch
    }

    pub(crate) fn stubs_dropped(&self) -> Option<&str> {
        self.stubs_dropped.as_deref()
    }

    /// Walk the stub tree and the node tree in parallel and record which node
    /// every stub corresponds to.
    pub(crate) fn bind_stubs(&mut self, arena: &NodeArena, stubs: &StubTree) {
        self.stub_nodes.clear();
        self.node_stubs.clear();
        self.mismatch = MismatchNote::default();
        self.bound_stamp = Some(stubs.stamp());
        let Ok(root) = arena.root() else {
            self.mismatch = MismatchNote(Some("node tree has no root".to_string()));
            return;
        };
        let mut pending = vec![(stubs.root(), root)];
        while let Some((stub_id, node)) = pending.pop() {
            let Some(stub) = stubs.get(stub_id) else { continue };
            let Ok(node_ty) = arena.ty(node) else { continue };
            if stub.ty() != node_ty {
                self.note_mismatch(format!(
                    "stub {:?} faces node {:?}",
                    stub.ty(),
                    node_ty
                ));
                continue;
            }
            self.stub_nodes.insert(stub_id, node);
            self.node_stubs.insert(node, stub_id);
            let Ok(nodes) = declaration_children(arena, node) else { continue };
            if nodes.len() != stub.children().len() {
                self.note_mismatch(format!(
                    "{:?} has {} stub children but {} declaration nodes",
                    stub.ty(),
                    stub.children().len(),
                    nodes.len()
                ));
            }
            pending.extend(stub.children().iter().copied().zip(nodes));
        }
        debug!(
            stubs = stubs.len(),
            bound = self.stub_nodes.len(),
            mismatch = ?self.mismatch.0,
            "bound stub tree to node tree"
        );
    }

    fn note_mismatch(&mut self, note: String) {
        if self.mismatch.0.is_none() {
            self.mismatch = MismatchNote(Some(note));
        }
    }

    /// Bind every element whose stub has a node, then forget all stub state.
    pub(crate) fn drop_stubs(&mut self, reason: &str) {
        let unbound: Vec<(ElementId, NodeId)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot.entry {
                Some((_, ElementState::Unbound(stub))) => self.stub_nodes.get(&stub).map(|node| {
                    let id = ElementId {
                        index: index as u32,
                        generation: slot.generation,
                    };
                    (id, *node)
                }),
                _ => None,
            })
            .collect();
        for (id, node) in unbound {
            if !self.by_node.contains_key(&node) {
                self.bind(id, node);
            }
        }
        self.by_stub.clear();
        self.stub_nodes.clear();
        self.node_stubs.clear();
        self.bound_stamp = None;
        self.stubs_dropped = Some(reason.to_string());
    }

    /// Start over with a new stub tree rooted at `root`. Unbound elements of
    /// the previous tree stay unbound and stop resolving.
    pub(crate) fn reset_stubs(&mut self, root: StubId) {
        self.by_stub.clear();
        self.stub_nodes.clear();
        self.node_stubs.clear();
        self.bound_stamp = None;
        self.mismatch = MismatchNote::default();
        self.stubs_dropped = None;
        if let Some(entry) = self.entry_mut(ElementId::FILE) {
            if matches!(entry.1, ElementState::Unbound(_)) {
                entry.1 = ElementState::Unbound(root);
                self.by_stub.insert(root, ElementId::FILE);
            }
        }
    }

    /// Release the elements of removed nodes. Their slots are reused, and
    /// outstanding handles fail the generation check.
    pub(crate) fn forget_nodes(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        for node in nodes {
            let stub = self.node_stubs.remove(&node);
            if let Some(stub) = stub {
                self.stub_nodes.remove(&stub);
            }
            let Some(id) = self.by_node.remove(&node) else { continue };
            if let Some(stub) = stub {
                if self.by_stub.get(&stub) == Some(&id) {
                    self.by_stub.remove(&stub);
                }
            }
            if id == ElementId::FILE {
                continue;
            }
            if let Some(slot) = self.slots.get_mut(id.index as usize) {
                if slot.generation == id.generation && slot.entry.take().is_some() {
                    slot.generation = slot.generation.wrapping_add(1);
                    self.free.push(id.index);
                }
            }
        }
    }
}
