//! Stub to node promotion.
//!
//! An unbound element is promoted on the first request its stub cannot
//! answer:
//! 1. resolve the containing file through the stub parents
//! 2. if the node tree is loaded, look the stub up in the binding walk
//! 3. otherwise materialize the tree (which runs the walk) and look again
//!
//! An element that is still unbound after that means the stub tree and the
//! node tree disagree. That is reported as a [`BindingFailure`] with both trees
//! dumped.

use std::sync::Arc;

use tracing::{debug, error};

use super::{ElementState, PsiElement};
use crate::core::{BindPhase, BindingFailure, ReadAccess, Result, TreeError, WriteAccess};
use crate::stubs::{Stub, StubId, StubTree};
use crate::tree::NodeId;

impl PsiElement {
    /// The node backing this element, promoting it if necessary.
    ///
    /// Calling this twice on a bound element yields the same node.
    pub fn node(&self, access: &ReadAccess<'_>) -> Result<NodeId> {
        access.check_canceled()?;
        match self.state()? {
            ElementState::Bound(node) => {
                self.check_alive(node)?;
                Ok(node)
            }
            ElementState::Unbound(stub) => self.promote(stub, access),
        }
    }

    fn promote(&self, stub: StubId, access: &ReadAccess<'_>) -> Result<NodeId> {
        self.file_of_stub(stub)?;
        let phase = if self.file.is_tree_loaded() {
            self.file.ensure_binding();
            BindPhase::TreeAlreadyLoaded
        } else {
            self.file.load_tree(access)?;
            BindPhase::AfterLoad
        };
        if let Some(node) = self.file.elements.lock().try_bind(self.id) {
            debug!(element = ?self, ?node, "promoted stub element");
            return Ok(node);
        }
        Err(self.binding_failure(phase))
    }

    fn binding_failure(&self, phase: BindPhase) -> TreeError {
        let stub_dump = self
            .file
            .stub_tree()
            .map_or_else(|| "<no stub tree>\n".to_string(), |stubs| stubs.dump());
        let tree_dump = self.file.dump_tree();
        let mismatch = self.file.elements.lock().mismatch().clone();
        let failure = BindingFailure {
            phase,
            element_type: self.ty.name(),
            file: self.file.view().display_path(),
            mismatch,
            stub_dump,
            tree_dump,
        };
        error!(element = ?self, %failure, "stub/node binding failed");
        failure.into()
    }

    /// Fails unless `node` is still part of a live file tree.
    pub(crate) fn check_alive(&self, node: NodeId) -> Result<()> {
        self.file.ensure_valid()?;
        if self.node_alive(node) {
            Ok(())
        } else {
            self.file.warn_stale("node");
            Err(TreeError::invalid(format!("{:?} was removed from its tree", self.ty)))
        }
    }

    pub(super) fn node_alive(&self, node: NodeId) -> bool {
        let tree = self.file.tree.read();
        tree.as_ref()
            .is_some_and(|arena| arena.contains(node) && arena.is_attached(node))
    }

    /// The current stub tree, if it still contains `stub`.
    pub(super) fn current_stubs(&self, stub: StubId) -> Result<Arc<StubTree>> {
        match self.file.stub_tree() {
            Some(stubs) if stubs.owns(stub) && self.file.is_valid() => Ok(stubs),
            _ => Err(self.stale_stub_error()),
        }
    }

    pub(super) fn stale_stub_error(&self) -> TreeError {
        if !self.file.is_valid() {
            return self.file.invalid_error();
        }
        if self.file.is_stub_rebuild_in_progress() {
            return TreeError::cancelled("file is being rebuilt");
        }
        self.file.warn_stale("stub");
        let reason = self
            .file
            .elements
            .lock()
            .stubs_dropped()
            .map_or_else(|| "stub belongs to a discarded stub tree".to_string(), str::to_string);
        TreeError::invalid(reason)
    }

    /// The file element, found by walking stub parents.
    fn file_of_stub(&self, stub: StubId) -> Result<PsiElement> {
        let stubs = self.current_stubs(stub)?;
        let mut current = stub;
        while let Some(parent) = stubs.get(current).and_then(Stub::parent) {
            current = parent;
        }
        let root_ty = stubs
            .get(current)
            .map(Stub::ty)
            .ok_or_else(|| self.stale_stub_error())?;
        Ok(PsiElement::for_stub(&self.file, current, root_ty))
    }

    /// The file element this element belongs to.
    pub fn containing_file(&self, access: &ReadAccess<'_>) -> Result<PsiElement> {
        access.check_canceled()?;
        match self.state()? {
            ElementState::Unbound(stub) => self.file_of_stub(stub),
            ElementState::Bound(node) => {
                self.check_alive(node)?;
                Ok(self.file.file_element())
            }
        }
    }

    /// Whether the element still resolves.
    ///
    /// Unbound elements are valid while their parent stub's element is; bound
    /// elements while their node is attached to a live tree.
    pub fn is_valid(&self, access: &ReadAccess<'_>) -> bool {
        if !self.file.is_valid() {
            return false;
        }
        match self.state() {
            Ok(ElementState::Bound(node)) => self.node_alive(node),
            Ok(ElementState::Unbound(stub)) => {
                let Some(stubs) = self.file.stub_tree().filter(|stubs| stubs.owns(stub)) else {
                    return false;
                };
                match stubs.get(stub).and_then(Stub::parent) {
                    None => true,
                    Some(parent) => {
                        let ty = stubs.get(parent).map(Stub::ty);
                        ty.is_some_and(|ty| PsiElement::for_stub(&self.file, parent, ty).is_valid(access))
                    }
                }
            }
            Err(_) => false,
        }
    }

    /// Run `f` on the stub backing this element. `None` once bound.
    pub fn with_stub<R>(&self, access: &ReadAccess<'_>, f: impl FnOnce(&Stub) -> R) -> Result<Option<R>> {
        access.check_canceled()?;
        let ElementState::Unbound(stub) = self.state()? else {
            return Ok(None);
        };
        let stubs = self.current_stubs(stub)?;
        let stub = stubs.get(stub).ok_or_else(|| self.stale_stub_error())?;
        Ok(Some(f(stub)))
    }

    /// Drop the file's stub tree after a structural edit below this element.
    ///
    /// Bound elements keep their nodes; the stub tree is rebuilt by the index,
    /// never patched.
    pub fn subtree_changed(&self, _access: &WriteAccess<'_>) {
        self.file.drop_stubs("stub tree outdated by structural edit");
    }
}
