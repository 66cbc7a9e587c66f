//! The per-(language, view) root of a file's trees.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, warn};

use super::{FileView, ParserDefinition, ParserRegistry};
use crate::base::Language;
use crate::core::{ConsistencyError, ReadAccess, Result, TreeError, TreeOptions, WriteAccess};
use crate::psi::{ElementId, ElementState, ElementTable, PsiElement};
use crate::stubs::StubTree;
use crate::tree::{
    FormattingHint, NodeArena, NodeFactory, NodeId, NodeKind, dump_creation_traces, dump_tree,
    load_children, load_root,
};

/// Root of one language's trees over a [`FileView`].
///
/// The anchor owns the node tree once it is materialized, the stub tree while
/// it is current, and the table of element handles. Lock order is always
/// tree, then stubs, then elements.
pub struct FileAnchor {
    view: FileView,
    language: &'static Language,
    definition: Arc<dyn ParserDefinition>,
    factory: NodeFactory,
    options: TreeOptions,
    pub(crate) tree: RwLock<Option<NodeArena>>,
    pub(crate) stubs: RwLock<Option<Arc<StubTree>>>,
    pub(crate) elements: Mutex<ElementTable>,
    valid: AtomicBool,
    invalid_reason: Mutex<Option<String>>,
    stub_rebuild: AtomicBool,
    tree_loads: AtomicUsize,
    formatting_hints: Mutex<Vec<FormattingHint>>,
}

impl std::fmt::Debug for FileAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAnchor")
            .field("name", &self.view.name())
            .field("language", &self.language)
            .field("valid", &self.is_valid())
            .field("tree_loaded", &self.is_tree_loaded())
            .finish_non_exhaustive()
    }
}

impl FileAnchor {
    /// Parse `view` eagerly. The file element starts bound to the root node.
    pub fn parsed(
        view: FileView,
        language: &'static Language,
        registry: &dyn ParserRegistry,
        options: TreeOptions,
        access: &ReadAccess<'_>,
    ) -> Result<Arc<Self>> {
        let (language, definition) = Self::configure(&view, language, registry)?;
        let factory = NodeFactory::new(definition.whitespace_type(), definition.factory_override());
        let green = definition.parse(view.text(), access)?;
        let mut arena = NodeArena::new(options.creation_traces);
        let root = load_root(&mut arena, &factory, &*definition, &green, access)?;
        let elements = ElementTable::new(definition.file_node_type(), ElementState::Bound(root));
        debug!(file = view.name(), language = language.id(), nodes = arena.len(), "opened parsed file");
        Ok(Arc::new(Self::assemble(
            view,
            language,
            definition,
            factory,
            options,
            Some(arena),
            None,
            elements,
        )))
    }

    /// Open `view` from an index. The node tree is materialized on demand.
    pub fn indexed(
        view: FileView,
        language: &'static Language,
        registry: &dyn ParserRegistry,
        options: TreeOptions,
        stubs: StubTree,
    ) -> Result<Arc<Self>> {
        let (language, definition) = Self::configure(&view, language, registry)?;
        let factory = NodeFactory::new(definition.whitespace_type(), definition.factory_override());
        let elements = ElementTable::new(
            definition.file_node_type(),
            ElementState::Unbound(stubs.root()),
        );
        debug!(file = view.name(), language = language.id(), stubs = stubs.len(), "opened indexed file");
        Ok(Arc::new(Self::assemble(
            view,
            language,
            definition,
            factory,
            options,
            None,
            Some(Arc::new(stubs)),
            elements,
        )))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        view: FileView,
        language: &'static Language,
        definition: Arc<dyn ParserDefinition>,
        factory: NodeFactory,
        options: TreeOptions,
        tree: Option<NodeArena>,
        stubs: Option<Arc<StubTree>>,
        elements: ElementTable,
    ) -> Self {
        Self {
            view,
            language,
            definition,
            factory,
            options,
            tree: RwLock::new(tree),
            stubs: RwLock::new(stubs),
            elements: Mutex::new(elements),
            valid: AtomicBool::new(true),
            invalid_reason: Mutex::new(None),
            stub_rebuild: AtomicBool::new(false),
            tree_loads: AtomicUsize::new(0),
            formatting_hints: Mutex::new(Vec::new()),
        }
    }

    /// Resolve `requested` against the view and find its parser definition.
    fn configure(
        view: &FileView,
        requested: &'static Language,
        registry: &dyn ParserRegistry,
    ) -> Result<(&'static Language, Arc<dyn ParserDefinition>)> {
        let resolved = if view.base_language().is_kind_of(requested) {
            Some(view.base_language())
        } else {
            view.languages().skip(1).find(|language| language.is_kind_of(requested))
        };
        let language = resolved.ok_or_else(|| {
            misconfigured(ConsistencyError::LanguageNotInView {
                language: requested.id(),
                view: view.name().to_string(),
                available: view.languages().map(Language::id).collect(),
            })
        })?;
        let definition = registry
            .definition(language)
            .ok_or_else(|| misconfigured(ConsistencyError::NoParserDefinition(language.id())))?;
        let root_ty = definition.file_node_type();
        if root_ty.language() != language {
            return Err(misconfigured(ConsistencyError::RootLanguageMismatch {
                node_type: root_ty.name(),
                found: root_ty.language().id(),
                expected: language.id(),
            }));
        }
        Ok((language, definition))
    }

    pub fn view(&self) -> &FileView {
        &self.view
    }

    pub fn language(&self) -> &'static Language {
        self.language
    }

    pub fn definition(&self) -> &Arc<dyn ParserDefinition> {
        &self.definition
    }

    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// The file-level element.
    pub fn file_element(self: &Arc<Self>) -> PsiElement {
        PsiElement::new(Arc::clone(self), ElementId::FILE, self.definition.file_node_type())
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    pub fn invalidation_reason(&self) -> Option<String> {
        self.invalid_reason.lock().clone()
    }

    /// Mark the file and every element in it invalid.
    pub fn invalidate(&self, reason: impl Into<String>) {
        let reason = reason.into();
        debug!(file = self.view.name(), %reason, "invalidated file");
        *self.invalid_reason.lock() = Some(reason);
        self.valid.store(false, Ordering::Release);
    }

    pub(crate) fn invalid_error(&self) -> TreeError {
        TreeError::invalid(
            self.invalidation_reason()
                .unwrap_or_else(|| "file is no longer valid".to_string()),
        )
    }

    pub(crate) fn ensure_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self.invalid_error())
        }
    }

    /// Fails unless the file may be edited.
    pub(crate) fn ensure_writable(&self) -> Result<()> {
        self.ensure_valid()?;
        if !self.view.is_writable() {
            return Err(TreeError::unsupported(format!(
                "file {} is not writable",
                self.view.name()
            )));
        }
        Ok(())
    }

    pub fn is_tree_loaded(&self) -> bool {
        self.tree.read().is_some()
    }

    /// How many times a node tree was materialized for this anchor.
    pub fn tree_loads(&self) -> usize {
        self.tree_loads.load(Ordering::Acquire)
    }

    /// Elements currently allocated for this file.
    pub fn element_count(&self) -> usize {
        self.elements.lock().len()
    }

    pub fn stub_tree(&self) -> Option<Arc<StubTree>> {
        self.stubs.read().clone()
    }

    /// Announce that the stub tree is being reconciled with the file.
    ///
    /// Until [`FileAnchor::replace_stubs`] runs, stub-backed elements whose
    /// stubs are gone report cancellation instead of invalidity.
    pub fn begin_stub_rebuild(&self) {
        self.stub_rebuild.store(true, Ordering::Release);
    }

    pub fn is_stub_rebuild_in_progress(&self) -> bool {
        self.stub_rebuild.load(Ordering::Acquire)
    }

    /// Install a freshly built stub tree and end any rebuild in progress.
    pub fn replace_stubs(&self, stubs: StubTree, _access: &WriteAccess<'_>) {
        let tree = self.tree.read();
        let mut slot = self.stubs.write();
        let stubs = Arc::new(stubs);
        let mut elements = self.elements.lock();
        elements.reset_stubs(stubs.root());
        if let Some(arena) = tree.as_ref() {
            elements.bind_stubs(arena, &stubs);
        }
        *slot = Some(stubs);
        self.stub_rebuild.store(false, Ordering::Release);
    }

    /// Discard the stub tree. Elements it could still bind are bound first.
    pub(crate) fn drop_stubs(&self, reason: &str) {
        let mut slot = self.stubs.write();
        if slot.take().is_some() {
            debug!(file = self.view.name(), reason, "dropped stub tree");
            self.elements.lock().drop_stubs(reason);
        }
    }

    /// Materialize the node tree unless it already is. Concurrent callers may
    /// both parse; the first stored tree wins.
    pub(crate) fn load_tree(&self, access: &ReadAccess<'_>) -> Result<()> {
        if self.is_tree_loaded() {
            return Ok(());
        }
        self.ensure_valid()?;
        let green = self.definition.parse(self.view.text(), access)?;
        let mut arena = NodeArena::new(self.options.creation_traces);
        load_root(&mut arena, &self.factory, &*self.definition, &green, access)?;

        let mut slot = self.tree.write();
        if slot.is_some() {
            debug!(file = self.view.name(), "node tree was materialized concurrently");
            return Ok(());
        }
        let arena = slot.insert(arena);
        self.tree_loads.fetch_add(1, Ordering::AcqRel);
        if let Some(stubs) = self.stubs.read().as_ref() {
            self.elements.lock().bind_stubs(arena, stubs);
        }
        debug!(file = self.view.name(), nodes = arena.len(), "materialized node tree");
        Ok(())
    }

    /// Re-run the binding walk if the stub tree changed since the last one.
    pub(crate) fn ensure_binding(&self) {
        let tree = self.tree.read();
        let stubs = self.stubs.read();
        let (Some(arena), Some(stubs)) = (tree.as_ref(), stubs.as_ref()) else {
            return;
        };
        let mut elements = self.elements.lock();
        if !elements.is_binding_current(stubs) {
            elements.bind_stubs(arena, stubs);
        }
    }

    /// Parse the chameleon at `node` if it has not been expanded yet.
    pub(crate) fn expand_lazy(&self, node: NodeId, access: &ReadAccess<'_>) -> Result<()> {
        let (ty, text) = {
            let tree = self.tree.read();
            let arena = tree.as_ref().ok_or_else(|| self.tree_not_loaded())?;
            match arena.kind(node)? {
                NodeKind::Lazy { text: Some(text) } => (arena.ty(node)?, Arc::clone(text)),
                _ => return Ok(()),
            }
        };
        access.check_canceled()?;
        let green = self.definition.parse_lazy(ty, &text);

        let mut tree = self.tree.write();
        let arena = tree.as_mut().ok_or_else(|| self.tree_not_loaded())?;
        if !arena.kind(node)?.is_unexpanded() {
            return Ok(());
        }
        let children = load_children(arena, &self.factory, &*self.definition, &green, access)?;
        if let Err(err) = arena.expand_lazy(node, &children) {
            for child in children {
                arena.free_subtree(child)?;
            }
            error!(file = self.view.name(), ?ty, %err, "lazy reparse changed the text");
            return Err(err);
        }
        debug!(file = self.view.name(), ?ty, children = children.len(), "expanded lazy node");
        Ok(())
    }

    pub(crate) fn tree_not_loaded(&self) -> TreeError {
        if !self.is_valid() {
            return self.invalid_error();
        }
        TreeError::invalid(format!("node tree of {} is not loaded", self.view.name()))
    }

    /// Current text: the node tree's if materialized, the view's otherwise.
    pub fn text(&self, _access: &ReadAccess<'_>) -> Result<String> {
        self.ensure_valid()?;
        let tree = self.tree.read();
        match tree.as_ref() {
            Some(arena) => arena.text(arena.root()?),
            None => Ok(self.view.text().to_string()),
        }
    }

    /// Node tree dump for diagnostics, honoring [`TreeOptions`].
    pub fn dump_tree(&self) -> String {
        let tree = self.tree.read();
        let Some(arena) = tree.as_ref() else {
            return "<node tree not loaded>\n".to_string();
        };
        let Ok(root) = arena.root() else {
            return "<node tree has no root>\n".to_string();
        };
        let dump = if self.options.creation_traces {
            dump_tree(arena, root, None).and_then(|mut dump| {
                dump.push_str(&dump_creation_traces(arena, root)?);
                Ok(dump)
            })
        } else {
            dump_tree(arena, root, Some(self.options.dump_limit))
        };
        dump.unwrap_or_else(|err| format!("<node tree dump failed: {err}>\n"))
    }

    pub(crate) fn push_formatting_hint(&self, hint: FormattingHint) {
        self.formatting_hints.lock().push(hint);
    }

    /// Drain the formatting work queued by inserted copies.
    pub fn take_formatting_hints(&self) -> Vec<FormattingHint> {
        std::mem::take(&mut *self.formatting_hints.lock())
    }

    pub(crate) fn warn_stale(&self, what: &str) {
        warn!(file = self.view.name(), what, "stale element access");
    }
}

fn misconfigured(err: ConsistencyError) -> TreeError {
    error!(%err, "misconfigured file anchor");
    err.into()
}
