//! Open files and the model lock that guards them.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use super::{FileAnchor, FileView, ParserRegistry};
use crate::base::Language;
use crate::core::{
    ConsistencyError, ModelLock, ReadAccess, ReadGuard, Result, TreeError, TreeOptions, WriteAccess,
    WriteGuard,
};
use crate::stubs::StubTree;

/// Owner of the open files of one project.
///
/// Files are keyed by view name. Access tokens come from the manager's
/// [`ModelLock`].
pub struct PsiManager {
    lock: ModelLock,
    registry: Arc<dyn ParserRegistry>,
    options: TreeOptions,
    files: RwLock<FxHashMap<String, Arc<FileAnchor>>>,
}

impl std::fmt::Debug for PsiManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PsiManager")
            .field("options", &self.options)
            .field("files", &self.files.read().len())
            .finish_non_exhaustive()
    }
}

impl PsiManager {
    /// Manager configured from the environment (see [`TreeOptions::from_env`]).
    pub fn new(registry: Arc<dyn ParserRegistry>) -> Self {
        Self::with_options(registry, TreeOptions::from_env())
    }

    pub fn with_options(registry: Arc<dyn ParserRegistry>, options: TreeOptions) -> Self {
        Self {
            lock: ModelLock::new(),
            registry,
            options,
            files: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn read(&self) -> ReadGuard<'_> {
        self.lock.read()
    }

    pub fn write(&self) -> WriteGuard<'_> {
        self.lock.write()
    }

    pub fn cancel(&self) {
        info!("cancellation requested");
        self.lock.cancel();
    }

    pub fn reset_cancellation(&self) {
        self.lock.reset_cancellation();
    }

    /// Parse `view` and register it, replacing a file of the same name.
    pub fn open_file(
        &self,
        view: FileView,
        language: &'static Language,
        access: &ReadAccess<'_>,
    ) -> Result<Arc<FileAnchor>> {
        let anchor = FileAnchor::parsed(view, language, &*self.registry, self.options.clone(), access)?;
        self.register(Arc::clone(&anchor), "file was reopened");
        Ok(anchor)
    }

    /// Register `view` with an index-built stub tree. Nothing is parsed until
    /// an element needs its node.
    pub fn open_indexed(
        &self,
        view: FileView,
        language: &'static Language,
        stubs: StubTree,
    ) -> Result<Arc<FileAnchor>> {
        let anchor = FileAnchor::indexed(view, language, &*self.registry, self.options.clone(), stubs)?;
        self.register(Arc::clone(&anchor), "file was reopened");
        Ok(anchor)
    }

    /// Build the stub tree an indexer would store for `view`.
    pub fn index(&self, view: &FileView, language: &'static Language, access: &ReadAccess<'_>) -> Result<StubTree> {
        let definition = self
            .registry
            .definition(language)
            .ok_or(ConsistencyError::NoParserDefinition(language.id()))?;
        StubTree::from_text(&*definition, view.text(), access)
    }

    fn register(&self, anchor: Arc<FileAnchor>, replaced_reason: &str) {
        let name = anchor.view().name().to_string();
        if let Some(previous) = self.files.write().insert(name, anchor) {
            previous.invalidate(replaced_reason);
        }
    }

    pub fn file(&self, name: &str) -> Option<Arc<FileAnchor>> {
        self.files.read().get(name).cloned()
    }

    /// Replace the text of an open file. The previous anchor and all of its
    /// elements become invalid.
    pub fn reparse(&self, name: &str, text: impl Into<Arc<str>>, access: &WriteAccess<'_>) -> Result<Arc<FileAnchor>> {
        let previous = self
            .file(name)
            .ok_or_else(|| TreeError::invalid(format!("file {name} is not open")))?;
        let view = previous.view().with_text(text);
        let anchor = FileAnchor::parsed(
            view,
            previous.language(),
            &*self.registry,
            self.options.clone(),
            access,
        )?;
        self.register(Arc::clone(&anchor), "file was reparsed");
        debug!(file = name, "reparsed file");
        Ok(anchor)
    }

    /// Forget an open file. Its elements become invalid.
    pub fn close(&self, name: &str, _access: &WriteAccess<'_>) -> bool {
        match self.files.write().remove(name) {
            Some(anchor) => {
                anchor.invalidate("file was closed");
                true
            }
            None => false,
        }
    }

    pub fn open_files(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.read().keys().cloned().collect();
        names.sort();
        names
    }
}
