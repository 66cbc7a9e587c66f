use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::base::Language;

/// The content of one file as seen by its anchors: text plus the languages
/// participating in it.
///
/// A view has a base language and may list further languages that are parsed
/// from the same text (templates, embedded dialects).
#[derive(Debug, Clone)]
pub struct FileView {
    name: String,
    path: Option<PathBuf>,
    text: Arc<str>,
    base_language: &'static Language,
    languages: Vec<&'static Language>,
    physical: bool,
    writable: bool,
}

impl FileView {
    pub fn new(name: impl Into<String>, text: impl Into<Arc<str>>, base_language: &'static Language) -> Self {
        Self {
            name: name.into(),
            path: None,
            text: text.into(),
            base_language,
            languages: Vec::new(),
            physical: false,
            writable: true,
        }
    }

    /// Back the view by a file on disk.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self.physical = true;
        self
    }

    pub fn with_language(mut self, language: &'static Language) -> Self {
        if language != self.base_language && !self.languages.contains(&language) {
            self.languages.push(language);
        }
        self
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub fn with_text(&self, text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Path for diagnostics, `"unknown"` for non-physical views.
    pub fn display_path(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "unknown".to_string(), |path| path.display().to_string())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn base_language(&self) -> &'static Language {
        self.base_language
    }

    /// All languages of the view, base language first.
    pub fn languages(&self) -> impl Iterator<Item = &'static Language> + '_ {
        std::iter::once(self.base_language).chain(self.languages.iter().copied())
    }

    pub fn is_physical(&self) -> bool {
        self.physical
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }
}
