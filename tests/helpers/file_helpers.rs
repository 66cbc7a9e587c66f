//! Helpers for opening Sketch files in a fresh manager.

use std::sync::Arc;

use stubtree::core::ReadAccess;
use stubtree::file::{FileAnchor, FileView, PsiManager};
use stubtree::parser::{SKETCH, SketchParserDefinition, SyntaxKind};
use stubtree::stubs::StubTree;
use stubtree::{PsiElement, TreeOptions};

pub const FILE_NAME: &str = "test.sk";

pub fn manager() -> PsiManager {
    PsiManager::with_options(SketchParserDefinition::registry(), TreeOptions::default())
}

/// Parse `text` eagerly.
pub fn open_parsed(manager: &PsiManager, text: &str) -> Arc<FileAnchor> {
    open_view(manager, FileView::new(FILE_NAME, text, &SKETCH))
}

pub fn open_view(manager: &PsiManager, view: FileView) -> Arc<FileAnchor> {
    let access = manager.read();
    manager
        .open_file(view, &SKETCH, &access)
        .unwrap_or_else(|err| panic!("failed to open file: {err}"))
}

/// Open `text` from its own stubs; nothing is parsed until needed.
pub fn open_indexed(manager: &PsiManager, text: &str) -> Arc<FileAnchor> {
    open_with_stubs(manager, text, text)
}

/// Open `text` with the stubs of `stub_text`, which may disagree with it.
pub fn open_with_stubs(manager: &PsiManager, text: &str, stub_text: &str) -> Arc<FileAnchor> {
    let access = manager.read();
    let stubs = StubTree::from_text(&SketchParserDefinition, stub_text, &access)
        .unwrap_or_else(|err| panic!("failed to index: {err}"));
    manager
        .open_indexed(FileView::new(FILE_NAME, text, &SKETCH), &SKETCH, stubs)
        .unwrap_or_else(|err| panic!("failed to open indexed file: {err}"))
}

/// First child of `kind`, panicking if there is none.
pub fn child(element: &PsiElement, access: &ReadAccess<'_>, kind: SyntaxKind) -> PsiElement {
    element
        .find_child_by_type(access, kind.element_type())
        .unwrap()
        .unwrap_or_else(|| panic!("{element:?} has no {kind:?} child"))
}

/// Children of `kind`, from stubs while `element` is unbound.
pub fn stub_children(element: &PsiElement, access: &ReadAccess<'_>, kind: SyntaxKind) -> Vec<PsiElement> {
    element
        .stub_or_psi_children(access, kind.element_type())
        .unwrap()
}

pub fn file_text(anchor: &FileAnchor, access: &ReadAccess<'_>) -> String {
    anchor.text(access).unwrap()
}
