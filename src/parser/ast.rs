//! Typed element wrappers for Sketch.
//!
//! Accessors marked stub-first answer from the stub while the element is
//! unbound and only fall back to the node tree once it is bound. The others
//! always need the node and promote the element.

use smol_str::SmolStr;

use super::definition::PARAMS_FIELD;
use super::syntax_kind::SyntaxKind;
use crate::core::{ReadAccess, Result};
use crate::psi::{PsiElement, PsiNode, psi_node};

psi_node!(SketchFile, SyntaxKind::SOURCE_FILE.element_type());
psi_node!(ClassDecl, SyntaxKind::CLASS.element_type());
psi_node!(FunDecl, SyntaxKind::FUN.element_type());
psi_node!(FieldDecl, SyntaxKind::FIELD.element_type());

fn cast_all<N: PsiNode>(elements: Vec<PsiElement>) -> Vec<N> {
    elements.into_iter().filter_map(N::cast).collect()
}

fn children_of<N: PsiNode>(element: &PsiElement, access: &ReadAccess<'_>, kind: SyntaxKind) -> Result<Vec<N>> {
    Ok(cast_all(element.stub_or_psi_children(access, kind.element_type())?))
}

/// Stub-first name of a declaration.
fn declared_name(element: &PsiElement, access: &ReadAccess<'_>) -> Result<Option<SmolStr>> {
    if let Some(name) = element.with_stub(access, |stub| stub.name().cloned())? {
        return Ok(name);
    }
    match element.find_child_by_type(access, SyntaxKind::IDENT.element_type())? {
        Some(ident) => Ok(Some(SmolStr::from(ident.text(access)?))),
        None => Ok(None),
    }
}

impl SketchFile {
    pub fn classes(&self, access: &ReadAccess<'_>) -> Result<Vec<ClassDecl>> {
        children_of(&self.0, access, SyntaxKind::CLASS)
    }

    pub fn functions(&self, access: &ReadAccess<'_>) -> Result<Vec<FunDecl>> {
        children_of(&self.0, access, SyntaxKind::FUN)
    }

    pub fn fields(&self, access: &ReadAccess<'_>) -> Result<Vec<FieldDecl>> {
        children_of(&self.0, access, SyntaxKind::FIELD)
    }
}

impl ClassDecl {
    /// Stub-first.
    pub fn name(&self, access: &ReadAccess<'_>) -> Result<Option<SmolStr>> {
        declared_name(&self.0, access)
    }

    /// Stub-first.
    pub fn functions(&self, access: &ReadAccess<'_>) -> Result<Vec<FunDecl>> {
        children_of(&self.0, access, SyntaxKind::FUN)
    }

    /// Stub-first.
    pub fn fields(&self, access: &ReadAccess<'_>) -> Result<Vec<FieldDecl>> {
        children_of(&self.0, access, SyntaxKind::FIELD)
    }

    /// Nested classes. Stub-first.
    pub fn classes(&self, access: &ReadAccess<'_>) -> Result<Vec<ClassDecl>> {
        children_of(&self.0, access, SyntaxKind::CLASS)
    }

    pub fn name_identifier(&self, access: &ReadAccess<'_>) -> Result<Option<PsiElement>> {
        self.0.find_child_by_type(access, SyntaxKind::IDENT.element_type())
    }
}

impl FunDecl {
    /// Stub-first.
    pub fn name(&self, access: &ReadAccess<'_>) -> Result<Option<SmolStr>> {
        declared_name(&self.0, access)
    }

    /// Stub-first.
    pub fn param_count(&self, access: &ReadAccess<'_>) -> Result<usize> {
        let from_stub = self.0.with_stub(access, |stub| {
            stub.data()
                .field(PARAMS_FIELD)
                .and_then(|count| count.parse().ok())
                .unwrap_or(0)
        })?;
        if let Some(count) = from_stub {
            return Ok(count);
        }
        match self.0.find_child_by_type(access, SyntaxKind::PARAM_LIST.element_type())? {
            Some(list) => Ok(list
                .find_children_by_type(access, SyntaxKind::PARAM.element_type())?
                .len()),
            None => Ok(0),
        }
    }

    pub fn name_identifier(&self, access: &ReadAccess<'_>) -> Result<Option<PsiElement>> {
        self.0.find_child_by_type(access, SyntaxKind::IDENT.element_type())
    }

    /// The lazily parsed body.
    pub fn body(&self, access: &ReadAccess<'_>) -> Result<Option<PsiElement>> {
        self.0.find_child_by_type(access, SyntaxKind::BLOCK.element_type())
    }

    pub fn body_text(&self, access: &ReadAccess<'_>) -> Result<Option<String>> {
        self.body(access)?.map(|body| body.text(access)).transpose()
    }

    /// Statements of the body, expanding it if needed.
    pub fn statements(&self, access: &ReadAccess<'_>) -> Result<Vec<PsiElement>> {
        match self.body(access)? {
            Some(body) => body.find_children_by_type(access, SyntaxKind::STATEMENT.element_type()),
            None => Ok(Vec::new()),
        }
    }
}

impl FieldDecl {
    /// Stub-first.
    pub fn name(&self, access: &ReadAccess<'_>) -> Result<Option<SmolStr>> {
        declared_name(&self.0, access)
    }
}
