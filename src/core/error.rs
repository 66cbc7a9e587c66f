//! Error taxonomy for tree access and editing.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = TreeError> = std::result::Result<T, E>;

/// Errors raised by navigation, promotion and editing.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The element's file or stub chain can no longer be resolved.
    #[error("invalid element: {reason}")]
    InvalidElement { reason: String },

    /// The ambient cancellation signal fired.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// The element's position does not support the requested edit.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A parser, stub builder or registration bug.
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

impl TreeError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidElement {
            reason: reason.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled(message.into())
    }

    pub fn is_invalid_element(&self) -> bool {
        matches!(self, Self::InvalidElement { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    pub fn is_consistency(&self) -> bool {
        matches!(self, Self::Consistency(_))
    }
}

/// Internal-consistency failures. These indicate a bug, not a runtime condition.
#[derive(Debug, Error)]
pub enum ConsistencyError {
    #[error(transparent)]
    StubBinding(Box<BindingFailure>),

    #[error("missing required child {expected} in {parent}")]
    MissingChild {
        parent: &'static str,
        expected: &'static str,
    },

    #[error("range endpoints do not share a parent: {first} is under {first_parent}, {last} is under {last_parent}, expected {expected}")]
    MismatchedParents {
        first: &'static str,
        first_parent: String,
        last: &'static str,
        last_parent: String,
        expected: String,
    },

    #[error("language {language} doesn't participate in file view {view}: {available:?}")]
    LanguageNotInView {
        language: &'static str,
        view: String,
        available: Vec<&'static str>,
    },

    #[error("no parser definition registered for language {0}")]
    NoParserDefinition(&'static str),

    #[error("file node type {node_type} belongs to {found}, expected {expected}")]
    RootLanguageMismatch {
        node_type: &'static str,
        found: &'static str,
        expected: &'static str,
    },
}

/// Which step of promotion failed to bind a stub-backed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindPhase {
    /// The node tree was already materialized, yet the walk found no node.
    TreeAlreadyLoaded,
    /// The node tree was parsed for this request and still no node was found.
    AfterLoad,
}

impl std::fmt::Display for BindPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TreeAlreadyLoaded => f.write_str("AST already loaded but element still unbound"),
            Self::AfterLoad => f.write_str("failed to bind stub to AST"),
        }
    }
}

/// Detailed report for a stub that could not be matched to a node.
#[derive(Debug, Error)]
#[error("{phase}: element {element_type} in {file}{mismatch}\n--- stub tree ---\n{stub_dump}--- node tree ---\n{tree_dump}")]
pub struct BindingFailure {
    pub phase: BindPhase,
    /// Element type name of the element that failed to bind.
    pub element_type: &'static str,
    /// Physical path of the containing file, or `"unknown"`.
    pub file: String,
    /// First point where the stub and node trees diverged, if recorded.
    pub mismatch: MismatchNote,
    pub stub_dump: String,
    pub tree_dump: String,
}

/// Optional note describing where the parallel walk diverged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MismatchNote(pub Option<String>);

impl std::fmt::Display for MismatchNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(note) => write!(f, " ({note})"),
            None => Ok(()),
        }
    }
}

impl From<BindingFailure> for TreeError {
    fn from(failure: BindingFailure) -> Self {
        Self::Consistency(ConsistencyError::StubBinding(Box::new(failure)))
    }
}
