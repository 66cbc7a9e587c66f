pub mod access;
pub mod error;
pub mod interner;
pub mod options;

pub use access::{ModelLock, ReadAccess, ReadGuard, WriteAccess, WriteGuard};
pub use error::{BindPhase, BindingFailure, ConsistencyError, MismatchNote, Result, TreeError};
pub use interner::{IStr, Interner};
pub use options::TreeOptions;
