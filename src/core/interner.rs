//! Character-sequence interner for whitespace leaves.
//!
//! Uses `Arc<str>` so interned text can be shared by nodes of one file across
//! threads. Identical sequences share one allocation.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

/// Shared text handle
pub type IStr = Arc<str>;

/// Deduplicating pool of leaf texts, safe to share across threads.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Mutex<FxHashSet<Arc<str>>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pooled copy of `text`, adding it on first sight.
    pub fn intern(&self, s: &str) -> IStr {
        let mut strings = self.strings.lock();
        if let Some(existing) = strings.get(s) {
            Arc::clone(existing)
        } else {
            let arc: Arc<str> = Arc::from(s);
            strings.insert(Arc::clone(&arc));
            arc
        }
    }

    /// Looks `text` up without adding it.
    pub fn get(&self, s: &str) -> Option<IStr> {
        self.strings.lock().get(s).cloned()
    }

    /// Distinct texts in the pool.
    pub fn len(&self) -> usize {
        self.strings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.lock().is_empty()
    }
}
