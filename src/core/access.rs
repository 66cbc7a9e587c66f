//! Read/write capability tokens.
//!
//! The model lock implements the single-writer / multi-reader discipline. Every
//! API that reads tree state takes a [`ReadAccess`]; every structural edit takes
//! a [`WriteAccess`]. Tokens can only be obtained by locking a [`ModelLock`],
//! and a write token dereferences to a read token.
//!
//! Each token also carries the cancellation signal that was current when the
//! lock was taken, so long walks can poll it without extra plumbing.

use std::marker::PhantomData;
use std::ops::Deref;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio_util::sync::CancellationToken;

use super::error::{Result, TreeError};

/// The application-wide read/write lock over all trees.
///
/// The lock is not reentrant: taking `write()` while holding `read()` on the
/// same thread deadlocks.
#[derive(Debug, Default)]
pub struct ModelLock {
    lock: RwLock<()>,
    cancel: Mutex<CancellationToken>,
}

impl ModelLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> ReadGuard<'_> {
        let guard = self.lock.read();
        ReadGuard {
            _guard: guard,
            access: ReadAccess::new(self.cancellation_token()),
        }
    }

    pub fn write(&self) -> WriteGuard<'_> {
        let guard = self.lock.write();
        WriteGuard {
            _guard: guard,
            access: WriteAccess {
                read: ReadAccess::new(self.cancellation_token()),
            },
        }
    }

    /// Signal cancellation to every operation running under a token taken
    /// before the next [`ModelLock::reset_cancellation`].
    pub fn cancel(&self) {
        self.cancel.lock().cancel();
    }

    /// Install a fresh, uncancelled signal for subsequent lock acquisitions.
    pub fn reset_cancellation(&self) {
        *self.cancel.lock() = CancellationToken::new();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.lock().clone()
    }
}

/// Proof that the current thread holds at least read access.
#[derive(Debug)]
pub struct ReadAccess<'a> {
    cancel: CancellationToken,
    _lock: PhantomData<&'a ModelLock>,
}

impl ReadAccess<'_> {
    fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            _lock: PhantomData,
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Abort with [`TreeError::Cancelled`] if cancellation was requested.
    pub fn check_canceled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(TreeError::cancelled("cancellation requested"));
        }
        Ok(())
    }
}

/// Proof that the current thread holds exclusive write access.
#[derive(Debug)]
pub struct WriteAccess<'a> {
    read: ReadAccess<'a>,
}

impl<'a> Deref for WriteAccess<'a> {
    type Target = ReadAccess<'a>;

    fn deref(&self) -> &Self::Target {
        &self.read
    }
}

/// Held read lock; dereferences to its [`ReadAccess`].
pub struct ReadGuard<'a> {
    _guard: RwLockReadGuard<'a, ()>,
    access: ReadAccess<'a>,
}

impl<'a> Deref for ReadGuard<'a> {
    type Target = ReadAccess<'a>;

    fn deref(&self) -> &Self::Target {
        &self.access
    }
}

/// Held write lock; dereferences to its [`WriteAccess`].
pub struct WriteGuard<'a> {
    _guard: RwLockWriteGuard<'a, ()>,
    access: WriteAccess<'a>,
}

impl<'a> Deref for WriteGuard<'a> {
    type Target = WriteAccess<'a>;

    fn deref(&self) -> &Self::Target {
        &self.access
    }
}
