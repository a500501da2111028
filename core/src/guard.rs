//! Call serialization with reentrancy detection.
//!
//! One call holds the guard at a time. A call arriving from another thread
//! waits until the holder's [`Entered`] token is dropped. A call arriving on
//! the holder's own thread can only come from a callback inside the in-flight
//! call, so it is rejected instead of deadlocking or observing half-finished
//! bookkeeping.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use thiserror::Error;

/// Returned when a call re-enters while its own thread holds the guard.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("reentrant call rejected: this thread is already inside a call")]
pub struct ReentrancyError;

/// Call lock plus the identity of the thread holding it.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    call: Mutex<()>,
    holder: Mutex<Option<ThreadId>>,
}

impl ReentrancyGuard {
    /// Creates an unlocked guard
    #[must_use]
    pub const fn new() -> Self {
        Self {
            call: Mutex::new(()),
            holder: Mutex::new(None),
        }
    }

    /// Takes the guard, blocking while another thread holds it
    ///
    /// # Errors
    ///
    /// Returns [`ReentrancyError`] if the current thread already holds the guard.
    pub fn enter(&self) -> Result<Entered<'_>, ReentrancyError> {
        let current = thread::current().id();
        if *self.lock_holder() == Some(current) {
            return Err(ReentrancyError);
        }
        let call = self.call.lock().unwrap_or_else(PoisonError::into_inner);
        *self.lock_holder() = Some(current);
        Ok(Entered {
            _call: call,
            holder: &self.holder,
        })
    }

    /// Returns true while a call holds the guard
    #[must_use]
    pub fn is_entered(&self) -> bool {
        self.lock_holder().is_some()
    }

    fn lock_holder(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.holder.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Token proving the guard is held; releases it on drop.
#[derive(Debug)]
#[must_use = "the guard is released as soon as this token is dropped"]
pub struct Entered<'a> {
    _call: MutexGuard<'a, ()>,
    holder: &'a Mutex<Option<ThreadId>>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        // Cleared before the call lock is released by the field drop.
        *self.holder.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
