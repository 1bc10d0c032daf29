//! The one in-flight transfer an installer may run, as seen by a polling observer
//!
//! Observers read whole `SessionSnapshot` values; the transfer side replaces
//! the snapshot under a mutex on every tick, so a reader never sees a package
//! id from one transfer paired with the progress of another.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

/// Immutable view of the session at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub is_downloading: bool,
    pub current_package_id: Option<String>,
    /// Raw tool-reported percentage, 0-100
    pub download_progress: u8,
}

/// Single-slot progress channel shared between the installer and its observers
#[derive(Debug, Default)]
pub struct InstallSession {
    state: Mutex<SessionSnapshot>,
}

impl InstallSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().clone()
    }

    pub fn is_downloading(&self) -> bool {
        self.lock().is_downloading
    }

    pub fn current_package_id(&self) -> Option<String> {
        self.lock().current_package_id.clone()
    }

    pub fn download_progress(&self) -> u8 {
        self.lock().download_progress
    }

    /// Whether the active transfer (if any) is for `id`
    pub fn is_active_for(&self, id: &str) -> bool {
        let state = self.lock();
        state.is_downloading && state.current_package_id.as_deref() == Some(id)
    }

    /// Claim the slot for `id`.
    ///
    /// Fails with `Error::Busy` if another transfer holds it. The slot is
    /// released, and the snapshot reset, when the returned guard drops.
    pub fn try_begin(&self, id: &str) -> Result<SessionGuard<'_>> {
        let mut state = self.lock();
        if state.is_downloading {
            let holder = state.current_package_id.clone().unwrap_or_default();
            return Err(Error::Busy(holder));
        }

        *state = SessionSnapshot {
            is_downloading: true,
            current_package_id: Some(id.to_string()),
            download_progress: 0,
        };

        Ok(SessionGuard { session: self })
    }

    /// Run `f` while holding the session lock, unless `id` is being transferred.
    ///
    /// No transfer can claim the slot until `f` returns, so a directory check
    /// or delete inside `f` cannot interleave with a clone or update of `id`.
    /// Observers block for the duration.
    pub fn while_idle_for<R>(&self, id: &str, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let state = self.lock();
        if state.is_downloading && state.current_package_id.as_deref() == Some(id) {
            return Err(Error::Busy(id.to_string()));
        }
        let result = f();
        drop(state);
        result
    }

    // A panicking transfer must not wedge the observers.
    fn lock(&self) -> MutexGuard<'_, SessionSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of the active session slot
#[derive(Debug)]
pub struct SessionGuard<'a> {
    session: &'a InstallSession,
}

impl SessionGuard<'_> {
    /// Publish a new progress value; anything above 100 is clamped
    pub fn set_progress(&self, percent: u8) {
        let mut state = self.session.lock();
        let percent = percent.min(100);
        if state.download_progress == percent {
            return;
        }

        *state = SessionSnapshot {
            is_downloading: true,
            current_package_id: state.current_package_id.take(),
            download_progress: percent,
        };
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        *self.session.lock() = SessionSnapshot::default();
    }
}
