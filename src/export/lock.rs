//! Shared state that outlives a panicking holder.

use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// A mutex tagged with the component that owns it.
///
/// Report lines and recorded publishes stay usable after a panic in another
/// task; the poison flag is cleared on first recovery so it is logged once.
#[derive(Debug)]
pub(crate) struct Guarded<T> {
    owner: &'static str,
    inner: Mutex<T>,
}

impl<T> Guarded<T> {
    pub(crate) fn new(owner: &'static str, value: T) -> Self {
        Self {
            owner,
            inner: Mutex::new(value),
        }
    }

    pub(crate) fn lock(&self, op: &'static str) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!(
                target = "static_export::export::lock",
                owner = self.owner,
                op,
                "state lock was poisoned, continuing with its last value"
            );
            self.inner.clear_poison();
            poisoned.into_inner()
        })
    }
}
