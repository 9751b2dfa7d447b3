//! Cancellation shared between an interrupt handler and the animation driver.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Cloneable, one-way cancellation flag.
///
/// Clones observe the same flag. Once cancelled a token stays cancelled.
/// Waiting on the token returns as soon as it is cancelled, so pacing delays
/// do not hold up shutdown.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use lumigrid_core::CancelToken;
///
/// let token = CancelToken::new();
/// let handler = token.clone();
/// handler.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.wait_timeout(Duration::from_secs(60)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self.lock();
        *cancelled = true;
        self.inner.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    /// Block for up to `timeout`, returning early on cancellation.
    ///
    /// Returns `true` when the token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        if *guard || timeout.is_zero() {
            return *guard;
        }
        let (guard, _) = self
            .inner
            .wake
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
