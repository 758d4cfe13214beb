//! Readiness signal.
//!
//! A single-slot level flag meaning "the topology was recomputed since you
//! last looked". Notifying while a signal is already pending changes nothing
//! visible except the generation counter; there is no queued history.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Best-effort, non-blocking recomputation notification.
#[derive(Debug, Default)]
pub struct ReadySignal {
    pending: Mutex<bool>,
    cond: Condvar,
    generation: AtomicU64,
}

impl ReadySignal {
    /// A signal with nothing pending and generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake every waiter. Never blocks on a consumer.
    pub fn notify(&self) {
        let mut pending = self.pending.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        if !*pending {
            *pending = true;
            self.cond.notify_all();
        }
    }

    /// Drain a pending signal. Returns whether one was pending.
    pub fn try_take(&self) -> bool {
        std::mem::replace(&mut *self.pending.lock(), false)
    }

    /// Whether a notification is waiting to be drained.
    pub fn is_pending(&self) -> bool {
        *self.pending.lock()
    }

    /// Number of notifications ever raised.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Block until a signal is pending, then drain it.
    pub fn wait(&self) {
        let mut pending = self.pending.lock();
        while !*pending {
            self.cond.wait(&mut pending);
        }
        *pending = false;
    }

    /// Block until a signal is pending or `timeout` elapses.
    ///
    /// Returns `true` if a signal was drained.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock();
        while !*pending {
            if self.cond.wait_until(&mut pending, deadline).timed_out() {
                break;
            }
        }
        std::mem::replace(&mut *pending, false)
    }
}
