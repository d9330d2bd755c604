//! Revocation epoch, the global "re-verify everything" heartbeat.
//!
//! The epoch is a single process-wide counter. It carries no association to
//! any token: a relying party caches a verdict keyed by
//! `(request, rev_epoch)` and treats it as stale as soon as the authority
//! bumps the epoch. Per-token revocation stays on the token itself.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic, lock-free revocation counter.
#[derive(Debug)]
pub struct RevocationEpoch {
    value: AtomicU64,
}

impl RevocationEpoch {
    /// Create an epoch starting at `initial`.
    pub fn new(initial: u64) -> Self {
        Self {
            value: AtomicU64::new(initial),
        }
    }

    /// Current value. No side effects.
    pub fn read(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Increment by exactly one and return the new value.
    ///
    /// Saturates at `u64::MAX`; a bump at the ceiling leaves the value unchanged.
    pub fn bump(&self) -> u64 {
        match self
            .value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(1))
        {
            Ok(previous) => {
                let next = previous + 1;
                log::info!("revocation epoch bumped to {next}");
                next
            }
            Err(current) => {
                log::warn!("revocation epoch already at {current}, not bumped");
                current
            }
        }
    }
}

impl Default for RevocationEpoch {
    fn default() -> Self {
        Self::new(1)
    }
}
