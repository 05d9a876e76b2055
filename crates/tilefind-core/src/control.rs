//! Batch control: cooperative cancellation and the one-active-batch rule.
//!
//! The worker checks the cancel token before each attempt and on every body
//! write; the flag is monotonic (there is no un-cancel).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag for one batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Error returned when a batch is started while another is still running.
#[derive(Debug)]
pub struct BatchBusy;

impl std::fmt::Display for BatchBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a download batch is already running")
    }
}

impl std::error::Error for BatchBusy {}

/// At most one active batch. `acquire` hands out a guard that frees the
/// slot when dropped (the worker holds it until it exits).
#[derive(Debug, Default)]
pub struct BatchSlot {
    active: Arc<AtomicBool>,
}

impl BatchSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> Result<SlotGuard, BatchBusy> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BatchBusy)?;
        Ok(SlotGuard {
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Releases the batch slot when dropped.
#[derive(Debug)]
pub struct SlotGuard {
    active: Arc<AtomicBool>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_and_sticky() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_canceled());
        token.cancel();
        assert!(clone.is_canceled());
        token.cancel();
        assert!(clone.is_canceled());
    }

    #[test]
    fn second_acquire_is_rejected_until_release() {
        let slot = BatchSlot::new();
        let guard = slot.acquire().unwrap();
        assert!(slot.is_active());
        assert!(slot.acquire().is_err());
        drop(guard);
        assert!(!slot.is_active());
        assert!(slot.acquire().is_ok());
    }
}
