//! Aggregate byte budget shared by a batch of downloads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counts bytes received across every download of a batch.
///
/// Clones share the same counter. A reservation that would take the total
/// past the limit is refused and leaves the counter unchanged.
#[derive(Debug, Clone)]
pub struct SizeBudget {
    used: Arc<AtomicU64>,
    limit: u64,
}

impl SizeBudget {
    /// A budget of `limit` bytes.
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self {
            used: Arc::new(AtomicU64::new(0)),
            limit,
        }
    }

    /// Total bytes the batch may receive.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Bytes currently reserved.
    #[must_use]
    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }

    /// Reserve `bytes`. Returns `false` when that would exceed the limit.
    pub fn reserve(&self, bytes: u64) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|total| *total <= self.limit)
            })
            .is_ok()
    }

    /// Give back bytes from a download that was abandoned.
    pub fn release(&self, bytes: u64) {
        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| Some(used.saturating_sub(bytes)));
    }
}
