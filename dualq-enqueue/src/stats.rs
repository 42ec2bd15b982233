use std::sync::atomic::{AtomicU64, Ordering};

use crate::Class;

/// Counters of an enqueue controller. They never decrease.
#[derive(Debug, Default)]
pub struct EnqueueStats {
    /// Packets refused because their queue was at the limit
    drops: AtomicU64,
    /// Packets forwarded to the classical output
    classical_forwarded: AtomicU64,
    /// Packets forwarded to the scalable output
    scalable_forwarded: AtomicU64,
}

impl EnqueueStats {
    #[inline]
    pub(crate) fn increment_drops(&self) {
        self.drops.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_forwarded(&self, class: Class) {
        let counter = match class {
            Class::Classical => &self.classical_forwarded,
            Class::Scalable => &self.scalable_forwarded,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn classical_forwarded(&self) -> u64 {
        self.classical_forwarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn scalable_forwarded(&self) -> u64 {
        self.scalable_forwarded.load(Ordering::Relaxed)
    }
}

/// A point-in-time view of an enqueue controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_occupancy: usize,
    pub classical_occupancy: usize,
    pub scalable_occupancy: usize,
    pub limit: usize,
    pub drops: u64,
    pub classical_forwarded: u64,
    pub scalable_forwarded: u64,
}
