#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicU64, Ordering},
        OnceLock,
    },
    time::Instant,
};

/// The instant the steady clock was first read in this process.
static STEADY_EPOCH: OnceLock<Instant> = OnceLock::new();

/// Returns the process-wide steady clock in milliseconds.
///
/// The first call reads `1` and the clock never goes backwards, so a reading is never `0`.
#[inline]
pub fn steady_millis() -> u64 {
    STEADY_EPOCH.get_or_init(Instant::now).elapsed().as_millis() as u64 + 1
}

/// A source of monotonic millisecond timestamps.
pub trait Clock: Debug + Send + Sync + 'static {
    /// Returns the current time in milliseconds. Successive calls never decrease.
    fn now_millis(&self) -> u64;
}

/// The default [`Clock`], backed by [`steady_millis`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        steady_millis()
    }
}

/// A [`Clock`] that only moves when told to. Useful for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self { now: AtomicU64::new(start) }
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::Relaxed);
    }

    /// Sets the clock to `millis`. Ignored if it would move the clock backwards.
    pub fn set(&self, millis: u64) {
        self.now.fetch_max(millis, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}
