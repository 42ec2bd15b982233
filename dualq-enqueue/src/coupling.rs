use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, OnceLock,
};

use crate::Class;

static PROCESS_WIDE: OnceLock<Arc<CouplingState>> = OnceLock::new();

/// Admission timestamps shared between every enqueue controller of a pipeline and the
/// marking algorithm that couples the two queues.
///
/// Each field is updated atomically on its own. Readers may observe a stale value, never a
/// torn one, and no consistency between the two fields is implied. A timestamp of `0` means
/// no packet of that class has been admitted yet.
#[derive(Debug, Default)]
pub struct CouplingState {
    /// Time of the last classical admission, in milliseconds.
    last_classical_admit: AtomicU64,
    /// Time of the last scalable admission, in milliseconds.
    last_scalable_admit: AtomicU64,
}

impl CouplingState {
    /// Creates a new, independent coupling state.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns the coupling state shared by the whole process, creating it on first use.
    pub fn process_wide() -> Arc<Self> {
        PROCESS_WIDE.get_or_init(Self::new).clone()
    }

    #[inline]
    pub fn last_classical_admit(&self) -> u64 {
        self.last_classical_admit.load(Ordering::Acquire)
    }

    #[inline]
    pub fn last_scalable_admit(&self) -> u64 {
        self.last_scalable_admit.load(Ordering::Acquire)
    }

    /// Returns the last admission time of `class`.
    #[inline]
    pub fn last_admit(&self, class: Class) -> u64 {
        match class {
            Class::Classical => self.last_classical_admit(),
            Class::Scalable => self.last_scalable_admit(),
        }
    }

    /// Records that a packet of `class` was admitted at `now_ms`.
    #[inline]
    pub fn record_admit(&self, class: Class, now_ms: u64) {
        let field = match class {
            Class::Classical => &self.last_classical_admit,
            Class::Scalable => &self.last_scalable_admit,
        };
        field.store(now_ms, Ordering::Release);
    }
}
