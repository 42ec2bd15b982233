use crate::{bind::BindingMode, Binding, Class};

impl Binding {
    /// Occupancy of the whole pool: the sum over every bound queue, zero if unbound.
    fn pooled_occupancy(&self) -> usize {
        self.queues.iter().map(|queue| queue.sink.occupancy()).sum()
    }

    /// Occupancy of the classical queue.
    ///
    /// Falls back to the pooled occupancy unless the binding is paired.
    pub fn classical_occupancy(&self) -> usize {
        match (self.mode, self.queues.as_slice()) {
            (BindingMode::Paired, [classical, _]) => classical.sink.occupancy(),
            _ => self.pooled_occupancy(),
        }
    }

    /// Occupancy of the scalable queue.
    ///
    /// Falls back to the pooled occupancy unless the binding is paired.
    pub fn scalable_occupancy(&self) -> usize {
        match (self.mode, self.queues.as_slice()) {
            (BindingMode::Paired, [_, scalable]) => scalable.sink.occupancy(),
            _ => self.pooled_occupancy(),
        }
    }

    /// Occupancy of all bound queues.
    pub fn total_occupancy(&self) -> usize {
        self.pooled_occupancy()
    }

    /// Occupancy of the logical queue serving `class`.
    #[inline]
    pub fn occupancy(&self, class: Class) -> usize {
        match class {
            Class::Classical => self.classical_occupancy(),
            Class::Scalable => self.scalable_occupancy(),
        }
    }
}
