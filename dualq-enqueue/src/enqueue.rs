use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use dualq_common::{Clock, MonotonicClock};
use dualq_wire::EcnPacket;
use parking_lot::RwLock;

use crate::{
    bind::{bind, BindError, Binding, BindingMode},
    options::{validate_limit, ConfigError, EnqueueOptions},
    stats::{EnqueueStats, StatsSnapshot},
    topology::Topology,
    CouplingState, Outputs,
};

/// The logical queue a packet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Classical,
    Scalable,
}

impl Class {
    /// Classifies a packet by its ECN codepoint. Only `ECT(2)` packets are scalable; packets
    /// without IP and TCP headers are classical.
    #[inline]
    pub fn of<P: EcnPacket + ?Sized>(packet: &P) -> Self {
        if packet.is_scalable() {
            Self::Scalable
        } else {
            Self::Classical
        }
    }
}

/// The admission decision for a single packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ForwardClassical,
    ForwardScalable,
    Drop,
}

impl Action {
    const fn forward(class: Class) -> Self {
        match class {
            Class::Classical => Self::ForwardClassical,
            Class::Scalable => Self::ForwardScalable,
        }
    }

    pub const fn is_drop(self) -> bool {
        matches!(self, Self::Drop)
    }
}

/// A dual-queue enqueue controller.
///
/// Every packet is classified by ECN codepoint into the classical or the scalable queue.
/// If the occupancy of that queue has reached the limit the packet is refused; otherwise its
/// admission time is published to the shared [`CouplingState`] and it is forwarded to the
/// output of its class.
///
/// The controller does not own its queues. [`EcnEnqueue::initialize`] binds it to them once,
/// before any packet is processed. Packets must be delivered to a given controller one at a
/// time; separate controllers may share a coupling state freely.
pub struct EcnEnqueue<P> {
    /// The name of this controller in the topology.
    name: String,
    /// The options as supplied.
    options: EnqueueOptions,
    /// The current admission limit. Starts at `options.limit`.
    limit: AtomicUsize,
    binding: RwLock<Binding>,
    outputs: Outputs<P>,
    coupling: Arc<CouplingState>,
    clock: Arc<dyn Clock>,
    stats: EnqueueStats,
}

impl<P> EcnEnqueue<P>
where
    P: EcnPacket,
{
    /// Creates a new, unbound controller. The options are validated eagerly.
    ///
    /// The controller publishes to a private [`CouplingState`] unless one is provided with
    /// [`EcnEnqueue::with_coupling`].
    pub fn new(
        name: impl Into<String>,
        options: EnqueueOptions,
        outputs: Outputs<P>,
    ) -> Result<Self, ConfigError> {
        options.validate()?;

        Ok(Self {
            name: name.into(),
            limit: AtomicUsize::new(options.limit),
            options,
            binding: RwLock::new(Binding::unbound()),
            outputs,
            coupling: CouplingState::new(),
            clock: Arc::new(MonotonicClock),
            stats: EnqueueStats::default(),
        })
    }

    /// Publishes admissions to the given coupling state.
    pub fn with_coupling(mut self, coupling: Arc<CouplingState>) -> Self {
        self.coupling = coupling;
        self
    }

    /// Takes admission timestamps from the given clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Creates a controller and binds it to its queues in one step.
    pub fn bound<T>(
        name: impl Into<String>,
        options: EnqueueOptions,
        outputs: Outputs<P>,
        coupling: Arc<CouplingState>,
        topology: &T,
    ) -> crate::Result<Self>
    where
        T: Topology + ?Sized,
    {
        let enqueue = Self::new(name, options, outputs)?.with_coupling(coupling);
        enqueue.initialize(topology)?;
        Ok(enqueue)
    }

    /// Binds the controller to its queues.
    ///
    /// Any previous binding is discarded first, so on failure the controller is left
    /// unbound. Calling this again is the only way to pick up topology changes.
    pub fn initialize<T>(&self, topology: &T) -> Result<(), BindError>
    where
        T: Topology + ?Sized,
    {
        let mut binding = self.binding.write();
        *binding = Binding::unbound();

        match bind(topology, &self.name, self.options.queues()) {
            Ok(bound) => {
                tracing::debug!(
                    node = %self.name,
                    mode = ?bound.mode(),
                    queues = ?bound.queues().iter().map(|q| q.name()).collect::<Vec<_>>(),
                    "bound queues"
                );
                *binding = bound;
                Ok(())
            }
            Err(e) => {
                tracing::error!(node = %self.name, "failed to bind queues: {e}");
                Err(e)
            }
        }
    }

    /// Decides the fate of `packet` and updates counters and coupling state accordingly.
    /// The packet itself is not forwarded, see [`EcnEnqueue::push`].
    ///
    /// An unbound controller refuses every packet and publishes nothing.
    pub fn process(&self, packet: &P) -> Action {
        let class = Class::of(packet);
        let occupancy = {
            let binding = self.binding.read();
            if binding.mode() == BindingMode::Unbound {
                self.stats.increment_drops();
                tracing::trace!(node = %self.name, ?class, "unbound, dropping packet");
                return Action::Drop;
            }
            binding.occupancy(class)
        };

        if occupancy >= self.limit() {
            self.stats.increment_drops();
            tracing::trace!(node = %self.name, ?class, occupancy, "queue full, dropping packet");
            return Action::Drop;
        }

        self.coupling.record_admit(class, self.clock.now_millis());
        self.stats.increment_forwarded(class);
        Action::forward(class)
    }

    /// Processes `packet` and hands it to the matching output. Refused packets are destroyed
    /// or diverted to the overflow output.
    pub fn push(&self, packet: P) -> Action {
        let action = self.process(&packet);
        match action {
            Action::ForwardClassical => self.outputs.classical.push(packet),
            Action::ForwardScalable => self.outputs.scalable.push(packet),
            Action::Drop => self.outputs.overflow.handle(packet),
        }

        action
    }

    /// Replaces the admission limit.
    pub fn set_limit(&self, limit: usize) -> Result<(), ConfigError> {
        validate_limit(limit)?;
        let previous = self.limit.swap(limit, Ordering::Relaxed);
        tracing::debug!(node = %self.name, previous, limit, "admission limit updated");
        Ok(())
    }

    /// Carries the admission limit over from the controller this one replaces.
    pub fn take_state(&self, previous: &Self) {
        self.limit.store(previous.limit(), Ordering::Relaxed);
    }
}

impl<P> EcnEnqueue<P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The options the controller was created with.
    pub fn options(&self) -> &EnqueueOptions {
        &self.options
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit.load(Ordering::Relaxed)
    }

    pub fn mode(&self) -> BindingMode {
        self.binding.read().mode()
    }

    /// Returns `true` once the controller has been bound to its queues.
    pub fn is_operational(&self) -> bool {
        self.mode() != BindingMode::Unbound
    }

    /// Names of the bound queues, classical first when paired.
    pub fn queue_names(&self) -> Vec<String> {
        self.binding.read().queues().iter().map(|queue| queue.name().to_string()).collect()
    }

    pub fn classical_occupancy(&self) -> usize {
        self.binding.read().classical_occupancy()
    }

    pub fn scalable_occupancy(&self) -> usize {
        self.binding.read().scalable_occupancy()
    }

    pub fn total_occupancy(&self) -> usize {
        self.binding.read().total_occupancy()
    }

    pub fn drops(&self) -> u64 {
        self.stats.drops()
    }

    pub fn coupling(&self) -> &Arc<CouplingState> {
        &self.coupling
    }

    pub fn outputs(&self) -> &Outputs<P> {
        &self.outputs
    }

    /// Returns a snapshot of occupancy and counters.
    pub fn stats(&self) -> StatsSnapshot {
        let binding = self.binding.read();
        StatsSnapshot {
            total_occupancy: binding.total_occupancy(),
            classical_occupancy: binding.classical_occupancy(),
            scalable_occupancy: binding.scalable_occupancy(),
            limit: self.limit(),
            drops: self.stats.drops(),
            classical_forwarded: self.stats.classical_forwarded(),
            scalable_forwarded: self.stats.scalable_forwarded(),
        }
    }
}

impl<P> fmt::Debug for EcnEnqueue<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcnEnqueue")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("limit", &self.limit())
            .field("binding", &*self.binding.read())
            .field("outputs", &self.outputs)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
