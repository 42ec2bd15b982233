use std::sync::Arc;

use thiserror::Error;

use crate::{
    topology::{Topology, TopologyError},
    Node, QueueSink,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("flow-based router context failure: {0}")]
    TopologyFailure(#[from] TopologyError),
    #[error("no nearby queues")]
    NoQueuesFound,
    #[error("configured queue {0} does not exist")]
    UnknownQueue(String),
    #[error("no candidate implements the queue capability: {rejected:?}")]
    InvalidCandidate { rejected: Vec<String> },
}

/// How the bound queues map onto the classical and scalable logical queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingMode {
    /// Binding has not run yet, or the last attempt failed.
    #[default]
    Unbound,
    /// Exactly two queues: the first discovered is classical, the second scalable.
    Paired,
    /// Any other number of queues, treated as one pool.
    Aggregate,
}

/// A queue the controller is bound to.
#[derive(Debug, Clone)]
pub struct BoundQueue {
    pub(crate) name: String,
    pub(crate) sink: Arc<dyn QueueSink>,
}

impl BoundQueue {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn occupancy(&self) -> usize {
        self.sink.occupancy()
    }
}

/// The result of binding: the mode and the queues, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    pub(crate) mode: BindingMode,
    pub(crate) queues: Vec<BoundQueue>,
    /// Candidates that were rejected because they do not implement the queue capability.
    pub(crate) rejected: Vec<String>,
}

impl Binding {
    /// Returns an empty, unbound binding.
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> BindingMode {
        self.mode
    }

    pub fn queues(&self) -> &[BoundQueue] {
        &self.queues
    }

    /// Names of the candidates rejected while binding.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    fn from_sinks(queues: Vec<BoundQueue>, rejected: Vec<String>) -> Self {
        let mode = if queues.len() == 2 { BindingMode::Paired } else { BindingMode::Aggregate };
        Self { mode, queues, rejected }
    }
}

/// Resolves the queues governed by the node `origin`.
///
/// If `queues` is given, each name is looked up directly and discovery is skipped. Otherwise
/// the topology is searched outward from `origin` in the direction given by its orientation.
/// Candidates that do not implement [`QueueSink`] are reported and skipped; binding only
/// fails on them if none is left.
pub fn bind<T>(topology: &T, origin: &str, queues: Option<&[String]>) -> Result<Binding, BindError>
where
    T: Topology + ?Sized,
{
    let candidates = match queues {
        Some(names) => names
            .iter()
            .map(|name| topology.lookup(name).ok_or_else(|| BindError::UnknownQueue(name.clone())))
            .collect::<Result<Vec<_>, _>>()?,
        None => {
            let orientation = topology.orientation(origin)?;
            topology.search(origin, orientation)?
        }
    };

    if candidates.is_empty() {
        return Err(BindError::NoQueuesFound);
    }

    let mut sinks = Vec::with_capacity(candidates.len());
    let mut rejected = Vec::new();
    for candidate in candidates {
        match candidate {
            Node::Sink { name, sink } => sinks.push(BoundQueue { name, sink }),
            Node::Other { name } => {
                tracing::warn!(node = origin, candidate = %name, "candidate is not a queue");
                rejected.push(name);
            }
        }
    }

    if sinks.is_empty() {
        return Err(BindError::InvalidCandidate { rejected });
    }

    Ok(Binding::from_sinks(sinks, rejected))
}
