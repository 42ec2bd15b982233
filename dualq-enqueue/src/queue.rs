use std::{fmt::Debug, sync::Arc};

/// The storage capability: a queue that can report how many packets it currently holds.
///
/// The queue itself (its push and pop semantics) is owned elsewhere in the pipeline.
/// The admission controller only ever reads its occupancy.
pub trait QueueSink: Debug + Send + Sync + 'static {
    /// Returns the number of packets currently held by the queue.
    fn occupancy(&self) -> usize;
}

/// A node of the packet-processing topology, resolved against the storage capability.
#[derive(Debug, Clone)]
pub enum Node {
    /// A node that implements [`QueueSink`].
    Sink { name: String, sink: Arc<dyn QueueSink> },
    /// Any other node.
    Other { name: String },
}

impl Node {
    pub fn sink(name: impl Into<String>, sink: Arc<dyn QueueSink>) -> Self {
        Self::Sink { name: name.into(), sink }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self::Other { name: name.into() }
    }

    /// Returns the name of the node.
    pub fn name(&self) -> &str {
        match self {
            Self::Sink { name, .. } | Self::Other { name } => name,
        }
    }

    /// Returns the queue handle if this node implements the storage capability.
    pub fn as_sink(&self) -> Option<&Arc<dyn QueueSink>> {
        match self {
            Self::Sink { sink, .. } => Some(sink),
            Self::Other { .. } => None,
        }
    }

    /// Returns `true` if this node implements the storage capability.
    pub fn is_sink(&self) -> bool {
        matches!(self, Self::Sink { .. })
    }
}
