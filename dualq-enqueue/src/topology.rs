//! Topology discovery.
//!
//! The admission controller does not own its queues: it finds them by searching the
//! packet-processing graph outward from its own position, stopping at the first nodes
//! that advertise the storage capability. [`Topology`] is the query interface it needs,
//! and [`StaticTopology`] is an in-memory graph implementing it.

use std::{collections::VecDeque, sync::Arc};

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::{Node, QueueSink};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("edge from {from} points to missing node {to}")]
    Disconnected { from: String, to: String },
    #[error("node {0} has no connected input or output")]
    NotConnected(String),
}

/// The direction in which packets flow out of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The node pushes packets to its outputs. Queues are searched downstream.
    Push,
    /// Packets are pulled from the node. Queues are searched upstream.
    Pull,
}

/// Capability to query the nodes surrounding a given node of the topology.
pub trait Topology {
    /// Resolves a node by name.
    fn lookup(&self, name: &str) -> Option<Node>;

    /// Returns the orientation of `origin`, determined by which of its edges are connected.
    fn orientation(&self, origin: &str) -> Result<Orientation, TopologyError>;

    /// Searches outward from `origin` (downstream for [`Orientation::Push`], upstream for
    /// [`Orientation::Pull`]) and returns the nearest nodes advertising the storage
    /// capability, in discovery order. The search does not continue past such nodes.
    fn search(&self, origin: &str, orientation: Orientation) -> Result<Vec<Node>, TopologyError>;
}

#[derive(Debug)]
struct Entry {
    node: Node,
    /// Whether the node advertises the storage capability.
    storage: bool,
}

/// An in-memory packet-processing graph.
///
/// Edges keep their insertion order, which makes the discovery order of [`Topology::search`]
/// deterministic: connect the classical queue before the scalable one.
#[derive(Debug, Default)]
pub struct StaticTopology {
    nodes: FxHashMap<String, Entry>,
    downstream: FxHashMap<String, Vec<String>>,
    upstream: FxHashMap<String, Vec<String>>,
}

impl StaticTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plain node that does not advertise the storage capability.
    pub fn add_node(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.nodes.insert(name.clone(), Entry { node: Node::other(name), storage: false });
        self
    }

    /// Adds a queue node.
    pub fn add_queue(&mut self, name: impl Into<String>, sink: Arc<dyn QueueSink>) -> &mut Self {
        let name = name.into();
        self.nodes.insert(name.clone(), Entry { node: Node::sink(name, sink), storage: true });
        self
    }

    /// Adds a node that advertises the storage capability without exposing a queue.
    ///
    /// Searches stop at such a node and report it, but it never resolves to a sink.
    pub fn add_opaque_storage(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.nodes.insert(name.clone(), Entry { node: Node::other(name), storage: true });
        self
    }

    /// Connects an output of `from` to an input of `to`.
    pub fn connect(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        let (from, to) = (from.into(), to.into());
        self.upstream.entry(to.clone()).or_default().push(from.clone());
        self.downstream.entry(from).or_default().push(to);
        self
    }

    fn edges(&self, orientation: Orientation) -> &FxHashMap<String, Vec<String>> {
        match orientation {
            Orientation::Push => &self.downstream,
            Orientation::Pull => &self.upstream,
        }
    }
}

impl Topology for StaticTopology {
    fn lookup(&self, name: &str) -> Option<Node> {
        self.nodes.get(name).map(|entry| entry.node.clone())
    }

    fn orientation(&self, origin: &str) -> Result<Orientation, TopologyError> {
        if !self.nodes.contains_key(origin) {
            return Err(TopologyError::UnknownNode(origin.to_string()));
        }

        let connected = |edges: &FxHashMap<String, Vec<String>>| {
            edges.get(origin).is_some_and(|targets| !targets.is_empty())
        };

        if connected(&self.downstream) {
            Ok(Orientation::Push)
        } else if connected(&self.upstream) {
            Ok(Orientation::Pull)
        } else {
            Err(TopologyError::NotConnected(origin.to_string()))
        }
    }

    fn search(&self, origin: &str, orientation: Orientation) -> Result<Vec<Node>, TopologyError> {
        if !self.nodes.contains_key(origin) {
            return Err(TopologyError::UnknownNode(origin.to_string()));
        }

        let edges = self.edges(orientation);
        let mut found = Vec::new();
        let mut visited = FxHashSet::default();
        let mut pending = VecDeque::from([origin]);
        visited.insert(origin);

        while let Some(current) = pending.pop_front() {
            let Some(targets) = edges.get(current) else { continue };

            for target in targets {
                if !visited.insert(target.as_str()) {
                    continue;
                }

                let entry = self.nodes.get(target).ok_or_else(|| TopologyError::Disconnected {
                    from: current.to_string(),
                    to: target.clone(),
                })?;

                if entry.storage {
                    found.push(entry.node.clone());
                } else {
                    pending.push_back(target);
                }
            }
        }

        Ok(found)
    }
}
