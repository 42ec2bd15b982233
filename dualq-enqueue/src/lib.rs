#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use thiserror::Error;

mod bind;
pub use bind::{bind, BindError, Binding, BindingMode, BoundQueue};

mod coupling;
pub use coupling::CouplingState;

mod enqueue;
pub use enqueue::{Action, Class, EcnEnqueue};

mod occupancy;

mod options;
pub use options::{ConfigError, EnqueueOptions};

mod output;
pub use output::{Output, Outputs, Overflow};

mod queue;
pub use queue::{Node, QueueSink};

mod stats;
pub use stats::{EnqueueStats, StatsSnapshot};

pub mod topology;
pub use topology::{Orientation, StaticTopology, Topology, TopologyError};

/// Errors that keep an enqueue controller from becoming operational.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("binding error: {0}")]
    Bind(#[from] BindError),
}

pub type Result<T> = std::result::Result<T, Error>;
