#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Dual-queue ECN admission control.
//!
//! Packets are split by ECN codepoint into a classical and a scalable (L4S) queue, each
//! admitted against the same occupancy limit. Every admission is timestamped into a
//! [`CouplingState`] shared with the marking algorithm that couples the two queues.

pub use dualq_common::{Clock, ManualClock, MonotonicClock};
pub use dualq_enqueue::*;
pub use dualq_wire::{EcnCodepoint, EcnPacket, IpPacket};
