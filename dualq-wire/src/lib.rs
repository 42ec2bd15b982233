#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod ecn;
pub use ecn::{EcnCodepoint, ECN_MASK};

mod packet;
pub use packet::{EcnPacket, IpPacket};
