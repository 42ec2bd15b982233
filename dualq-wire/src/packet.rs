use bytes::Bytes;
use pnet::packet::{
    ip::IpNextHeaderProtocols, ipv4::Ipv4Packet, ipv6::Ipv6Packet, tcp::TcpPacket, Packet,
};

use crate::EcnCodepoint;

/// Minimum IPv4 header length, in 32-bit words.
const IPV4_MIN_IHL: u8 = 5;

/// A packet that can report the ECN codepoint of its IP header.
pub trait EcnPacket {
    /// Returns the ECN codepoint of the packet, or `None` if the packet does not carry
    /// both a network (IP) and a transport (TCP) header.
    fn ecn(&self) -> Option<EcnCodepoint>;

    /// Returns `true` if the packet should be handled by the scalable (L4S) queue.
    ///
    /// Packets without headers are never scalable.
    #[inline]
    fn is_scalable(&self) -> bool {
        self.ecn().is_some_and(EcnCodepoint::is_scalable)
    }
}

/// A raw IP packet, starting at the network header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpPacket {
    data: Bytes,
}

impl IpPacket {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Returns the raw packet bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn ipv4_ecn(data: &[u8]) -> Option<EcnCodepoint> {
        let ip = Ipv4Packet::new(data)?;
        let header_len = ip.get_header_length();
        if header_len < IPV4_MIN_IHL || header_len as usize * 4 > data.len() {
            return None;
        }

        if ip.get_next_level_protocol() != IpNextHeaderProtocols::Tcp {
            return None;
        }
        TcpPacket::new(ip.payload())?;

        Some(EcnCodepoint::from_tos(ip.get_ecn()))
    }

    fn ipv6_ecn(data: &[u8]) -> Option<EcnCodepoint> {
        let ip = Ipv6Packet::new(data)?;
        if ip.get_next_header() != IpNextHeaderProtocols::Tcp {
            return None;
        }
        TcpPacket::new(ip.payload())?;

        Some(EcnCodepoint::from_tos(ip.get_traffic_class()))
    }
}

impl From<Bytes> for IpPacket {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl EcnPacket for IpPacket {
    fn ecn(&self) -> Option<EcnCodepoint> {
        let version = self.data.first()? >> 4;
        match version {
            4 => Self::ipv4_ecn(&self.data),
            6 => Self::ipv6_ecn(&self.data),
            _ => None,
        }
    }
}
