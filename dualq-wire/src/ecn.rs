//! ECN codepoints as carried in the low two bits of the IPv4 TOS byte
//! and the IPv6 traffic class.

/// Mask selecting the ECN bits of a TOS / traffic class byte.
pub const ECN_MASK: u8 = 0b11;

/// The possible ECN codepoints of an IP header.
///
/// The discriminant is the wire value. `ECT(2)` is `0b01`, the codepoint RFC 9331 assigns to
/// L4S traffic, and `ECT(1)` is `0b10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EcnCodepoint {
    /// Not ECN-capable transport.
    NotEct = 0b00,
    /// ECN-capable transport, codepoint 2. Selects the scalable queue.
    Ect2 = 0b01,
    /// ECN-capable transport, codepoint 1.
    Ect1 = 0b10,
    /// Congestion experienced.
    Ce = 0b11,
}

impl EcnCodepoint {
    /// Extracts the codepoint from a full TOS / traffic class byte.
    #[inline]
    pub const fn from_tos(tos: u8) -> Self {
        match tos & ECN_MASK {
            0b00 => Self::NotEct,
            0b01 => Self::Ect2,
            0b10 => Self::Ect1,
            _ => Self::Ce,
        }
    }

    /// Returns `true` if packets with this codepoint belong to the scalable (L4S) queue.
    ///
    /// Only `ECT(2)` qualifies. `CE` is left for the downstream marking algorithm
    /// to interpret and is classified with the classical traffic.
    #[inline]
    pub const fn is_scalable(self) -> bool {
        matches!(self, Self::Ect2)
    }
}

impl TryFrom<u8> for EcnCodepoint {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b00 => Ok(EcnCodepoint::NotEct),
            0b01 => Ok(EcnCodepoint::Ect2),
            0b10 => Ok(EcnCodepoint::Ect1),
            0b11 => Ok(EcnCodepoint::Ce),
            _ => Err(value),
        }
    }
}

impl From<EcnCodepoint> for u8 {
    fn from(ecn: EcnCodepoint) -> Self {
        ecn as u8
    }
}
