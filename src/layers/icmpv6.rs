//! ICMPv6 Datagram, including the NDP messages carried in it

use core::convert::TryInto;

use serde::Serialize;

use crate::errors::Error;
use crate::layer::{Decoded, Layer, NextLayer};
use crate::types::IPv6Address;

/// IANA Assigned protocol number for ICMPv6
pub const IPPROTO_ICMPV6: u8 = 58_u8;
/// ICMPv6 header length (type, code, checksum)
pub const ICMPV6_HEADER_LENGTH: usize = 4_usize;

pub const ICMPV6_NEIGHBOR_SOLICITATION: u8 = 135_u8;
pub const ICMPV6_NEIGHBOR_ADVERTISEMENT: u8 = 136_u8;

/// Structure representing the ICMPv6 Header.
#[derive(Default, Debug, Serialize)]
pub struct ICMPv6 {
    #[serde(rename = "type")]
    icmpv6_type: u8,
    code: u8,
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u16")]
    checksum: u16,
}

impl ICMPv6 {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<ICMPv6>::default()
    }
}

impl Layer for ICMPv6 {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < ICMPV6_HEADER_LENGTH {
            return Err(Error::TooShort {
                required: ICMPV6_HEADER_LENGTH,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        self.icmpv6_type = bytes[0];
        self.code = bytes[1];
        self.checksum = (bytes[2] as u16) << 8 | (bytes[3] as u16);

        // Neighbor solicitation/advertisement additionally decode as NDP, over this same buffer.
        let next = match self.icmpv6_type {
            ICMPV6_NEIGHBOR_SOLICITATION | ICMPV6_NEIGHBOR_ADVERTISEMENT => NextLayer::Ndp,
            _ => NextLayer::None,
        };

        Ok(Decoded {
            consumed: ICMPV6_HEADER_LENGTH,
            payload_end: None,
            next,
        })
    }

    fn name(&self) -> &'static str {
        "ICMPv6"
    }

    fn short_name(&self) -> &'static str {
        "icmp6"
    }
}

/// Neighbor Discovery message: the message type plus the 16-byte target address found at byte
/// offset 8 of the ICMPv6 buffer.
#[derive(Default, Debug, Serialize)]
pub struct NDP {
    ndp_type: u8,
    target: IPv6Address,
}

impl NDP {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<NDP>::default()
    }
}

impl Layer for NDP {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < 24 {
            return Err(Error::TooShort {
                required: 24,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        self.ndp_type = bytes[0];
        self.target = bytes[8..24].try_into()?;

        Ok(Decoded::terminal(24))
    }

    fn name(&self) -> &'static str {
        "NDP"
    }

    fn short_name(&self) -> &'static str {
        "ndp"
    }
}
