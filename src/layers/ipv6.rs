//! IPv6 Layer

use core::convert::TryInto;

use serde::Serialize;

use crate::errors::Error;
use crate::layer::{Decoded, Layer, NextLayer};
use crate::types::IPv6Address;

pub const IPV6_BASE_HDR_LEN: usize = 40_usize;

/// Structure representing the fixed IPv6 Header.
#[derive(Debug, Default, Clone, Serialize)]
pub struct IPv6 {
    version: u8,
    traffic_class: u8,
    flow_label: u32,
    payload_len: u16,
    next_hdr: u8,
    hop_limit: u8,
    src_addr: IPv6Address,
    dst_addr: IPv6Address,
}

impl IPv6 {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<IPv6>::default()
    }
}

impl Layer for IPv6 {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < IPV6_BASE_HDR_LEN {
            return Err(Error::TooShort {
                required: IPV6_BASE_HDR_LEN,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        // First 32-bit word: 4 bits version, 8 bits traffic class, 20 bits flow label.
        self.version = bytes[0] >> 4;
        self.traffic_class = ((bytes[0] & 0x0F) << 4) | (bytes[1] >> 4);
        self.flow_label =
            ((bytes[1] & 0x0F) as u32) << 16 | (bytes[2] as u32) << 8 | (bytes[3] as u32);
        self.payload_len = (bytes[4] as u16) << 8 | (bytes[5] as u16);
        self.next_hdr = bytes[6];
        self.hop_limit = bytes[7];
        self.src_addr = bytes[8..24].try_into()?;
        self.dst_addr = bytes[24..40].try_into()?;

        Ok(Decoded {
            consumed: IPV6_BASE_HDR_LEN,
            payload_end: None,
            next: NextLayer::IpProto(self.next_hdr),
        })
    }

    fn name(&self) -> &'static str {
        "IPv6"
    }

    fn short_name(&self) -> &'static str {
        "ip6"
    }
}
