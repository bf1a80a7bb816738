//! IPv4 Layer

use core::convert::TryInto as _;

use serde::{Serialize, Serializer};

use crate::errors::Error;
use crate::layer::{Decoded, FragmentInfo, Layer, NextLayer};
use crate::types::IPv4Address;

/// Basic Length of the IPv4 Header when no options are present
pub const IPV4_BASE_HEADER_LENGTH: usize = 20_usize;

/// More-Fragments bit in the decoded 3-bit flags field.
pub const IPV4_FLAG_MF: u8 = 0x1_u8;

// Well-known protocol numbers render by name, the raw number is the fallback.
fn serialize_proto<S>(proto: &u8, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match *proto {
        1 => serializer.serialize_str("ICMP"),
        6 => serializer.serialize_str("TCP"),
        17 => serializer.serialize_str("UDP"),
        58 => serializer.serialize_str("ICMPv6"),
        89 => serializer.serialize_str("OSPF"),
        other => serializer.serialize_u8(other),
    }
}

/// Structure representing the IPv4 Header of a frame.
#[derive(Debug, Default, Serialize)]
pub struct IPv4 {
    version: u8,
    hdr_len: u8,
    tos: u8,
    len: u16,
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u16")]
    id: u16,
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u8")]
    flags: u8,
    frag_offset: u16,
    ttl: u8,
    #[serde(serialize_with = "serialize_proto")]
    proto: u8,
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u16")]
    checksum: u16,
    src_addr: IPv4Address,
    dst_addr: IPv4Address,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "hex::serde::serialize")]
    options: Vec<u8>,
}

impl IPv4 {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<IPv4>::default()
    }
}

impl Layer for IPv4 {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < IPV4_BASE_HEADER_LENGTH {
            return Err(Error::TooShort {
                required: IPV4_BASE_HEADER_LENGTH,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        self.version = bytes[0] >> 4;
        self.hdr_len = bytes[0] & 0x0f;

        // Header length is in 4-octet words, anything below 5 words is invalid.
        let hdr_len_bytes = self.hdr_len as usize * 4;
        if hdr_len_bytes < IPV4_BASE_HEADER_LENGTH {
            return Err(Error::ParseError(format!(
                "IPv4 header length {} below minimum 20",
                hdr_len_bytes
            )));
        }
        if bytes.len() < hdr_len_bytes {
            return Err(Error::TooShort {
                required: hdr_len_bytes,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        self.tos = bytes[1];
        self.len = u16::from_be_bytes(bytes[2..4].try_into().unwrap());
        self.id = u16::from_be_bytes(bytes[4..6].try_into().unwrap());
        let flags_offset = u16::from_be_bytes(bytes[6..8].try_into().unwrap());
        self.flags = (flags_offset >> 13) as u8;
        self.frag_offset = flags_offset & 0x1fff;
        self.ttl = bytes[8];
        self.proto = bytes[9];
        self.checksum = u16::from_be_bytes(bytes[10..12].try_into().unwrap());
        self.src_addr = bytes[12..16].try_into().unwrap();
        self.dst_addr = bytes[16..20].try_into().unwrap();
        self.options = bytes[IPV4_BASE_HEADER_LENGTH..hdr_len_bytes].to_vec();

        // The total-length field governs how much of the buffer belongs to this datagram;
        // truncated captures clamp to what is actually available.
        let payload_end = (self.len as usize).min(bytes.len()).max(hdr_len_bytes);

        let more_fragments = self.flags & IPV4_FLAG_MF != 0;
        let next = if more_fragments || self.frag_offset > 0 {
            NextLayer::Fragment(FragmentInfo {
                src: self.src_addr,
                dst: self.dst_addr,
                ident: self.id,
                offset: self.frag_offset as usize * 8,
                more_fragments,
                proto: self.proto,
            })
        } else {
            NextLayer::IpProto(self.proto)
        };

        Ok(Decoded {
            consumed: hdr_len_bytes,
            payload_end: Some(payload_end),
            next,
        })
    }

    fn name(&self) -> &'static str {
        "IPv4"
    }

    fn short_name(&self) -> &'static str {
        "ip"
    }
}
