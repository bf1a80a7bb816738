//! UDP Layer

use serde::Serialize;

use crate::errors::Error;
use crate::layer::{Decoded, Layer, NextLayer, Transport};

/// UDP header length
pub const UDP_HDR_LEN: usize = 8_usize;
/// IANA Assigned protocol number for UDP
pub const IPPROTO_UDP: u8 = 17_u8;

/// Structure representing the UDP Header.
#[derive(Debug, Default, Serialize)]
pub struct UDP {
    src_port: u16,
    dst_port: u16,
    length: u16,
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u16")]
    checksum: u16,
}

impl UDP {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<UDP>::default()
    }
}

impl Layer for UDP {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < UDP_HDR_LEN {
            return Err(Error::TooShort {
                required: UDP_HDR_LEN,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        self.src_port = (bytes[0] as u16) << 8 | (bytes[1] as u16);
        self.dst_port = (bytes[2] as u16) << 8 | (bytes[3] as u16);
        self.length = (bytes[4] as u16) << 8 | (bytes[5] as u16);
        self.checksum = (bytes[6] as u16) << 8 | (bytes[7] as u16);

        Ok(Decoded {
            consumed: UDP_HDR_LEN,
            payload_end: None,
            next: NextLayer::Ports {
                transport: Transport::Udp,
                src_port: self.src_port,
                dst_port: self.dst_port,
            },
        })
    }

    fn name(&self) -> &'static str {
        "UDP"
    }

    fn short_name(&self) -> &'static str {
        "udp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_header() {
        let bytes = hex::decode("0035db130008a1b2").unwrap();
        let mut udp = UDP::default();
        let decoded = udp.decode_bytes(&bytes).unwrap();

        assert_eq!(udp.src_port, 53);
        assert_eq!(udp.dst_port, 0xdb13);
        assert_eq!(udp.length, 8);
        assert_eq!(
            decoded.next,
            NextLayer::Ports {
                transport: Transport::Udp,
                src_port: 53,
                dst_port: 0xdb13,
            }
        );
    }

    #[test]
    fn short_buffer_fails() {
        let mut udp = UDP::default();
        assert!(udp.decode_bytes(&[0u8; 7]).is_err());
    }
}
