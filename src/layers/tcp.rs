//! TCP Layer

use core::convert::TryInto;
use core::fmt;

use serde::{Serialize, Serializer};

use crate::errors::Error;
use crate::layer::{Decoded, Layer, NextLayer, Transport};

/// TCP base header length
pub const TCP_BASE_HDR_LEN: usize = 20_usize;
/// IANA Assigned protocol number for TCP
pub const IPPROTO_TCP: u8 = 6_u8;

// Flag names in ascending bit order, FIN is bit 0 and NS bit 8.
const TCP_FLAG_NAMES: [&str; 9] = [
    "FIN", "SYN", "RST", "PSH", "ACK", "URG", "ECE", "CWR", "NS",
];

/// The 9 flag bits of the TCP header, rendered as the list of set flag names.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TcpFlags(pub u16);

impl TcpFlags {
    pub fn names(&self) -> Vec<&'static str> {
        TCP_FLAG_NAMES
            .iter()
            .enumerate()
            .filter(|(bit, _)| self.0 & (1 << bit) != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(","))
    }
}

impl Serialize for TcpFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.names())
    }
}

/// Structure representing the TCP Header.
#[derive(Debug, Default, Serialize)]
pub struct TCP {
    src_port: u16,
    dst_port: u16,
    seq_no: u32,
    ack_no: u32,
    hdr_len: u8,
    flags: TcpFlags,
    window_size: u16,
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u16")]
    checksum: u16,
    urgent_ptr: u16,
}

impl TCP {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<TCP>::default()
    }
}

impl Layer for TCP {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < TCP_BASE_HDR_LEN {
            return Err(Error::TooShort {
                required: TCP_BASE_HDR_LEN,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        self.src_port = (bytes[0] as u16) << 8 | (bytes[1] as u16);
        self.dst_port = (bytes[2] as u16) << 8 | (bytes[3] as u16);
        self.seq_no = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
        self.ack_no = u32::from_be_bytes(bytes[8..12].try_into().unwrap());

        // Data offset is the top 4 bits of the same 16-bit word whose low 9 bits are the flags;
        // it counts 4-octet words.
        let offset_flags = u16::from_be_bytes(bytes[12..14].try_into().unwrap());
        self.hdr_len = ((offset_flags >> 12) as u8) * 4;
        self.flags = TcpFlags(offset_flags & 0x01FF);
        self.window_size = (bytes[14] as u16) << 8 | (bytes[15] as u16);
        self.checksum = (bytes[16] as u16) << 8 | (bytes[17] as u16);
        self.urgent_ptr = (bytes[18] as u16) << 8 | (bytes[19] as u16);

        let consumed = (self.hdr_len as usize).max(TCP_BASE_HDR_LEN).min(bytes.len());

        Ok(Decoded {
            consumed,
            payload_end: None,
            next: NextLayer::Ports {
                transport: Transport::Tcp,
                src_port: self.src_port,
                dst_port: self.dst_port,
            },
        })
    }

    fn name(&self) -> &'static str {
        "TCP"
    }

    fn short_name(&self) -> &'static str {
        "tcp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_syn_segment() {
        // src 44510, dst 80, data offset 8 words, SYN
        let bytes = hex::decode(
            "adde00500cc300000000000080022000da470000020405b40402080a000000000000000001030307",
        )
        .unwrap();

        let mut tcp = TCP::default();
        let decoded = tcp.decode_bytes(&bytes).unwrap();

        assert_eq!(tcp.src_port, 0xadde);
        assert_eq!(tcp.dst_port, 80);
        assert_eq!(tcp.hdr_len, 32);
        assert_eq!(decoded.consumed, 32);
        assert_eq!(tcp.flags.names(), vec!["SYN"]);
    }

    #[test]
    fn flag_names_ascend_from_fin() {
        let flags = TcpFlags(0b1_1111_1111);
        assert_eq!(
            flags.names(),
            vec!["FIN", "SYN", "RST", "PSH", "ACK", "URG", "ECE", "CWR", "NS"]
        );

        let syn_ack = TcpFlags(0x012);
        assert_eq!(syn_ack.names(), vec!["SYN", "ACK"]);
    }

    #[test]
    fn short_buffer_fails() {
        let mut tcp = TCP::default();
        assert!(tcp.decode_bytes(&[0u8; 19]).is_err());
    }
}
