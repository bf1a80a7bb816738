//! ICMP Datagram

use serde::Serialize;

use crate::errors::Error;
use crate::layer::{Decoded, Layer};

/// IANA Assigned protocol number for ICMP
pub const IPPROTO_ICMP: u8 = 1_u8;
/// ICMP header length (type, code, checksum)
pub const ICMP_HEADER_LENGTH: usize = 4_usize;

/// ICMP types
pub const ICMP_ECHO_REPLY: u8 = 0_u8;
pub const ICMP_DESTINATION_UNREACHABLE: u8 = 3_u8;
pub const ICMP_SOURCE_QUENCH: u8 = 4_u8;
pub const ICMP_REDIRECT: u8 = 5_u8;
pub const ICMP_ECHO_REQUEST: u8 = 8_u8;
pub const ICMP_TIME_EXCEEDED: u8 = 11_u8;
pub const ICMP_PARAMETER_PROBLEM: u8 = 12_u8;

fn type_description(icmp_type: u8) -> String {
    match icmp_type {
        ICMP_ECHO_REPLY => "Echo (ping) reply".to_string(),
        ICMP_DESTINATION_UNREACHABLE => "Destination Unreachable".to_string(),
        ICMP_SOURCE_QUENCH => "Source Quench".to_string(),
        ICMP_REDIRECT => "Redirect".to_string(),
        ICMP_ECHO_REQUEST => "Echo (ping) request".to_string(),
        ICMP_TIME_EXCEEDED => "Time Exceeded".to_string(),
        ICMP_PARAMETER_PROBLEM => "Parameter Problem".to_string(),
        other => format!("{}", other),
    }
}

/// Structure representing the ICMP Header
#[derive(Default, Debug, Serialize)]
pub struct ICMP {
    #[serde(rename = "type")]
    icmp_type: u8,
    code: u8,
    description: String,
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u16")]
    checksum: u16,
}

impl ICMP {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<ICMP>::default()
    }
}

impl Layer for ICMP {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < ICMP_HEADER_LENGTH {
            return Err(Error::TooShort {
                required: ICMP_HEADER_LENGTH,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        self.icmp_type = bytes[0];
        self.code = bytes[1];
        self.checksum = (bytes[2] as u16) << 8 | (bytes[3] as u16);
        self.description = type_description(self.icmp_type);

        Ok(Decoded::terminal(ICMP_HEADER_LENGTH))
    }

    fn name(&self) -> &'static str {
        "ICMP"
    }

    fn short_name(&self) -> &'static str {
        "icmp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_echo_request() {
        let bytes = hex::decode("08004d5600010001").unwrap();
        let mut icmp = ICMP::default();
        let decoded = icmp.decode_bytes(&bytes).unwrap();

        assert_eq!(decoded.consumed, ICMP_HEADER_LENGTH);
        assert_eq!(icmp.icmp_type, ICMP_ECHO_REQUEST);
        assert_eq!(icmp.description, "Echo (ping) request");
    }

    #[test]
    fn unknown_type_renders_raw_number() {
        let bytes = hex::decode("2a000000").unwrap();
        let mut icmp = ICMP::default();
        icmp.decode_bytes(&bytes).unwrap();
        assert_eq!(icmp.description, "42");
    }

    #[test]
    fn short_buffer_fails() {
        let mut icmp = ICMP::default();
        assert!(icmp.decode_bytes(&[8u8, 0, 0]).is_err());
    }
}
