//! Handling of DNS layer

use serde::Serialize;

use crate::errors::Error;
use crate::layer::{Decoded, Layer};

/// DNS header length (id, flags, four counts)
pub const DNS_HEADER_LENGTH: usize = 12_usize;

// A compressed name may chain back-references; anything deeper than this is a pointer loop in
// hostile input, not a legitimate name.
const MAX_NAME_JUMPS: usize = 16_usize;

/// Structure representing a DNS message header plus the first query, when one is present.
#[derive(Debug, Default, Serialize)]
pub struct DNS {
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u16")]
    id: u16,
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u16")]
    flags: u16,
    qdcount: u16,
    ancount: u16,
    nscount: u16,
    arcount: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_type: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_class: Option<u16>,
}

impl DNS {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<DNS>::default()
    }

    // Decode one name starting at `offset`. A length byte either introduces a label, terminates
    // the name (0), or, with its top two bits set, encodes a 14-bit back-reference into the same
    // message where decoding continues. Returns the name and the bytes consumed at the original
    // position (a back-reference consumes exactly two).
    fn name_from_bytes(bytes: &[u8], offset: usize) -> Result<(String, usize), Error> {
        let mut labels: Vec<String> = Vec::new();
        let mut i = offset;
        let mut consumed = 0_usize;
        let mut jumped = false;
        let mut jumps = 0_usize;

        loop {
            if i >= bytes.len() {
                return Err(Error::TooShort {
                    required: i + 1,
                    available: bytes.len(),
                    data: hex::encode(bytes),
                });
            }
            let length = bytes[i] as usize;

            if length & 0xC0 == 0xC0 {
                if i + 1 >= bytes.len() {
                    return Err(Error::TooShort {
                        required: i + 2,
                        available: bytes.len(),
                        data: hex::encode(bytes),
                    });
                }
                jumps += 1;
                if jumps > MAX_NAME_JUMPS {
                    return Err(Error::ParseError(
                        "DNS name compression loop".to_string(),
                    ));
                }
                if !jumped {
                    consumed += 2;
                    jumped = true;
                }
                i = (length & 0x3F) << 8 | bytes[i + 1] as usize;
                continue;
            }

            if !jumped {
                consumed += 1 + length;
            }

            if length == 0 {
                break;
            }

            if i + 1 + length > bytes.len() {
                return Err(Error::TooShort {
                    required: i + 1 + length,
                    available: bytes.len(),
                    data: hex::encode(bytes),
                });
            }
            labels.push(String::from_utf8_lossy(&bytes[i + 1..i + 1 + length]).into_owned());
            i += 1 + length;
        }

        Ok((labels.join("."), consumed))
    }
}

impl Layer for DNS {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < DNS_HEADER_LENGTH {
            return Err(Error::TooShort {
                required: DNS_HEADER_LENGTH,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        self.id = (bytes[0] as u16) << 8 | (bytes[1] as u16);
        self.flags = (bytes[2] as u16) << 8 | (bytes[3] as u16);
        self.qdcount = (bytes[4] as u16) << 8 | (bytes[5] as u16);
        self.ancount = (bytes[6] as u16) << 8 | (bytes[7] as u16);
        self.nscount = (bytes[8] as u16) << 8 | (bytes[9] as u16);
        self.arcount = (bytes[10] as u16) << 8 | (bytes[11] as u16);

        let mut decoded = DNS_HEADER_LENGTH;

        if self.qdcount > 0 {
            let (name, consumed) = Self::name_from_bytes(bytes, decoded)?;
            decoded += consumed;

            if bytes.len() < decoded + 4 {
                return Err(Error::TooShort {
                    required: decoded + 4,
                    available: bytes.len(),
                    data: hex::encode(bytes),
                });
            }
            self.query_name = Some(name);
            self.query_type =
                Some((bytes[decoded] as u16) << 8 | (bytes[decoded + 1] as u16));
            self.query_class =
                Some((bytes[decoded + 2] as u16) << 8 | (bytes[decoded + 3] as u16));
            decoded += 4;
        }

        Ok(Decoded::terminal(decoded))
    }

    fn name(&self) -> &'static str {
        "DNS"
    }

    fn short_name(&self) -> &'static str {
        "dns"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query() {
        // standard query for www.google.com, type A, class IN
        let bytes = hex::decode(
            "f303010000010000000000000377777706676f6f676c6503636f6d0000010001",
        )
        .unwrap();

        let mut dns = DNS::default();
        let decoded = dns.decode_bytes(&bytes).unwrap();

        assert_eq!(dns.qdcount, 1);
        assert_eq!(dns.query_name.as_deref(), Some("www.google.com"));
        assert_eq!(dns.query_type, Some(1));
        assert_eq!(dns.query_class, Some(1));
        assert_eq!(decoded.consumed, bytes.len());
    }

    #[test]
    fn header_only_when_no_questions() {
        let bytes = hex::decode("f3038180000000010000000000").unwrap();
        let mut dns = DNS::default();
        dns.decode_bytes(&bytes).unwrap();
        assert!(dns.query_name.is_none());
    }

    #[test]
    fn compressed_name_resolves_through_back_reference() {
        // header with qdcount 1, name at offset 12 is a pointer to offset 18 where
        // "example.com" is spelled out after the question's type/class
        let mut bytes = hex::decode("abcd01000001000000000000").unwrap();
        bytes.extend_from_slice(&[0xC0, 0x12]); // pointer to offset 18
        bytes.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]); // type A, class IN
        bytes.extend_from_slice(b"\x07example\x03com\x00");

        let mut dns = DNS::default();
        dns.decode_bytes(&bytes).unwrap();
        assert_eq!(dns.query_name.as_deref(), Some("example.com"));
    }

    #[test]
    fn pointer_loop_is_an_error() {
        // name is a pointer to itself
        let mut bytes = hex::decode("abcd01000001000000000000").unwrap();
        bytes.extend_from_slice(&[0xC0, 0x0C]);

        let mut dns = DNS::default();
        match dns.decode_bytes(&bytes) {
            Err(Error::ParseError(_)) => {}
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn short_buffer_fails() {
        let mut dns = DNS::default();
        assert!(dns.decode_bytes(&[0u8; 11]).is_err());
    }
}
