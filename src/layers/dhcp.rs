//! DHCPv4 (BOOTP frame plus options)

use core::convert::TryInto;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::errors::Error;
use crate::layer::{Decoded, Layer};
use crate::types::{IPv4Address, MACAddress};

/// Fixed BOOTP frame length; options follow.
pub const BOOTP_FRAME_LENGTH: usize = 236_usize;

const MAGIC_COOKIE: [u8; 4] = [0x63, 0x82, 0x53, 0x63];

pub const DHCP_OPTION_PAD: u8 = 0_u8;
pub const DHCP_OPTION_SUBNET_MASK: u8 = 1_u8;
pub const DHCP_OPTION_HOSTNAME: u8 = 12_u8;
pub const DHCP_OPTION_REQUESTED_IP: u8 = 50_u8;
pub const DHCP_OPTION_MESSAGE_TYPE: u8 = 53_u8;
pub const DHCP_OPTION_SERVER_ID: u8 = 54_u8;
pub const DHCP_OPTION_END: u8 = 255_u8;

fn message_type_name(value: u8) -> Option<&'static str> {
    match value {
        1 => Some("DISCOVER"),
        2 => Some("OFFER"),
        3 => Some("REQUEST"),
        4 => Some("DECLINE"),
        5 => Some("ACK"),
        6 => Some("NAK"),
        7 => Some("RELEASE"),
        8 => Some("INFORM"),
        _ => None,
    }
}

/// Structure representing a DHCP message: the fixed BOOTP fields plus rendered options.
#[derive(Debug, Default, Serialize)]
pub struct DHCP {
    op: u8,
    htype: u8,
    hlen: u8,
    hops: u8,
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u32")]
    xid: u32,
    secs: u16,
    #[serde(serialize_with = "crate::types::hex::serialize_lower_hex_u16")]
    flags: u16,
    ciaddr: IPv4Address,
    yiaddr: IPv4Address,
    siaddr: IPv4Address,
    giaddr: IPv4Address,
    chaddr: MACAddress,
    options: Map<String, Value>,
}

impl DHCP {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<DHCP>::default()
    }

    // Options are (code, length, value) triplets terminated by code 255; code 0 is a single pad
    // byte. Well-known codes get a human-readable rendering, everything else a raw byte list.
    fn options_from_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut i = 0_usize;

        if bytes.len() >= 4 && bytes[..4] == MAGIC_COOKIE {
            i = 4;
        }

        while i < bytes.len() {
            let code = bytes[i];
            if code == DHCP_OPTION_END {
                i += 1;
                break;
            }
            if code == DHCP_OPTION_PAD {
                i += 1;
                continue;
            }
            if i + 1 >= bytes.len() {
                break;
            }
            let length = bytes[i + 1] as usize;
            if i + 2 + length > bytes.len() {
                // truncated option area, stop here
                break;
            }
            let value = &bytes[i + 2..i + 2 + length];
            self.render_option(code, value);
            i += 2 + length;
        }

        i
    }

    fn render_option(&mut self, code: u8, value: &[u8]) {
        match code {
            DHCP_OPTION_MESSAGE_TYPE if value.len() == 1 => {
                let rendered = match message_type_name(value[0]) {
                    Some(name) => json!(name),
                    None => json!(value[0]),
                };
                self.options.insert("DHCP Message Type".to_string(), rendered);
            }
            DHCP_OPTION_SUBNET_MASK if value.len() == 4 => {
                let mask: IPv4Address = value.try_into().unwrap();
                self.options
                    .insert("Subnet Mask".to_string(), json!(format!("{}", mask)));
            }
            DHCP_OPTION_REQUESTED_IP | DHCP_OPTION_SERVER_ID if value.len() == 4 => {
                let addr: IPv4Address = value.try_into().unwrap();
                self.options
                    .insert(format!("Option {}", code), json!(format!("{}", addr)));
            }
            DHCP_OPTION_HOSTNAME => {
                self.options.insert(
                    "Hostname".to_string(),
                    json!(String::from_utf8_lossy(value).into_owned()),
                );
            }
            _ => {
                self.options
                    .insert(format!("Option {}", code), json!(value.to_vec()));
            }
        }
    }
}

impl Layer for DHCP {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < BOOTP_FRAME_LENGTH {
            return Err(Error::TooShort {
                required: BOOTP_FRAME_LENGTH,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        self.op = bytes[0];
        self.htype = bytes[1];
        self.hlen = bytes[2];
        self.hops = bytes[3];
        self.xid = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
        self.secs = (bytes[8] as u16) << 8 | (bytes[9] as u16);
        self.flags = (bytes[10] as u16) << 8 | (bytes[11] as u16);
        self.ciaddr = bytes[12..16].try_into()?;
        self.yiaddr = bytes[16..20].try_into()?;
        self.siaddr = bytes[20..24].try_into()?;
        self.giaddr = bytes[24..28].try_into()?;
        // chaddr field is 16 bytes; only the first hlen (normally 6) are the address
        self.chaddr = if self.hlen == 6 {
            bytes[28..34].try_into()?
        } else {
            MACAddress::default()
        };

        let consumed =
            BOOTP_FRAME_LENGTH + self.options_from_bytes(&bytes[BOOTP_FRAME_LENGTH..]);

        Ok(Decoded::terminal(consumed))
    }

    fn name(&self) -> &'static str {
        "DHCP"
    }

    fn short_name(&self) -> &'static str {
        "dhcp"
    }
}
