//! Address Resolution Protocol (ARP) Handling

use core::convert::TryInto;

use serde::{Serialize, Serializer};

use crate::errors::Error;
use crate::layer::{Decoded, Layer};
use crate::types::{IPv4Address, MACAddress};

pub const ARP_HDR_LENGTH: usize = 28_usize;

pub const ARP_OPER_REQUEST: u16 = 1_u16;
pub const ARP_OPER_REPLY: u16 = 2_u16;

// Opcodes 1 and 2 have well-known names, everything else renders as the raw number.
fn serialize_oper<S>(oper: &u16, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match *oper {
        ARP_OPER_REQUEST => serializer.serialize_str("Request"),
        ARP_OPER_REPLY => serializer.serialize_str("Reply"),
        other => serializer.serialize_u16(other),
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ARP {
    #[serde(serialize_with = "crate::types::hex::serialize_upper_hex_u16")]
    htype: u16,
    #[serde(serialize_with = "crate::types::hex::serialize_upper_hex_u16")]
    ptype: u16,
    hlen: u8,
    plen: u8,
    #[serde(serialize_with = "serialize_oper")]
    oper: u16,
    sender_ha: MACAddress,
    sender_pa: IPv4Address,
    target_ha: MACAddress,
    target_pa: IPv4Address,
}

impl ARP {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<ARP>::default()
    }
}

impl Layer for ARP {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < ARP_HDR_LENGTH {
            return Err(Error::TooShort {
                required: ARP_HDR_LENGTH,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }

        self.htype = (bytes[0] as u16) << 8 | (bytes[1] as u16);
        self.ptype = (bytes[2] as u16) << 8 | (bytes[3] as u16);
        self.hlen = bytes[4];
        self.plen = bytes[5];
        self.oper = (bytes[6] as u16) << 8 | (bytes[7] as u16);
        self.sender_ha = bytes[8..14].try_into()?;
        self.sender_pa = bytes[14..18].try_into()?;
        self.target_ha = bytes[18..24].try_into()?;
        self.target_pa = bytes[24..28].try_into()?;

        Ok(Decoded::terminal(ARP_HDR_LENGTH))
    }

    fn name(&self) -> &'static str {
        "ARP"
    }

    fn short_name(&self) -> &'static str {
        "arp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_arp_request() {
        // who-has 10.0.0.2, from 10.0.0.1
        let array = hex::decode(
            "0001080006040001c401325800000a000001c402326b00000a000002",
        )
        .unwrap();

        let mut arp = ARP::default();
        let decoded = arp.decode_bytes(&array).unwrap();

        assert_eq!(decoded.consumed, ARP_HDR_LENGTH);
        assert_eq!(arp.oper, ARP_OPER_REQUEST);
        assert_eq!(format!("{}", arp.sender_pa), "10.0.0.1");
        assert_eq!(format!("{}", arp.target_pa), "10.0.0.2");

        let fields = serde_json::to_value(&arp).unwrap();
        assert_eq!(fields["oper"], "Request");
    }

    #[test]
    fn unknown_opcode_stays_numeric() {
        let mut array = hex::decode(
            "0001080006040001c401325800000a000001c402326b00000a000002",
        )
        .unwrap();
        array[7] = 9;

        let mut arp = ARP::default();
        arp.decode_bytes(&array).unwrap();
        let fields = serde_json::to_value(&arp).unwrap();
        assert_eq!(fields["oper"], 9);
    }

    #[test]
    fn short_buffer_fails() {
        let mut arp = ARP::default();
        assert!(arp.decode_bytes(&[0u8; 27]).is_err());
    }
}
