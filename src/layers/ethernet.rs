//! Ethernet Layer

use core::convert::TryInto;

use serde::Serialize;

use crate::errors::Error;
use crate::layer::{Decoded, Layer, NextLayer};
use crate::types::{EtherType, MACAddress};

pub const ETH_HEADER_LENGTH: usize = 14_usize;

/// Structure representing the Ethernet Header of a frame.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Ethernet {
    dst_mac: MACAddress,
    src_mac: MACAddress,
    ethertype: EtherType,
}

impl Ethernet {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<Ethernet>::default()
    }
}

impl Layer for Ethernet {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        if bytes.len() < ETH_HEADER_LENGTH {
            return Err(Error::TooShort {
                required: ETH_HEADER_LENGTH,
                available: bytes.len(),
                data: hex::encode(bytes),
            });
        }
        self.dst_mac = bytes[0..6].try_into()?;
        self.src_mac = bytes[6..12].try_into()?;
        self.ethertype = EtherType((bytes[12] as u16) << 8 | bytes[13] as u16);

        Ok(Decoded {
            consumed: ETH_HEADER_LENGTH,
            payload_end: None,
            next: NextLayer::Ethertype(self.ethertype),
        })
    }

    fn name(&self) -> &'static str {
        "Ethernet"
    }

    fn short_name(&self) -> &'static str {
        "eth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_short_fails() {
        let mut eth = Ethernet::default();
        let res = eth.decode_bytes(&[0u8; 13]);
        assert!(res.is_err(), "{:?}", res.ok());
    }

    #[test]
    fn header_size_ok() {
        let bytes = hex::decode("aabbccddeeff1122334455660800").unwrap();
        let mut eth = Ethernet::default();
        let decoded = eth.decode_bytes(&bytes).unwrap();

        assert_eq!(decoded.consumed, ETH_HEADER_LENGTH);
        assert_eq!(decoded.next, NextLayer::Ethertype(EtherType(0x0800)));
        assert_eq!(format!("{}", eth.src_mac), "11:22:33:44:55:66");
        assert_eq!(format!("{}", eth.dst_mac), "aa:bb:cc:dd:ee:ff");
    }
}
