//! MAC Address Type
//!
//! A Type representing a MAC Address as an array of `[u8; 6]`, rendered in the usual
//! colon-separated lower-hex text form.

use core::convert::TryFrom;
use core::fmt;

use serde::{Serialize, Serializer};

use crate::errors::Error as CrateError;

#[derive(Default, Clone, PartialEq, Eq)]
pub struct MACAddress([u8; 6]);

impl MACAddress {
    /// Returns a slice containing the entire inner array.
    pub const fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for MACAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(format!("{}", self).as_str())
    }
}

impl From<[u8; 6]> for MACAddress {
    fn from(value: [u8; 6]) -> Self {
        Self(value)
    }
}

impl TryFrom<&'_ [u8]> for MACAddress {
    type Error = CrateError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        if slice.len() != 6 {
            Err(CrateError::ParseError(format!(
                "MacAddress: {}",
                hex::encode(slice)
            )))
        } else {
            let mut m = MACAddress::default();
            m.0.copy_from_slice(slice);
            Ok(m)
        }
    }
}

impl fmt::Display for MACAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Debug for MACAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
