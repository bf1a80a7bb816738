//! Definition of IP Address Types
//!
//! This module defines types for IPv4 and IPv6 which are simply based on the u8/u16 arrays. Both
//! render through `Display` and serialize as their text form, so a dissected layer's field map
//! carries `"192.168.1.10"` rather than raw bytes.

use core::convert::TryFrom;
use core::fmt;

use serde::{Serialize, Serializer};

use crate::errors::Error as CrateError;

#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IPv4Address([u8; 4]);

impl IPv4Address {
    pub const fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 4]> for IPv4Address {
    fn from(value: [u8; 4]) -> Self {
        Self(value)
    }
}

impl TryFrom<&'_ [u8]> for IPv4Address {
    type Error = CrateError;

    fn try_from(slice: &'_ [u8]) -> Result<Self, Self::Error> {
        if slice.len() != 4 {
            Err(CrateError::ParseError(format!(
                "IPv4Address: {}",
                hex::encode(slice)
            )))
        } else {
            let mut ip = IPv4Address::default();
            ip.0.copy_from_slice(slice);
            Ok(ip)
        }
    }
}

impl fmt::Display for IPv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl fmt::Debug for IPv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for IPv4Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(format!("{}", self).as_str())
    }
}

#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IPv6Address([u16; 8]);

impl IPv6Address {
    pub const fn segments(&self) -> &[u16; 8] {
        &self.0
    }
}

impl TryFrom<&'_ [u8]> for IPv6Address {
    type Error = CrateError;

    fn try_from(slice: &'_ [u8]) -> Result<Self, Self::Error> {
        if slice.len() != 16 {
            Err(CrateError::ParseError(format!(
                "IPv6Address: {}",
                hex::encode(slice)
            )))
        } else {
            let mut ip = IPv6Address::default();
            for i in 0..8 {
                ip.0[i] = (slice[2 * i] as u16) << 8 | (slice[2 * i + 1] as u16);
            }
            Ok(ip)
        }
    }
}

impl TryFrom<&'_ [u16]> for IPv6Address {
    type Error = CrateError;

    fn try_from(slice: &'_ [u16]) -> Result<Self, Self::Error> {
        if slice.len() != 8 {
            Err(CrateError::ParseError(format!("IPv6Address: {:?}", slice)))
        } else {
            let mut ip = IPv6Address::default();
            ip.0.copy_from_slice(slice);
            Ok(ip)
        }
    }
}

// RFC 5952 text form: the longest run of all-zero groups, if at least two groups long, collapses
// to "::". Ties go to the first run.
impl fmt::Display for IPv6Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut best_start = 0_usize;
        let mut best_len = 0_usize;
        let mut run_start = 0_usize;
        let mut run_len = 0_usize;

        for (i, group) in self.0.iter().enumerate() {
            if *group == 0 {
                if run_len == 0 {
                    run_start = i;
                }
                run_len += 1;
                if run_len > best_len {
                    best_start = run_start;
                    best_len = run_len;
                }
            } else {
                run_len = 0;
            }
        }

        if best_len < 2 {
            for (i, group) in self.0.iter().enumerate() {
                if i > 0 {
                    write!(f, ":")?;
                }
                write!(f, "{:x}", group)?;
            }
            return Ok(());
        }

        for (i, group) in self.0[..best_start].iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{:x}", group)?;
        }
        write!(f, "::")?;
        for (i, group) in self.0[best_start + best_len..].iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{:x}", group)?;
        }

        Ok(())
    }
}

impl fmt::Debug for IPv6Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for IPv6Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(format!("{}", self).as_str())
    }
}
