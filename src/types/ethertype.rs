//! EtherType structure and definition of Well Known EtherTypes

use core::fmt;

use std::hash::Hash;

use serde::Serialize;

#[derive(PartialEq, Clone, Copy, Default, Hash, Eq, Serialize)]
pub struct EtherType(pub u16);

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl fmt::Debug for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<u16> for EtherType {
    fn from(value: u16) -> Self {
        EtherType(value)
    }
}

pub const ETHERTYPE_IP: EtherType = EtherType(0x0800_u16);
pub const ETHERTYPE_ARP: EtherType = EtherType(0x0806_u16);
pub const ETHERTYPE_IP6: EtherType = EtherType(0x86dd_u16);
