//! Protocol decoders
//!
//! One module per protocol. Each [`crate::layer::Layer`] here decodes its own
//! header and hands back a [`crate::layer::NextLayer`] selector describing the
//! payload; the dissector resolves that selector against its
//! [`crate::registry::LayerRegistry`] to pick the next decoder. For example
//! [`ipv4::IPv4`] returns the IP protocol number from its header, which the
//! default registry maps to [`tcp::TCP`], [`udp::UDP`] and the ICMP decoders.

pub mod arp;
pub mod dhcp;
pub mod dns;
pub mod ethernet;
pub mod ftp;
pub mod http;
pub mod icmp;
pub mod icmpv6;
pub mod imap;
pub mod ipv4;
pub mod ipv6;
pub mod pop3;
pub mod smtp;
pub mod tcp;
pub mod udp;
