//! Lancet: a crate for dissecting captured network frames.
//!
//! The basic unit in lancet is a [`Dissection`], the layered result of decoding one raw frame.
//! A [`Dissector`] produces them: it walks a frame from the Ethernet header down through the
//! network, transport and application layers, choosing each decoder from the selector fields of
//! the layer above via its [`LayerRegistry`]. Every decoder is a struct implementing the
//! [`Layer`] trait.
//!
//! ```rust
//! use lancet::Dissector;
//!
//! let dissector = Dissector::new();
//! let frame = hex::decode("ffffffffffff00112233445508060001080006040001\
//!                          0011223344550a000001000000000000c0a8010a").unwrap();
//! let dissection = dissector.dissect(&frame);
//!
//! assert_eq!(dissection.summary, "ARP 10.0.0.1 -> 192.168.1.10");
//! ```
//!
//! IPv4 fragments are reassembled transparently inside the dissector through a
//! [`FragmentBuffer`]; a [`FilterChain`] can then accept or drop finished dissections.

pub mod errors;
pub mod layer;
pub mod layers;
pub mod types;

pub mod dissect;
pub mod filter;
pub mod reassembly;
pub mod registry;

pub use crate::errors::Error;
pub use crate::layer::{Decoded, FragmentInfo, Layer, NextLayer, Transport};
pub use crate::types::{EtherType, IPv4Address, IPv6Address, MACAddress};

pub use crate::dissect::{DissectedLayer, Dissection, Dissector, Timestamp};
pub use crate::filter::FilterChain;
pub use crate::reassembly::{FragmentBuffer, FragmentKey, Reassembly};
pub use crate::registry::LayerRegistry;
