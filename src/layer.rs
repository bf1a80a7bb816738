//! 'Layer' trait
//!
//! [`Layer`] trait is central to [`lancet`][`crate`]. All the decoders for individual protocols
//! implement the `Layer` trait. Each Layer implements a `decode_bytes` function that returns the
//! result of parsing the given byte slice.

use core::fmt::Debug;

use erased_serde::serialize_trait_object;

use crate::errors::Error;
use crate::types::{EtherType, IPv4Address};

/// `Layer` Trait defines one decodable protocol layer in a frame.
///
/// Typically a Layer will correspond to the Data Link Layer, Network Layer, Transport Layer or
/// the Application Layer. Each of the supported 'protocols' has an implementation of this trait.
/// The `erased_serde::Serialize` bound is what lets a decoded layer be rendered into an ordered
/// field map by the dissector.
pub trait Layer: Send + Debug + erased_serde::Serialize {
    /// Main 'decoder' function.
    ///
    /// On success returns a [`Decoded`] describing how many bytes of the input belong to this
    /// layer's header, where this layer's payload ends, and a typed [`NextLayer`] selector the
    /// dissector resolves against its registry. A selector of [`NextLayer::None`] means no
    /// further decoding is possible; this is not an error, it happens for example for protocols
    /// that are not supported.
    ///
    /// Decoders must validate lengths before indexing and return
    /// [TooShort][`crate::errors::Error::TooShort`] (or
    /// [ParseError][`crate::errors::Error::ParseError`] for semantically invalid fields) instead
    /// of panicking on malformed input.
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error>;

    /// Name for the given layer.
    fn name(&self) -> &'static str;

    /// Short name for the given layer.
    fn short_name(&self) -> &'static str;
}

serialize_trait_object!(Layer);

/// Result of a successful `decode_bytes` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// Header bytes consumed by this layer. The next layer decodes from here.
    pub consumed: usize,
    /// End of this layer's payload within the input buffer. `None` means the payload extends to
    /// the end of the buffer. IPv4 uses this to clamp the payload to its `total_length` field.
    pub payload_end: Option<usize>,
    /// Selector for the next layer.
    pub next: NextLayer,
}

impl Decoded {
    /// A decode that consumed `consumed` bytes and selects nothing further.
    pub fn terminal(consumed: usize) -> Self {
        Decoded {
            consumed,
            payload_end: None,
            next: NextLayer::None,
        }
    }
}

/// Transport carrying the port pair of a [`NextLayer::Ports`] selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
}

/// Fragmentation detail reported by IPv4 for a fragmented datagram.
///
/// `offset` is already converted to bytes (the wire field counts 8-byte units).
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentInfo {
    pub src: IPv4Address,
    pub dst: IPv4Address,
    pub ident: u16,
    pub offset: usize,
    pub more_fragments: bool,
    pub proto: u8,
}

/// Typed selector a layer hands back to the dissector.
///
/// Scalars read out of the decoded header decide which decoder runs next; the dissector resolves
/// them against its [`LayerRegistry`][`crate::registry::LayerRegistry`]. Decoders themselves
/// never consult a registry.
#[derive(Debug, Clone, PartialEq)]
pub enum NextLayer {
    /// The link layer's type field selects an L3 decoder.
    Ethertype(EtherType),
    /// An IP protocol number / IPv6 next-header selects an L4 decoder.
    IpProto(u8),
    /// IPv4 reported a fragment; the payload goes through the reassembly buffer first.
    Fragment(FragmentInfo),
    /// An L4 port pair selects an application decoder.
    Ports {
        transport: Transport,
        src_port: u16,
        dst_port: u16,
    },
    /// ICMPv6 type 135/136: decode NDP over the same buffer this layer decoded from.
    Ndp,
    /// Nothing further to decode.
    None,
}
