//! Frame dissection pipeline
//!
//! A [`Dissector`] owns a [`LayerRegistry`] and a [`FragmentBuffer`] and turns raw link-layer
//! frames into [`Dissection`]s. Decoding walks link, network, transport and application layers,
//! resolving each layer's [`NextLayer`] selector against the registry. A malformed layer below
//! the link layer never fails the whole frame; it degrades to a layer carrying a single
//! `"error"` field and dissection stops there.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::Error;
use crate::layer::{Layer, NextLayer};
use crate::layers::{ethernet, icmpv6};
use crate::reassembly::{FragmentBuffer, Reassembly};
use crate::registry::LayerRegistry;

/// Capture timestamp of a frame, as provided by the capture source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Timestamp {
    pub secs: i64,
    pub nsecs: u32,
}

/// One decoded layer: the protocol name and its ordered field map.
#[derive(Debug, Serialize)]
pub struct DissectedLayer {
    pub name: &'static str,
    pub fields: Map<String, Value>,
}

impl DissectedLayer {
    fn render(layer: &dyn Layer) -> Self {
        let fields = match serde_json::to_value(layer) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            name: layer.name(),
            fields,
        }
    }

    fn from_error(name: &'static str, err: &Error) -> Self {
        let mut fields = Map::new();
        fields.insert("error".to_string(), Value::String(err.to_string()));
        Self { name, fields }
    }

    fn unsupported(proto: u8) -> Self {
        let mut fields = Map::new();
        fields.insert("protocol".to_string(), Value::from(proto));
        Self {
            name: "Unsupported",
            fields,
        }
    }

    /// String field accessor; `None` when missing or not a string.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// The result of dissecting one frame: the ordered layers, the original bytes, a one-line
/// summary and the capture timestamp when one was given.
#[derive(Debug, Serialize)]
pub struct Dissection {
    pub layers: Vec<DissectedLayer>,
    #[serde(serialize_with = "hex::serde::serialize")]
    raw: Vec<u8>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl Dissection {
    /// First decoded layer with the given protocol name.
    pub fn layer(&self, name: &str) -> Option<&DissectedLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }
}

const APP_LAYER_NAMES: [&str; 7] = ["HTTP", "DNS", "DHCP", "FTP", "SMTP", "POP3", "IMAP"];

/// One-line summary, most specific information first: application detail, then the address
/// pair with the transport name, then the address pair, then the link type.
fn summarize(layers: &[DissectedLayer]) -> String {
    if let Some(arp) = layers.iter().find(|l| l.name == "ARP") {
        if let (Some(spa), Some(tpa)) = (arp.field("sender_pa"), arp.field("target_pa")) {
            return format!("ARP {} -> {}", spa, tpa);
        }
    }

    let l3 = layers
        .iter()
        .find(|l| l.name == "IPv4" || l.name == "IPv6");
    let endpoints = l3.and_then(|l| {
        match (l.field("src_addr"), l.field("dst_addr")) {
            (Some(src), Some(dst)) => Some((src, dst)),
            _ => None,
        }
    });

    if let Some((src, dst)) = endpoints {
        if let Some(hint) = app_hint(layers) {
            return format!("{} -> {} {}", src, dst, hint);
        }
        if let Some(l4) = layers.iter().find(|l| l.name == "TCP" || l.name == "UDP") {
            return format!("{} -> {} {}", src, dst, l4.name);
        }
        return format!("{} -> {}", src, dst);
    }

    if let Some(eth) = layers.iter().find(|l| l.name == "Ethernet") {
        if let Some(eth_type) = eth.fields.get("ethertype").and_then(Value::as_u64) {
            return format!("0x{:04X}", eth_type);
        }
    }
    "unrecognized frame".to_string()
}

fn app_hint(layers: &[DissectedLayer]) -> Option<String> {
    let app = layers
        .iter()
        .find(|l| APP_LAYER_NAMES.contains(&l.name))?;
    match app.name {
        "HTTP" => {
            if let (Some(method), Some(path)) = (app.field("method"), app.field("path")) {
                return Some(format!("{} {}", method, path));
            }
            if let (Some(code), Some(reason)) = (app.field("status_code"), app.field("reason")) {
                return Some(format!("HTTP {} {}", code, reason));
            }
            Some("HTTP".to_string())
        }
        "DNS" => match app.field("query_name") {
            Some(name) => Some(format!("DNS query {}", name)),
            None => Some("DNS".to_string()),
        },
        name => Some(name.to_string()),
    }
}

/// Dissects frames against a fixed decoder registry.
///
/// A `Dissector` is `Send + Sync`; capture workers share one instance behind an `Arc` so that
/// fragments of the same datagram arriving on different workers meet in the same
/// [`FragmentBuffer`].
#[derive(Default)]
pub struct Dissector {
    registry: LayerRegistry,
    fragments: FragmentBuffer,
}

impl Dissector {
    /// A dissector with all built-in decoders registered.
    pub fn new() -> Self {
        Self::with_registry(LayerRegistry::with_defaults())
    }

    /// A dissector over a caller-assembled registry.
    pub fn with_registry(registry: LayerRegistry) -> Self {
        Self {
            registry,
            fragments: FragmentBuffer::new(),
        }
    }

    /// The reassembly buffer, exposed so a capture session can evict stale datagrams.
    pub fn fragments(&self) -> &FragmentBuffer {
        &self.fragments
    }

    /// Dissect one frame without a capture timestamp.
    pub fn dissect(&self, bytes: &[u8]) -> Dissection {
        self.dissect_at(bytes, None)
    }

    /// Dissect one frame. Always returns a [`Dissection`]; malformed input shows up as error
    /// layers or a diagnostic summary, never as a panic or an `Err`.
    pub fn dissect_at(&self, bytes: &[u8], timestamp: Option<Timestamp>) -> Dissection {
        let mut layers: Vec<DissectedLayer> = Vec::new();

        let done = |layers: Vec<DissectedLayer>, summary: Option<String>| {
            let summary = summary.unwrap_or_else(|| summarize(&layers));
            Dissection {
                layers,
                raw: bytes.to_vec(),
                summary,
                timestamp,
            }
        };

        // link layer
        let mut eth = ethernet::Ethernet::creator();
        let link = match eth.decode_bytes(bytes) {
            Ok(decoded) => decoded,
            Err(_) => {
                log::debug!("undecodable frame of {} bytes", bytes.len());
                let summary = format!("frame too short ({} bytes)", bytes.len());
                return done(layers, Some(summary));
            }
        };
        layers.push(DissectedLayer::render(eth.as_ref()));

        let eth_type = match link.next {
            NextLayer::Ethertype(eth_type) => eth_type,
            _ => return done(layers, None),
        };

        // network layer
        let mut l3 = match self.registry.l3_layer(eth_type) {
            Some(l3) => l3,
            None => {
                log::trace!("no decoder for ethertype {}", eth_type);
                return done(layers, Some(eth_type.to_string()));
            }
        };
        let l3_input = &bytes[link.consumed..];
        let l3_decoded = match l3.decode_bytes(l3_input) {
            Ok(decoded) => decoded,
            Err(e) => {
                layers.push(DissectedLayer::from_error(l3.name(), &e));
                return done(layers, None);
            }
        };
        layers.push(DissectedLayer::render(l3.as_ref()));

        let payload_end = l3_decoded
            .payload_end
            .unwrap_or(l3_input.len())
            .min(l3_input.len());
        let l3_payload = &l3_input[l3_decoded.consumed.min(payload_end)..payload_end];

        // fragments detour through the reassembly buffer
        let reassembled: Vec<u8>;
        let (proto, l4_input): (u8, &[u8]) = match l3_decoded.next {
            NextLayer::IpProto(proto) => (proto, l3_payload),
            NextLayer::Fragment(info) => match self.fragments.insert(&info, l3_payload) {
                Reassembly::Incomplete => {
                    let summary = format!(
                        "{} -> {} fragment (offset {})",
                        info.src, info.dst, info.offset
                    );
                    return done(layers, Some(summary));
                }
                Reassembly::Complete(datagram) => {
                    reassembled = datagram;
                    (info.proto, reassembled.as_slice())
                }
            },
            _ => return done(layers, None),
        };

        // transport layer
        let mut l4 = match self.registry.l4_layer(proto) {
            Some(l4) => l4,
            None => {
                layers.push(DissectedLayer::unsupported(proto));
                return done(layers, None);
            }
        };
        let l4_decoded = match l4.decode_bytes(l4_input) {
            Ok(decoded) => decoded,
            Err(e) => {
                layers.push(DissectedLayer::from_error(l4.name(), &e));
                return done(layers, None);
            }
        };
        layers.push(DissectedLayer::render(l4.as_ref()));

        let (transport, src_port, dst_port) = match l4_decoded.next {
            NextLayer::Ports {
                transport,
                src_port,
                dst_port,
            } => (transport, src_port, dst_port),
            NextLayer::Ndp => {
                // neighbor discovery decodes the same buffer ICMPv6 just did
                let mut ndp = icmpv6::NDP::creator();
                match ndp.decode_bytes(l4_input) {
                    Ok(_) => layers.push(DissectedLayer::render(ndp.as_ref())),
                    Err(e) => layers.push(DissectedLayer::from_error("NDP", &e)),
                }
                return done(layers, None);
            }
            _ => return done(layers, None),
        };

        // application layer, picked by port
        let l4_end = l4_decoded
            .payload_end
            .unwrap_or(l4_input.len())
            .min(l4_input.len());
        let app_input = &l4_input[l4_decoded.consumed.min(l4_end)..l4_end];
        if !app_input.is_empty() {
            if let Some(mut app) = self.registry.app_layer(transport, src_port, dst_port) {
                match app.decode_bytes(app_input) {
                    Ok(_) => layers.push(DissectedLayer::render(app.as_ref())),
                    Err(e) => {
                        let name = app.name();
                        layers.push(DissectedLayer::from_error(name, &e));
                    }
                }
            }
        }

        done(layers, None)
    }
}
