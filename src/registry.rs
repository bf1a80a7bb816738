//! Decoder registry
//!
//! Maps the numeric selector fields found in decoded headers (ethertype, IP protocol number,
//! transport port) to the decoder that handles the next layer. A registry is plain data owned by
//! a [`Dissector`][`crate::dissect::Dissector`] instance: two dissection pipelines (say, one per
//! test) can carry different decoder sets without any process-wide state.

use std::collections::HashMap;

use crate::errors::Error;
use crate::layer::{Layer, Transport};
use crate::layers::{arp, dhcp, dns, ftp, http, icmp, icmpv6, imap, ipv4, ipv6, pop3, smtp, tcp, udp};
use crate::types::{EtherType, LayerCreatorFn, ETHERTYPE_ARP, ETHERTYPE_IP, ETHERTYPE_IP6};

/// Registry of layer creators, keyed by the selector that picks them.
#[derive(Default)]
pub struct LayerRegistry {
    ethertypes: HashMap<EtherType, LayerCreatorFn>,
    ip_protos: HashMap<u8, LayerCreatorFn>,
    tcp_ports: HashMap<u16, LayerCreatorFn>,
    udp_ports: HashMap<u16, LayerCreatorFn>,
}

impl LayerRegistry {
    /// An empty registry. Only the link layer will decode.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in decoder wired to its well-known selector.
    pub fn with_defaults() -> Self {
        let mut r = Self::new();

        // L3
        let _ = r.register_ethertype(ETHERTYPE_ARP, arp::ARP::creator);
        let _ = r.register_ethertype(ETHERTYPE_IP, ipv4::IPv4::creator);
        let _ = r.register_ethertype(ETHERTYPE_IP6, ipv6::IPv6::creator);

        // L4
        let _ = r.register_ip_proto(icmp::IPPROTO_ICMP, icmp::ICMP::creator);
        let _ = r.register_ip_proto(tcp::IPPROTO_TCP, tcp::TCP::creator);
        let _ = r.register_ip_proto(udp::IPPROTO_UDP, udp::UDP::creator);
        let _ = r.register_ip_proto(icmpv6::IPPROTO_ICMPV6, icmpv6::ICMPv6::creator);

        // Applications, by port. DHCP is UDP only; the rest answer on either transport.
        for (port, creator) in [
            (80_u16, http::HTTP::creator as LayerCreatorFn),
            (53, dns::DNS::creator),
            (21, ftp::FTP::creator),
            (25, smtp::SMTP::creator),
            (110, pop3::POP3::creator),
            (143, imap::IMAP::creator),
        ]
        .iter()
        {
            let _ = r.register_tcp_port(*port, *creator);
            let _ = r.register_udp_port(*port, *creator);
        }
        let _ = r.register_udp_port(67, dhcp::DHCP::creator);
        let _ = r.register_udp_port(68, dhcp::DHCP::creator);

        r
    }

    /// Register a decoder for a link-layer type field value.
    pub fn register_ethertype(
        &mut self,
        eth_type: EtherType,
        creator: LayerCreatorFn,
    ) -> Result<(), Error> {
        if self.ethertypes.contains_key(&eth_type) {
            return Err(Error::RegisterError(format!("ether_type: {}", eth_type)));
        }
        self.ethertypes.insert(eth_type, creator);

        Ok(())
    }

    /// Register a decoder for an IP protocol number (also used for the IPv6 next-header field).
    pub fn register_ip_proto(&mut self, proto: u8, creator: LayerCreatorFn) -> Result<(), Error> {
        if self.ip_protos.contains_key(&proto) {
            return Err(Error::RegisterError(format!("ip_proto: {}", proto)));
        }
        self.ip_protos.insert(proto, creator);

        Ok(())
    }

    /// Register an application decoder for a TCP port.
    pub fn register_tcp_port(&mut self, port: u16, creator: LayerCreatorFn) -> Result<(), Error> {
        if self.tcp_ports.contains_key(&port) {
            return Err(Error::RegisterError(format!("tcp_port: {}", port)));
        }
        self.tcp_ports.insert(port, creator);

        Ok(())
    }

    /// Register an application decoder for a UDP port.
    pub fn register_udp_port(&mut self, port: u16, creator: LayerCreatorFn) -> Result<(), Error> {
        if self.udp_ports.contains_key(&port) {
            return Err(Error::RegisterError(format!("udp_port: {}", port)));
        }
        self.udp_ports.insert(port, creator);

        Ok(())
    }

    pub(crate) fn l3_layer(&self, eth_type: EtherType) -> Option<Box<dyn Layer + Send>> {
        self.ethertypes.get(&eth_type).map(|creator| creator())
    }

    pub(crate) fn l4_layer(&self, proto: u8) -> Option<Box<dyn Layer + Send>> {
        self.ip_protos.get(&proto).map(|creator| creator())
    }

    /// Application lookup: destination port first, then source.
    pub(crate) fn app_layer(
        &self,
        transport: Transport,
        src_port: u16,
        dst_port: u16,
    ) -> Option<Box<dyn Layer + Send>> {
        let map = match transport {
            Transport::Tcp => &self.tcp_ports,
            Transport::Udp => &self.udp_ports,
        };
        map.get(&dst_port)
            .or_else(|| map.get(&src_port))
            .map(|creator| creator())
    }
}
