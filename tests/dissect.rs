//! End-to-end dissection scenarios over hand-assembled frames.

use serde_json::Value;

use lancet::{Dissection, Dissector, FilterChain};

fn eth_ipv4(src: [u8; 4], proto: u8, ident: u16, flags_frag: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = hex::decode("aabbccddeeff1122334455660800").unwrap();

    let total = 20 + payload.len() as u16;
    frame.extend_from_slice(&[0x45, 0x00]);
    frame.extend_from_slice(&total.to_be_bytes());
    frame.extend_from_slice(&ident.to_be_bytes());
    frame.extend_from_slice(&flags_frag.to_be_bytes());
    frame.extend_from_slice(&[64, proto, 0x00, 0x00]);
    frame.extend_from_slice(&src);
    frame.extend_from_slice(&[10, 0, 0, 2]);
    frame.extend_from_slice(payload);
    frame
}

fn tcp_segment(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut segment = Vec::new();
    segment.extend_from_slice(&src_port.to_be_bytes());
    segment.extend_from_slice(&dst_port.to_be_bytes());
    segment.extend_from_slice(&[0u8; 8]);
    // data offset 5 words, PSH|ACK
    segment.extend_from_slice(&0x5018_u16.to_be_bytes());
    segment.extend_from_slice(&[0x20, 0x00, 0x00, 0x00, 0x00, 0x00]);
    segment.extend_from_slice(payload);
    segment
}

fn udp_datagram(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut datagram = Vec::new();
    datagram.extend_from_slice(&src_port.to_be_bytes());
    datagram.extend_from_slice(&dst_port.to_be_bytes());
    datagram.extend_from_slice(&(8 + payload.len() as u16).to_be_bytes());
    datagram.extend_from_slice(&[0x00, 0x00]);
    datagram.extend_from_slice(payload);
    datagram
}

fn layer_names(d: &Dissection) -> Vec<&'static str> {
    d.layers.iter().map(|l| l.name).collect()
}

#[test]
fn http_get_yields_four_layers() {
    let segment = tcp_segment(40000, 80, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
    let frame = eth_ipv4([192, 168, 1, 10], 6, 1, 0, &segment);

    let d = Dissector::new().dissect(&frame);

    assert_eq!(layer_names(&d), vec!["Ethernet", "IPv4", "TCP", "HTTP"]);
    assert!(d.summary.contains("GET /"), "summary: {}", d.summary);

    let http = d.layer("HTTP").unwrap();
    assert_eq!(http.field("method"), Some("GET"));
    assert_eq!(http.field("path"), Some("/"));
    assert_eq!(http.fields["headers"]["Host"], Value::from("x"));
}

#[test]
fn arp_request_summary_names_protocol_addresses() {
    let frame = hex::decode(
        "ffffffffffff001122334455080600010800060400010011223344550a000001000000000000c0a8010a",
    )
    .unwrap();

    let d = Dissector::new().dissect(&frame);

    assert_eq!(layer_names(&d), vec!["Ethernet", "ARP"]);
    let arp = d.layer("ARP").unwrap();
    assert_eq!(arp.field("oper"), Some("Request"));
    assert_eq!(d.summary, "ARP 10.0.0.1 -> 192.168.1.10");
}

#[test]
fn dns_query_drives_the_summary() {
    let query =
        hex::decode("1234010000010000000000000377777706676f6f676c6503636f6d0000010001").unwrap();
    let frame = eth_ipv4(
        [192, 168, 1, 10],
        17,
        2,
        0,
        &udp_datagram(33333, 53, &query),
    );

    let d = Dissector::new().dissect(&frame);

    assert_eq!(layer_names(&d), vec!["Ethernet", "IPv4", "UDP", "DNS"]);
    assert_eq!(
        d.summary,
        "192.168.1.10 -> 10.0.0.2 DNS query www.google.com"
    );
}

#[test]
fn fragmented_udp_reassembles_across_frames() {
    let datagram = udp_datagram(5000, 9999, b"ABCDEFGH");
    let first = eth_ipv4([192, 168, 1, 10], 17, 7, 0x2000, &datagram[..8]);
    let second = eth_ipv4([192, 168, 1, 10], 17, 7, 0x0001, &datagram[8..]);

    let dissector = Dissector::new();

    let d1 = dissector.dissect(&first);
    assert_eq!(layer_names(&d1), vec!["Ethernet", "IPv4"]);
    assert!(d1.summary.contains("fragment"), "summary: {}", d1.summary);

    let d2 = dissector.dissect(&second);
    assert_eq!(layer_names(&d2), vec!["Ethernet", "IPv4", "UDP"]);
    let udp = d2.layer("UDP").unwrap();
    assert_eq!(udp.fields["src_port"], Value::from(5000));
    assert_eq!(udp.fields["dst_port"], Value::from(9999));
    assert_eq!(d2.summary, "192.168.1.10 -> 10.0.0.2 UDP");
}

#[test]
fn fragment_arrival_order_does_not_matter() {
    let datagram = udp_datagram(5000, 9999, b"ABCDEFGH");
    let head = eth_ipv4([192, 168, 1, 10], 17, 9, 0x2000, &datagram[..8]);
    let tail = eth_ipv4([192, 168, 1, 10], 17, 9, 0x0001, &datagram[8..]);

    let dissector = Dissector::new();

    let d1 = dissector.dissect(&tail);
    assert!(d1.summary.contains("fragment"), "summary: {}", d1.summary);

    let d2 = dissector.dissect(&head);
    assert_eq!(layer_names(&d2), vec!["Ethernet", "IPv4", "UDP"]);
}

#[test]
fn neighbor_solicitation_appends_ndp_layer() {
    let mut frame = hex::decode("333300000001aabbccddeeff86dd").unwrap();
    // IPv6: payload length 24, next header ICMPv6, hop limit 255
    frame.extend_from_slice(&[0x60, 0x00, 0x00, 0x00, 0x00, 0x18, 58, 255]);
    let mut src = [0u8; 16];
    src[0] = 0xfe;
    src[1] = 0x80;
    src[15] = 0x01;
    let mut dst = [0u8; 16];
    dst[0] = 0xff;
    dst[1] = 0x02;
    dst[15] = 0x01;
    frame.extend_from_slice(&src);
    frame.extend_from_slice(&dst);
    // ICMPv6 neighbor solicitation for fe80::2
    frame.extend_from_slice(&[135, 0, 0x00, 0x00, 0, 0, 0, 0]);
    let mut target = [0u8; 16];
    target[0] = 0xfe;
    target[1] = 0x80;
    target[15] = 0x02;
    frame.extend_from_slice(&target);

    let d = Dissector::new().dissect(&frame);

    assert_eq!(layer_names(&d), vec!["Ethernet", "IPv6", "ICMPv6", "NDP"]);
    let ndp = d.layer("NDP").unwrap();
    assert_eq!(ndp.field("target"), Some("fe80::2"));
    assert_eq!(d.summary, "fe80::1 -> ff02::1");
}

#[test]
fn filter_chain_selects_by_source_address() {
    let dissector = Dissector::new();
    let segment = tcp_segment(40000, 80, b"GET / HTTP/1.1\r\n\r\n");
    let wanted = dissector.dissect(&eth_ipv4([192, 168, 1, 10], 6, 3, 0, &segment));
    let other = dissector.dissect(&eth_ipv4([172, 16, 0, 1], 6, 4, 0, &segment));

    let mut chain = FilterChain::new();
    chain.add(|d: &Dissection| {
        d.layer("IPv4")
            .and_then(|l| l.field("src_addr"))
            .map_or(false, |src| src == "192.168.1.10")
    });

    assert!(chain.apply(&wanted));
    assert!(!chain.apply(&other));
}
