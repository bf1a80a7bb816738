//! IPv4 fragment reassembly
//!
//! Fragments are keyed by the (source, destination, identification) triple
//! from the IPv4 header. Each arriving fragment is recorded at its byte
//! offset; once the final fragment (MF clear) has fixed the datagram length
//! and every byte up to that length is covered, the datagram is assembled
//! and the entry marked complete. The buffer never drops entries on its
//! own; a capture session applies its own policy through
//! [`FragmentBuffer::remove`] and [`FragmentBuffer::evict_stale`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::layer::FragmentInfo;
use crate::types::IPv4Address;

/// Identity of one in-flight fragmented datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    pub src: IPv4Address,
    pub dst: IPv4Address,
    pub ident: u16,
}

impl From<&FragmentInfo> for FragmentKey {
    fn from(info: &FragmentInfo) -> Self {
        Self {
            src: info.src,
            dst: info.dst,
            ident: info.ident,
        }
    }
}

#[derive(Debug)]
struct FragmentEntry {
    // payload bytes keyed by fragment offset
    fragments: BTreeMap<usize, Vec<u8>>,
    // known once the fragment with MF clear arrives
    total_size: Option<usize>,
    // terminal state, frozen at first completion
    assembled: Option<Vec<u8>>,
    last_seen: Instant,
}

impl FragmentEntry {
    fn new() -> Self {
        Self {
            fragments: BTreeMap::new(),
            total_size: None,
            assembled: None,
            last_seen: Instant::now(),
        }
    }

    /// Walk fragments in offset order and check that they cover `0..total`
    /// without a hole. Overlapping fragments are fine.
    fn is_complete(&self) -> bool {
        let total = match self.total_size {
            Some(total) => total,
            None => return false,
        };

        let mut covered = 0usize;
        for (offset, data) in &self.fragments {
            if *offset > covered {
                return false;
            }
            covered = covered.max(offset + data.len());
        }
        covered >= total
    }

    fn assemble(&self) -> Vec<u8> {
        let total = self.total_size.unwrap_or(0);
        let mut buffer = vec![0u8; total];
        for (offset, data) in &self.fragments {
            let end = (offset + data.len()).min(total);
            if *offset < end {
                buffer[*offset..end].copy_from_slice(&data[..end - offset]);
            }
        }
        buffer
    }
}

/// Outcome of feeding one fragment to the buffer.
#[derive(Debug, PartialEq)]
pub enum Reassembly {
    /// All fragments arrived, this is the full datagram payload.
    Complete(Vec<u8>),
    /// Still waiting for more fragments.
    Incomplete,
}

/// Buffer of partially reassembled IPv4 datagrams.
///
/// Interior mutability via a [`Mutex`] so one buffer can be shared by
/// callers dissecting from multiple threads. Completed entries stay in
/// the buffer in their terminal state; only [`remove`](Self::remove) and
/// [`evict_stale`](Self::evict_stale) ever delete.
#[derive(Debug, Default)]
pub struct FragmentBuffer {
    entries: Mutex<HashMap<FragmentKey, FragmentEntry>>,
}

impl FragmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one fragment and report whether the datagram is now whole.
    ///
    /// Once an entry reaches the complete state its assembled bytes are frozen; further
    /// fragments for the same key refresh `last_seen` but cannot change the result.
    pub fn insert(&self, info: &FragmentInfo, payload: &[u8]) -> Reassembly {
        let key = FragmentKey::from(info);
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.entry(key).or_insert_with(FragmentEntry::new);
        entry.last_seen = Instant::now();

        if let Some(datagram) = &entry.assembled {
            return Reassembly::Complete(datagram.clone());
        }

        entry.fragments.insert(info.offset, payload.to_vec());
        if !info.more_fragments {
            // a retransmitted final fragment refreshes the length
            entry.total_size = Some(info.offset + payload.len());
        }

        if entry.is_complete() {
            let datagram = entry.assemble();
            entry.assembled = Some(datagram.clone());
            log::debug!(
                "reassembled {} -> {} ident {}: {} bytes",
                info.src,
                info.dst,
                info.ident,
                datagram.len()
            );
            Reassembly::Complete(datagram)
        } else {
            log::trace!(
                "fragment {} -> {} ident {} offset {}: incomplete",
                info.src,
                info.dst,
                info.ident,
                info.offset
            );
            Reassembly::Incomplete
        }
    }

    /// Re-run the completeness check for a datagram without adding a fragment. Idempotent:
    /// a completed datagram reports the same bytes on every call.
    pub fn reassembled(&self, key: &FragmentKey) -> Reassembly {
        let entries = self.entries.lock().unwrap();
        match entries.get(key).and_then(|e| e.assembled.clone()) {
            Some(datagram) => Reassembly::Complete(datagram),
            None => Reassembly::Incomplete,
        }
    }

    /// Drop a partially reassembled datagram.
    pub fn remove(&self, key: &FragmentKey) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Drop entries that have not seen a fragment within `ttl`. Returns how
    /// many were evicted.
    pub fn evict_stale(&self, ttl: Duration) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| entry.last_seen.elapsed() < ttl);
        before - entries.len()
    }

    /// Number of datagrams currently being reassembled.
    pub fn pending(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use core::convert::TryFrom;

    use super::*;

    fn info(offset: usize, more: bool) -> FragmentInfo {
        FragmentInfo {
            src: IPv4Address::try_from([10, 0, 0, 1].as_ref()).unwrap(),
            dst: IPv4Address::try_from([10, 0, 0, 2].as_ref()).unwrap(),
            ident: 0x1234,
            offset,
            more_fragments: more,
            proto: 17,
        }
    }

    #[test]
    fn in_order_reassembly() {
        let buffer = FragmentBuffer::new();
        assert_eq!(buffer.insert(&info(0, true), &[1u8; 8]), Reassembly::Incomplete);

        match buffer.insert(&info(8, false), &[2u8; 4]) {
            Reassembly::Complete(data) => {
                assert_eq!(data.len(), 12);
                assert_eq!(&data[..8], &[1u8; 8]);
                assert_eq!(&data[8..], &[2u8; 4]);
            }
            Reassembly::Incomplete => panic!("expected complete datagram"),
        }
        // the completed entry stays until the caller removes or evicts it
        assert_eq!(buffer.pending(), 1);
    }

    #[test]
    fn completed_datagram_reports_the_same_bytes_again() {
        let buffer = FragmentBuffer::new();
        buffer.insert(&info(0, true), &[1u8; 8]);
        let first = buffer.insert(&info(8, false), &[2u8; 4]);

        let key = FragmentKey::from(&info(0, true));
        assert_eq!(buffer.reassembled(&key), first);

        // a retransmitted fragment after completion cannot change the result
        assert_eq!(buffer.insert(&info(8, false), &[9u8; 4]), first);
        assert_eq!(buffer.reassembled(&key), first);

        buffer.remove(&key);
        assert_eq!(buffer.pending(), 0);
        assert_eq!(buffer.reassembled(&key), Reassembly::Incomplete);
    }

    #[test]
    fn order_does_not_matter() {
        let forward = FragmentBuffer::new();
        forward.insert(&info(0, true), &[1u8; 8]);
        let a = forward.insert(&info(8, false), &[2u8; 8]);

        let backward = FragmentBuffer::new();
        backward.insert(&info(8, false), &[2u8; 8]);
        let b = backward.insert(&info(0, true), &[1u8; 8]);

        assert_eq!(a, b);
    }

    #[test]
    fn zero_bytes_are_payload_not_gaps() {
        let buffer = FragmentBuffer::new();
        buffer.insert(&info(0, true), &[0u8; 8]);

        match buffer.insert(&info(8, false), &[0u8; 8]) {
            Reassembly::Complete(data) => assert_eq!(data, vec![0u8; 16]),
            Reassembly::Incomplete => panic!("all-zero fragments must still complete"),
        }
    }

    #[test]
    fn gap_keeps_datagram_incomplete() {
        let buffer = FragmentBuffer::new();
        buffer.insert(&info(0, true), &[1u8; 8]);
        // offset 16 leaves bytes 8..16 uncovered
        assert_eq!(
            buffer.insert(&info(16, false), &[3u8; 8]),
            Reassembly::Incomplete
        );
        assert_eq!(buffer.pending(), 1);

        match buffer.insert(&info(8, true), &[2u8; 8]) {
            Reassembly::Complete(data) => assert_eq!(data.len(), 24),
            Reassembly::Incomplete => panic!("gap was filled"),
        }
    }

    #[test]
    fn duplicate_fragment_is_idempotent() {
        let buffer = FragmentBuffer::new();
        buffer.insert(&info(0, true), &[1u8; 8]);
        buffer.insert(&info(0, true), &[1u8; 8]);

        match buffer.insert(&info(8, false), &[2u8; 8]) {
            Reassembly::Complete(data) => assert_eq!(data.len(), 16),
            Reassembly::Incomplete => panic!("duplicate must not block completion"),
        }
    }

    #[test]
    fn later_final_fragment_wins() {
        let buffer = FragmentBuffer::new();
        buffer.insert(&info(8, false), &[2u8; 4]);
        // a longer final fragment replaces the recorded total length
        buffer.insert(&info(8, false), &[2u8; 8]);

        match buffer.insert(&info(0, true), &[1u8; 8]) {
            Reassembly::Complete(data) => assert_eq!(data.len(), 16),
            Reassembly::Incomplete => panic!("refreshed length should complete"),
        }
    }

    #[test]
    fn evict_stale_drops_abandoned_entries() {
        let buffer = FragmentBuffer::new();
        buffer.insert(&info(0, true), &[1u8; 8]);
        assert_eq!(buffer.pending(), 1);

        assert_eq!(buffer.evict_stale(Duration::from_secs(60)), 0);
        assert_eq!(buffer.evict_stale(Duration::from_nanos(0)), 1);
        assert_eq!(buffer.pending(), 0);
    }
}
