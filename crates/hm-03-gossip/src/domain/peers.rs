//! Peer table: pinned keys and what we have heard from each peer.

use serde::{Deserialize, Serialize};
use shared_crypto::Secp256k1PublicKey;
use shared_types::PeerId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How a peer's key came to be pinned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    /// Key pre-shared through `trust_peer`.
    Verified,
    /// Key recovered from the first heartbeat seen (trust on first use).
    Unverified,
}

/// Everything known about one remote peer.
#[derive(Clone, Debug)]
pub struct PeerRecord {
    pub peer_id: PeerId,
    pub public_key: Secp256k1PublicKey,
    pub trust: TrustLevel,
    pub first_seen: Instant,
    pub last_seen: Option<Instant>,
    pub heartbeats_received: u64,
    pub last_root: Option<String>,
}

/// Peers keyed by id.
#[derive(Debug, Default)]
pub struct PeerTable {
    peers: HashMap<PeerId, PeerRecord>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `public_key` for `peer_id`. A `Verified` pin replaces any earlier
    /// pin; an `Unverified` one never downgrades an existing record.
    pub fn pin(&mut self, peer_id: PeerId, public_key: Secp256k1PublicKey, trust: TrustLevel) {
        match self.peers.get_mut(&peer_id) {
            Some(record) if trust == TrustLevel::Verified => {
                record.public_key = public_key;
                record.trust = trust;
            }
            Some(_) => {}
            None => {
                self.peers.insert(
                    peer_id.clone(),
                    PeerRecord {
                        peer_id,
                        public_key,
                        trust,
                        first_seen: Instant::now(),
                        last_seen: None,
                        heartbeats_received: 0,
                        last_root: None,
                    },
                );
            }
        }
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&PeerRecord> {
        self.peers.get(peer_id)
    }

    /// Count an accepted heartbeat. Returns the peer's trust level, or
    /// `None` if the peer was never pinned.
    pub fn record_heartbeat(&mut self, peer_id: &PeerId, log_root: &str) -> Option<TrustLevel> {
        let record = self.peers.get_mut(peer_id)?;
        record.last_seen = Some(Instant::now());
        record.heartbeats_received += 1;
        record.last_root = Some(log_root.to_string());
        Some(record.trust)
    }

    /// Snapshot of every record, sorted by peer id.
    pub fn records(&self) -> Vec<PeerRecord> {
        let mut records: Vec<_> = self.peers.values().cloned().collect();
        records.sort_by(|a, b| a.peer_id.cmp(&b.peer_id));
        records
    }

    /// Peers not heard from for longer than `max_age` as of `now`.
    ///
    /// A pinned peer that never sent a heartbeat ages from when it was pinned.
    pub fn stale(&self, max_age: Duration, now: Instant) -> Vec<PeerId> {
        let mut stale: Vec<_> = self
            .peers
            .values()
            .filter(|record| {
                let last = record.last_seen.unwrap_or(record.first_seen);
                now.saturating_duration_since(last) > max_age
            })
            .map(|record| record.peer_id.clone())
            .collect();
        stale.sort();
        stale
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
