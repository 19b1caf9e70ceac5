//! # Vector Clock
//!
//! Per-peer counters tracking how much of each peer's heartbeat history this
//! node has seen. Orders awareness between peers, not application events.
//!
//! ## Rules
//!
//! - A peer increments only its own entry, and only when it emits a heartbeat
//! - Merge is entrywise `max`, so no entry ever decreases
//! - Merging the same clock twice is the same as merging it once

use serde::{Deserialize, Serialize};
use shared_types::PeerId;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::trace;

/// Causal relation between two clocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockOrdering {
    /// Every entry `<=`, at least one `<`.
    Before,
    /// Every entry `>=`, at least one `>`.
    After,
    /// Some entries greater, some smaller.
    Concurrent,
    /// Identical after treating absent entries as zero.
    Equal,
}

/// Map from peer id to counter. Absent entries read as zero.
///
/// Serializes as a plain JSON object `{ "<peerId>": <counter>, ... }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorClock {
    entries: BTreeMap<PeerId, u64>,
}

impl VectorClock {
    /// Empty clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `me` and return a snapshot.
    ///
    /// The snapshot is an owned copy; later mutation of `self` does not
    /// show through it.
    pub fn tick(&mut self, me: &PeerId) -> VectorClock {
        let entry = self.entries.entry(me.clone()).or_insert(0);
        *entry = entry.saturating_add(1);
        self.clone()
    }

    /// Raise every local entry to at least the remote value.
    ///
    /// Returns `true` if any entry changed. Never lowers an entry and never
    /// touches the local peer's own counter beyond what `remote` asserts.
    pub fn merge(&mut self, remote: &VectorClock, sender: &PeerId) -> bool {
        let mut changed = false;
        for (peer, &counter) in &remote.entries {
            let local = self.entries.entry(peer.clone()).or_insert(0);
            if counter > *local {
                *local = counter;
                changed = true;
            }
        }
        trace!(sender = sender.short(), changed, "Vector clock merged");
        changed
    }

    /// Counter for `peer` (zero if absent).
    pub fn get(&self, peer: &PeerId) -> u64 {
        self.entries.get(peer).copied().unwrap_or(0)
    }

    /// Entries in peer id order.
    pub fn entries(&self) -> impl Iterator<Item = (&PeerId, u64)> {
        self.entries.iter().map(|(peer, counter)| (peer, *counter))
    }

    /// Number of peers with an explicit entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How `self` relates to `other`.
    pub fn compare(&self, other: &VectorClock) -> ClockOrdering {
        let mut less = false;
        let mut greater = false;

        let peers = self.entries.keys().chain(other.entries.keys());
        for peer in peers {
            match self.get(peer).cmp(&other.get(peer)) {
                Ordering::Less => less = true,
                Ordering::Greater => greater = true,
                Ordering::Equal => {}
            }
            if less && greater {
                return ClockOrdering::Concurrent;
            }
        }

        match (less, greater) {
            (false, false) => ClockOrdering::Equal,
            (true, false) => ClockOrdering::Before,
            (false, true) => ClockOrdering::After,
            (true, true) => ClockOrdering::Concurrent,
        }
    }
}

impl FromIterator<(PeerId, u64)> for VectorClock {
    fn from_iter<I: IntoIterator<Item = (PeerId, u64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
