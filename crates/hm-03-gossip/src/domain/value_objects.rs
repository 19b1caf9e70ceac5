//! Engine configuration and lifecycle state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Topic every heartbeat is published on.
pub const DEFAULT_TOPIC: &str = "heartbeat";

/// Tick period in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 3_000;

/// Events buffered per listener before it starts lagging.
pub const DEFAULT_LISTENER_CAPACITY: usize = 256;

/// Gossip engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GossipConfig {
    /// Pub/sub topic for heartbeats.
    pub topic: String,
    /// Milliseconds between heartbeats.
    pub interval_ms: u64,
    /// Capacity of the listener broadcast channel.
    pub listener_capacity: usize,
    /// Drop heartbeats from peers whose key was not pinned with
    /// `trust_peer` instead of trusting them on first use.
    pub require_known_peers: bool,
}

impl GossipConfig {
    /// Tick period.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    /// Short-interval config for tests.
    pub fn for_testing() -> Self {
        Self {
            interval_ms: 50,
            ..Self::default()
        }
    }
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            interval_ms: DEFAULT_INTERVAL_MS,
            listener_capacity: DEFAULT_LISTENER_CAPACITY,
            require_known_peers: false,
        }
    }
}

/// `Idle -> Running -> Stopped`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Stopped,
}
