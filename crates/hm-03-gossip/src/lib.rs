//! # Gossip / Heartbeat Engine (hm-03)
//!
//! Every peer periodically announces where it stands: its vector clock, the
//! root of its content log, and a signature over that root. Peers merge
//! what they hear into their own clock. This is an awareness layer, not
//! consensus: duplicate, reordered or dropped heartbeats are all tolerated.
//!
//! ```text
//! [ContentLog] ──root──▶ [GossipEngine] ──publish "heartbeat"──▶ [PubSubTransport]
//!                              ▲                                        │
//!                              └───────────── subscribe ◀───────────────┘
//!                              │
//!                              └──▶ HeartbeatListener (GossipEvent)
//! ```
//!
//! ## Invariants
//!
//! - A peer increments only its own clock entry, once per emitted heartbeat
//! - Merge never lowers an entry; merging a replay changes nothing
//! - Unverifiable heartbeats are dropped and never merged
//! - `stop` is idempotent, safe before `start`, and joins the gossip task

pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

pub use domain::{
    ClockOrdering, EngineState, GossipConfig, GossipError, Heartbeat, PeerRecord, PeerTable,
    TrustLevel, VectorClock, DEFAULT_INTERVAL_MS, DEFAULT_LISTENER_CAPACITY, DEFAULT_TOPIC,
};
pub use events::{GossipEvent, HeartbeatListener, ListenerStream};
pub use ports::{PubSubTransport, RootSource};
pub use service::GossipEngine;
