//! # Shared Bus - Publish/Subscribe Transport
//!
//! The boundary between the gossip engine and whatever actually moves bytes
//! between peers. The engine only sees [`PubSubTransport`]; discovery,
//! routing and delivery belong to the implementation.
//!
//! ```text
//! ┌──────────────┐   publish(topic)   ┌──────────────┐   recv()   ┌──────────────┐
//! │ Gossip Eng A │ ─────────────────▶ │  Transport   │ ─────────▶ │ Gossip Eng B │
//! └──────────────┘                    └──────────────┘            └──────────────┘
//! ```
//!
//! ## Delivery Contract
//!
//! - At-most-once, unordered, best-effort
//! - A publisher also receives its own messages if subscribed to the topic
//! - Lagging subscribers silently skip the messages they missed

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod publisher;
pub mod subscriber;

pub use publisher::{InMemoryPubSub, PubSubTransport};
pub use subscriber::{MessageStream, TopicMessage, TopicSubscription, TransportError};

/// Messages buffered per topic before slow subscribers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
