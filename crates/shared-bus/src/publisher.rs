//! # Topic Publisher
//!
//! The transport port and its in-memory implementation.

use crate::subscriber::{SubscriptionCounts, TopicMessage, TopicSubscription, TransportError};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Port used by the gossip engine to reach other peers.
///
/// Implementations decide how peers are discovered and how bytes travel;
/// no ordering or exactly-once delivery is required.
#[async_trait]
pub trait PubSubTransport: Send + Sync {
    /// Subscribe to a topic.
    ///
    /// # Errors
    ///
    /// `TransportError::Unavailable` if the transport cannot accept
    /// subscriptions right now.
    async fn subscribe(&self, topic: &str) -> Result<TopicSubscription, TransportError>;

    /// Publish a payload to a topic.
    ///
    /// # Returns
    ///
    /// The number of subscribers the payload was handed to.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<usize, TransportError>;
}

/// In-process transport: one `tokio::sync::broadcast` channel per topic.
///
/// Every engine sharing an `Arc<InMemoryPubSub>` sees every other engine's
/// messages, which is enough to run a mesh inside one process or a test.
pub struct InMemoryPubSub {
    topics: RwLock<HashMap<String, broadcast::Sender<TopicMessage>>>,
    subscriptions: SubscriptionCounts,
    online: AtomicBool,
    messages_published: AtomicU64,
    capacity: usize,
}

impl InMemoryPubSub {
    /// Create a bus with the default per-topic capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with the given per-topic capacity, at least 1.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            online: AtomicBool::new(true),
            messages_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Take the bus offline (or back online). While offline every
    /// `subscribe` and `publish` fails with `Unavailable`.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        debug!(online, "In-memory transport availability changed");
    }

    /// Whether the bus currently accepts traffic.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Live subscriptions on a topic.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscriptions.read().get(topic).copied().unwrap_or(0)
    }

    /// Total publish attempts that reached an online bus.
    #[must_use]
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }

    /// Per-topic channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn ensure_online(&self, topic: &str) -> Result<(), TransportError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(TransportError::Unavailable(format!(
                "in-memory bus offline (topic {topic})"
            )))
        }
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<TopicMessage> {
        if let Some(sender) = self.topics.read().get(topic) {
            return sender.clone();
        }
        self.topics
            .write()
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for InMemoryPubSub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PubSubTransport for InMemoryPubSub {
    async fn subscribe(&self, topic: &str) -> Result<TopicSubscription, TransportError> {
        self.ensure_online(topic)?;

        let receiver = self.sender(topic).subscribe();
        *self.subscriptions.write().entry(topic.to_string()).or_insert(0) += 1;

        debug!(topic, "New subscription created");
        Ok(TopicSubscription::tracked(
            topic.to_string(),
            receiver,
            self.subscriptions.clone(),
        ))
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<usize, TransportError> {
        self.ensure_online(topic)?;
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        let bytes = payload.len();
        let message = TopicMessage {
            topic: topic.to_string(),
            payload,
        };

        match self.sender(topic).send(message) {
            Ok(receivers) => {
                debug!(topic, bytes, receivers, "Message published");
                Ok(receivers)
            }
            Err(_) => {
                warn!(topic, bytes, "Message dropped (no subscribers)");
                Ok(0)
            }
        }
    }
}
