//! # Topic Subscriber
//!
//! Receiving side of the transport: a per-topic subscription handle and its
//! `Stream` adapter.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors raised by a transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport is not reachable (offline, not yet connected).
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    /// The underlying channel was closed.
    #[error("Transport closed")]
    Closed,
}

/// A message delivered on a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessage {
    /// Topic the message was published on.
    pub topic: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

pub(crate) type SubscriptionCounts = Arc<RwLock<HashMap<String, usize>>>;

/// Handle for receiving messages published on one topic.
///
/// Dropping the handle unsubscribes.
pub struct TopicSubscription {
    topic: String,
    receiver: broadcast::Receiver<TopicMessage>,
    _guard: Option<SubscriptionGuard>,
}

/// Decrements the per-topic subscriber count when dropped.
struct SubscriptionGuard {
    topic: String,
    counts: SubscriptionCounts,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        let mut counts = self.counts.write();
        if let Some(count) = counts.get_mut(&self.topic) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                counts.remove(&self.topic);
            }
        }
        debug!(topic = %self.topic, "Subscription dropped");
    }
}

impl TopicSubscription {
    /// Wrap a broadcast receiver as a subscription.
    ///
    /// Transport implementations other than [`crate::InMemoryPubSub`] use this
    /// to hand their delivery channel to the engine.
    pub fn new(topic: impl Into<String>, receiver: broadcast::Receiver<TopicMessage>) -> Self {
        Self {
            topic: topic.into(),
            receiver,
            _guard: None,
        }
    }

    pub(crate) fn tracked(
        topic: String,
        receiver: broadcast::Receiver<TopicMessage>,
        counts: SubscriptionCounts,
    ) -> Self {
        Self {
            _guard: Some(SubscriptionGuard {
                topic: topic.clone(),
                counts,
            }),
            topic,
            receiver,
        }
    }

    /// Topic this handle listens on.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Receive the next message.
    ///
    /// Returns `None` once the transport has been dropped.
    pub async fn recv(&mut self) -> Option<TopicMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(
                        topic = %self.topic,
                        lagged = count,
                        "Subscriber lagged, messages skipped"
                    );
                }
            }
        }
    }

    /// Receive without waiting.
    ///
    /// - `Ok(Some(message))` - a message was ready
    /// - `Ok(None)` - nothing pending
    /// - `Err(TransportError::Closed)` - the transport is gone
    pub fn try_recv(&mut self) -> Result<Option<TopicMessage>, TransportError> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => return Ok(Some(message)),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(TransportError::Closed),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            }
        }
    }

    /// Convert into a `Stream` of messages.
    #[must_use]
    pub fn into_stream(self) -> MessageStream {
        MessageStream {
            inner: BroadcastStream::new(self.receiver),
            _guard: self._guard,
        }
    }
}

/// `Stream` adapter over a [`TopicSubscription`]. Lagged gaps are skipped.
pub struct MessageStream {
    inner: BroadcastStream<TopicMessage>,
    _guard: Option<SubscriptionGuard>,
}

impl Stream for MessageStream {
    type Item = TopicMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(message))) => return Poll::Ready(Some(message)),
                Poll::Ready(Some(Err(_lagged))) => continue,
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
