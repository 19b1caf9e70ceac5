//! # Engine Events
//!
//! Everything the engine surfaces to listeners: accepted heartbeats, dropped
//! messages and failed publishes. Listeners are bounded broadcast receivers;
//! dropping one unregisters it.

use shared_types::PeerId;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

use crate::domain::{ClockOrdering, GossipError, Heartbeat, TrustLevel};

/// Event emitted by a running engine.
#[derive(Clone, Debug)]
pub enum GossipEvent {
    /// A remote heartbeat passed verification and was merged.
    Heartbeat {
        heartbeat: Heartbeat,
        trust: TrustLevel,
        /// Sender's clock relative to ours before the merge.
        ordering: ClockOrdering,
        /// Whether the sender's log root equals ours at receipt.
        root_matches: bool,
    },
    /// A publish did not reach the transport. The next tick retries.
    PublishFailed { error: GossipError },
    /// An incoming message was rejected and not merged.
    Dropped {
        peer_id: Option<PeerId>,
        error: GossipError,
    },
}

/// Registration for engine events.
pub struct HeartbeatListener {
    receiver: broadcast::Receiver<GossipEvent>,
}

impl HeartbeatListener {
    pub(crate) fn new(receiver: broadcast::Receiver<GossipEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, skipping over any the listener lagged behind on.
    ///
    /// Returns `None` once the engine has been dropped.
    pub async fn recv(&mut self) -> Option<GossipEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Heartbeat listener lagged, events skipped");
                }
            }
        }
    }

    /// Next event if one is ready.
    pub fn try_recv(&mut self) -> Option<GossipEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Adapt into a `Stream`.
    pub fn into_stream(self) -> ListenerStream {
        ListenerStream {
            inner: BroadcastStream::new(self.receiver),
        }
    }
}

/// `Stream` of engine events.
pub struct ListenerStream {
    inner: BroadcastStream<GossipEvent>,
}

impl Stream for ListenerStream {
    type Item = GossipEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => return Poll::Ready(Some(event)),
                Poll::Ready(Some(Err(_))) => continue,
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn failure() -> GossipEvent {
        GossipEvent::PublishFailed {
            error: GossipError::TransportUnavailable("offline".into()),
        }
    }

    #[tokio::test]
    async fn test_every_listener_sees_every_event() {
        let (tx, _) = broadcast::channel(8);
        let mut a = HeartbeatListener::new(tx.subscribe());
        let mut b = HeartbeatListener::new(tx.subscribe());

        tx.send(failure()).unwrap();
        assert!(matches!(a.recv().await, Some(GossipEvent::PublishFailed { .. })));
        assert!(matches!(b.recv().await, Some(GossipEvent::PublishFailed { .. })));
    }

    #[tokio::test]
    async fn test_dropping_listener_unregisters() {
        let (tx, _) = broadcast::channel::<GossipEvent>(8);
        let listener = HeartbeatListener::new(tx.subscribe());
        assert_eq!(tx.receiver_count(), 1);
        drop(listener);
        assert_eq!(tx.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_lagging_listener_resumes() {
        let (tx, _) = broadcast::channel(2);
        let mut listener = HeartbeatListener::new(tx.subscribe());
        for _ in 0..5 {
            tx.send(failure()).unwrap();
        }
        assert!(listener.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_stream_ends_when_engine_side_closes() {
        let (tx, _) = broadcast::channel(4);
        let mut stream = HeartbeatListener::new(tx.subscribe()).into_stream();
        tx.send(failure()).unwrap();
        drop(tx);
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_none());
    }
}
