//! # Gossip Engine
//!
//! Periodically publishes a signed heartbeat and merges the heartbeats of
//! other peers into the local vector clock.
//!
//! ## Loop
//!
//! One task per engine selects over three sources, so ticks never overlap
//! and tick/receipt never race on the clock:
//!
//! ```text
//!            ┌── interval.tick() ──▶ root → clock.tick → sign → spawn(publish)
//! select! ───┼── subscription    ──▶ decode → verify → merge → emit
//!            └── shutdown watch  ──▶ break
//! ```
//!
//! ## Receipt Policy
//!
//! 1. Undecodable payload: dropped
//! 2. Our own heartbeat: ignored
//! 3. Pinned sender: signature must verify against the pinned key
//! 4. First-seen sender: the signer is recovered from the signature and must
//!    hash to the claimed peer id; the key is then pinned as `Unverified`
//!    (trust on first use), unless `require_known_peers` is set
//!
//! Publish is fire-and-forget: failures become `GossipEvent::PublishFailed`
//! and the next tick tries again.

use hm_01_identity::Identity;
use parking_lot::{Mutex, RwLock};
use shared_bus::TopicSubscription;
use shared_crypto::{recover_public_key, Secp256k1PublicKey};
use shared_types::PeerId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::domain::{
    EngineState, GossipConfig, GossipError, Heartbeat, PeerRecord, PeerTable, TrustLevel,
    VectorClock,
};
use crate::events::{GossipEvent, HeartbeatListener};
use crate::ports::{PubSubTransport, RootSource};

/// State shared between the engine handle and its task.
struct EngineShared<R: RootSource> {
    identity: Identity,
    roots: Arc<R>,
    config: GossipConfig,
    clock: Mutex<VectorClock>,
    peers: RwLock<PeerTable>,
    events: broadcast::Sender<GossipEvent>,
}

enum Lifecycle {
    Idle,
    Running {
        shutdown_tx: watch::Sender<bool>,
        task: JoinHandle<()>,
    },
    Stopped,
}

/// Heartbeat gossip engine.
///
/// ## Dependencies
///
/// - `T: PubSubTransport` - delivers heartbeats to other peers
/// - `R: RootSource` - the content log whose root is advertised
pub struct GossipEngine<T, R>
where
    T: PubSubTransport + 'static,
    R: RootSource + 'static,
{
    shared: Arc<EngineShared<R>>,
    transport: Arc<T>,
    lifecycle: tokio::sync::Mutex<Lifecycle>,
}

impl<T, R> GossipEngine<T, R>
where
    T: PubSubTransport + 'static,
    R: RootSource + 'static,
{
    pub fn new(identity: Identity, roots: Arc<R>, transport: Arc<T>, config: GossipConfig) -> Self {
        let (events, _) = broadcast::channel(config.listener_capacity.max(1));
        Self {
            shared: Arc::new(EngineShared {
                identity,
                roots,
                config,
                clock: Mutex::new(VectorClock::new()),
                peers: RwLock::new(PeerTable::new()),
                events,
            }),
            transport,
            lifecycle: tokio::sync::Mutex::new(Lifecycle::Idle),
        }
    }

    /// Subscribe to the heartbeat topic and spawn the gossip task.
    ///
    /// # Errors
    ///
    /// - `AlreadyRunning` if started twice
    /// - `Stopped` after `stop`
    /// - `TransportUnavailable` if the subscription fails; the engine stays
    ///   `Idle` and may be started again
    pub async fn start(&self) -> Result<(), GossipError> {
        let mut lifecycle = self.lifecycle.lock().await;
        match *lifecycle {
            Lifecycle::Running { .. } => return Err(GossipError::AlreadyRunning),
            Lifecycle::Stopped => return Err(GossipError::Stopped),
            Lifecycle::Idle => {}
        }

        let topic = &self.shared.config.topic;
        let subscription = self.transport.subscribe(topic).await.map_err(|e| {
            warn!(topic = %topic, error = %e, "Heartbeat subscription failed");
            GossipError::TransportUnavailable(e.to_string())
        })?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = Worker {
            shared: self.shared.clone(),
            transport: self.transport.clone(),
            subscription,
            shutdown_rx,
        };
        let task = tokio::spawn(worker.run());

        *lifecycle = Lifecycle::Running { shutdown_tx, task };
        info!(
            peer_id = self.shared.identity.peer_id().short(),
            topic = %topic,
            interval_ms = self.shared.config.interval_ms,
            "Gossip engine started"
        );
        Ok(())
    }

    /// Stop ticking and unsubscribe. Returns after the task has exited.
    ///
    /// A no-op before `start` and after a previous `stop`.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        let (shutdown_tx, task) = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running { shutdown_tx, task } => (shutdown_tx, task),
            Lifecycle::Idle => {
                *lifecycle = Lifecycle::Idle;
                return;
            }
            Lifecycle::Stopped => {
                debug!("Gossip engine already stopped");
                return;
            }
        };

        let _ = shutdown_tx.send(true);
        if let Err(e) = task.await {
            error!(error = %e, "Gossip task ended abnormally");
        }
        info!(
            peer_id = self.shared.identity.peer_id().short(),
            "Gossip engine stopped"
        );
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> EngineState {
        match *self.lifecycle.lock().await {
            Lifecycle::Idle => EngineState::Idle,
            Lifecycle::Running { .. } => EngineState::Running,
            Lifecycle::Stopped => EngineState::Stopped,
        }
    }

    /// Register a listener for engine events.
    pub fn subscribe(&self) -> HeartbeatListener {
        HeartbeatListener::new(self.shared.events.subscribe())
    }

    /// Snapshot of the local vector clock.
    pub fn clock(&self) -> VectorClock {
        self.shared.clock.lock().clone()
    }

    /// Local peer id.
    pub fn peer_id(&self) -> &PeerId {
        self.shared.identity.peer_id()
    }

    /// Snapshot of the peer table.
    pub fn peers(&self) -> Vec<PeerRecord> {
        self.shared.peers.read().records()
    }

    /// Pin a pre-shared public key as `Verified`. Returns the peer id it
    /// belongs to.
    pub fn trust_peer(&self, public_key: Secp256k1PublicKey) -> PeerId {
        let peer_id = PeerId::from_node_id(&public_key.to_node_id());
        self.shared
            .peers
            .write()
            .pin(peer_id.clone(), public_key, TrustLevel::Verified);
        info!(peer_id = peer_id.short(), "Peer key pinned");
        peer_id
    }

    /// Peers silent for longer than `max_age`. Observational only: nothing
    /// is evicted.
    pub fn stale_peers(&self, max_age: Duration) -> Vec<PeerId> {
        self.shared.peers.read().stale(max_age, Instant::now())
    }
}

struct Worker<T: PubSubTransport, R: RootSource> {
    shared: Arc<EngineShared<R>>,
    transport: Arc<T>,
    subscription: TopicSubscription,
    shutdown_rx: watch::Receiver<bool>,
}

impl<T, R> Worker<T, R>
where
    T: PubSubTransport + 'static,
    R: RootSource + 'static,
{
    async fn run(mut self) {
        let mut interval = tokio::time::interval(self.shared.config.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut subscribed = true;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.emit_heartbeat();
                }
                message = self.subscription.recv(), if subscribed => {
                    match message {
                        Some(message) => self.shared.receive(&message.payload),
                        None => {
                            warn!(
                                topic = %self.shared.config.topic,
                                "Heartbeat subscription closed"
                            );
                            subscribed = false;
                        }
                    }
                }
                _ = self.shutdown_rx.changed() => {
                    break;
                }
            }
        }
        debug!("Gossip loop exited");
    }

    fn emit_heartbeat(&self) {
        let shared = &self.shared;
        let root = shared.roots.current_root();
        let snapshot = shared.clock.lock().tick(shared.identity.peer_id());

        let payload = match Heartbeat::signed(&shared.identity, snapshot, &root)
            .and_then(|heartbeat| heartbeat.encode())
        {
            Ok(payload) => payload,
            Err(error) => {
                error!(error = %error, "Failed to build heartbeat");
                let _ = shared.events.send(GossipEvent::PublishFailed { error });
                return;
            }
        };

        let transport = self.transport.clone();
        let events = shared.events.clone();
        let topic = shared.config.topic.clone();
        tokio::spawn(async move {
            match transport.publish(&topic, payload).await {
                Ok(receivers) => debug!(topic = %topic, receivers, "Heartbeat published"),
                Err(e) => {
                    warn!(topic = %topic, error = %e, "Heartbeat publish failed");
                    let _ = events.send(GossipEvent::PublishFailed {
                        error: GossipError::TransportUnavailable(e.to_string()),
                    });
                }
            }
        });
    }
}

impl<R: RootSource> EngineShared<R> {
    /// Handle one payload from the subscription.
    fn receive(&self, payload: &[u8]) {
        match self.accept(payload) {
            Ok(Some(event)) => {
                let _ = self.events.send(event);
            }
            Ok(None) => {}
            Err((peer_id, error)) => {
                debug!(
                    peer_id = peer_id.as_ref().map(PeerId::short),
                    error = %error,
                    "Heartbeat dropped"
                );
                let _ = self.events.send(GossipEvent::Dropped { peer_id, error });
            }
        }
    }

    /// Verify and merge a heartbeat. `Ok(None)` for self-receipt.
    fn accept(&self, payload: &[u8]) -> Result<Option<GossipEvent>, (Option<PeerId>, GossipError)> {
        let heartbeat = Heartbeat::decode(payload).map_err(|e| (None, e))?;
        let sender = heartbeat.peer_id.clone();
        if &sender == self.identity.peer_id() {
            return Ok(None);
        }

        self.verify(&heartbeat).map_err(|e| (Some(sender.clone()), e))?;

        let (ordering, trust) = {
            let mut clock = self.clock.lock();
            let ordering = heartbeat.vector_clock.compare(&clock);
            clock.merge(&heartbeat.vector_clock, &sender);
            let trust = self
                .peers
                .write()
                .record_heartbeat(&sender, &heartbeat.log_root)
                .unwrap_or(TrustLevel::Unverified);
            (ordering, trust)
        };

        let root_matches = heartbeat
            .root()
            .map_or(false, |root| root == self.roots.current_root());
        debug!(
            peer_id = sender.short(),
            ?ordering,
            ?trust,
            root_matches,
            "Heartbeat merged"
        );

        Ok(Some(GossipEvent::Heartbeat {
            heartbeat,
            trust,
            ordering,
            root_matches,
        }))
    }

    fn verify(&self, heartbeat: &Heartbeat) -> Result<(), GossipError> {
        let root = heartbeat.root()?;
        let signature = heartbeat.recoverable_signature()?;
        let sender = &heartbeat.peer_id;

        let pinned = self.peers.read().get(sender).map(|record| record.public_key);
        if let Some(public_key) = pinned {
            return public_key
                .verify(&root, &signature)
                .map_err(|e| GossipError::SignatureInvalid {
                    peer_id: sender.clone(),
                    reason: e.to_string(),
                });
        }

        if self.config.require_known_peers {
            return Err(GossipError::UnknownSigner(sender.clone()));
        }

        let recovered =
            recover_public_key(&root, &signature).map_err(|e| GossipError::SignatureInvalid {
                peer_id: sender.clone(),
                reason: e.to_string(),
            })?;
        if &PeerId::from_node_id(&recovered.to_node_id()) != sender {
            return Err(GossipError::SignatureInvalid {
                peer_id: sender.clone(),
                reason: "signer does not match claimed peer id".into(),
            });
        }

        self.peers
            .write()
            .pin(sender.clone(), recovered, TrustLevel::Unverified);
        info!(peer_id = sender.short(), "New peer pinned on first use");
        Ok(())
    }
}
