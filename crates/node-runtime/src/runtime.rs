//! # Node Runtime
//!
//! Starts the gossip engine, follows its events in a background task, and
//! tears everything down on shutdown.

use anyhow::{Context, Result};
use hm_03_gossip::{EngineState, GossipEvent, HeartbeatListener};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::container::{NodeConfig, SubsystemContainer};

/// A running node.
pub struct NodeRuntime {
    container: Arc<SubsystemContainer>,
    /// Shutdown signal and handle of the event monitor while running.
    monitor: Mutex<Option<(watch::Sender<bool>, JoinHandle<()>)>>,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Result<Self> {
        Ok(Self::from_container(SubsystemContainer::new(config)?))
    }

    pub fn from_container(container: SubsystemContainer) -> Self {
        Self {
            container: Arc::new(container),
            monitor: Mutex::new(None),
        }
    }

    /// Start gossiping and spawn the event monitor.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Hypergraph Mesh Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let listener = self.container.gossip.subscribe();
        self.container
            .gossip
            .start()
            .await
            .context("Failed to start gossip engine")?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(monitor_events(listener, shutdown_rx));
        *self.monitor.lock() = Some((shutdown_tx, handle));

        info!(
            peer_id = %self.container.identity.peer_id(),
            topic = %self.container.config.gossip.topic,
            interval_ms = self.container.config.gossip.interval_ms,
            "Node running"
        );
        Ok(())
    }

    /// Stop the engine and the monitor. Safe to call more than once.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.container.gossip.stop().await;

        let monitor = self.monitor.lock().take();
        if let Some((shutdown_tx, handle)) = monitor {
            let _ = shutdown_tx.send(true);
            if let Err(e) = handle.await {
                warn!(error = %e, "Event monitor ended abnormally");
            }
        }

        let peers = self.container.gossip.peers();
        info!(
            peers = peers.len(),
            clock = ?self.container.gossip.clock(),
            "Shutdown complete"
        );
    }

    pub async fn state(&self) -> EngineState {
        self.container.gossip.state().await
    }

    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}

async fn monitor_events(mut listener: HeartbeatListener, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            event = listener.recv() => match event {
                Some(event) => log_event(&event),
                None => break,
            },
            _ = shutdown.changed() => {
                debug!("Event monitor shutting down");
                break;
            }
        }
    }
}

fn log_event(event: &GossipEvent) {
    match event {
        GossipEvent::Heartbeat {
            heartbeat,
            trust,
            ordering,
            root_matches,
        } => info!(
            peer_id = heartbeat.peer_id.short(),
            trust = ?trust,
            ordering = ?ordering,
            root_matches,
            "Heartbeat"
        ),
        GossipEvent::PublishFailed { error } => {
            warn!(error = %error, "Heartbeat publish failed")
        }
        GossipEvent::Dropped { peer_id, error } => debug!(
            peer_id = peer_id.as_ref().map(|p| p.short()),
            error = %error,
            "Heartbeat dropped"
        ),
    }
}
