//! # Subsystem Container
//!
//! ```text
//! seed ──▶ Identity ─────────────┐
//!                                ▼
//! ContentLog ──root──▶ GossipEngine ◀──▶ InMemoryPubSub
//! Registry (seed, m/369/0)
//! ```

use anyhow::{Context, Result};
use hm_01_identity::{derive, Identity};
use hm_02_content_log::{ContentLog, LeafHash};
use hm_03_gossip::GossipEngine;
use hm_04_registry::Registry;
use shared_bus::InMemoryPubSub;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::container::config::NodeConfig;

/// Gossip engine as wired by the runtime.
pub type NodeGossipEngine = GossipEngine<InMemoryPubSub, ContentLog>;

/// Payload of the first log entry every node appends.
pub const GENESIS_LEAF: &[u8] = b"hypergraph-mesh/genesis";

/// Every subsystem of one node.
pub struct SubsystemContainer {
    pub identity: Identity,
    pub log: Arc<ContentLog>,
    pub bus: Arc<InMemoryPubSub>,
    pub gossip: NodeGossipEngine,
    pub registry: Arc<Registry>,
    pub config: NodeConfig,
}

impl SubsystemContainer {
    /// Build a node on its own in-memory bus.
    pub fn new(config: NodeConfig) -> Result<Self> {
        Self::with_bus(config, Arc::new(InMemoryPubSub::new()))
    }

    /// Build a node on a shared bus, so several nodes in one process can
    /// gossip with each other.
    #[instrument(name = "subsystem_init", skip_all)]
    pub fn with_bus(config: NodeConfig, bus: Arc<InMemoryPubSub>) -> Result<Self> {
        let seed = config.identity.seed().context("Invalid identity seed")?;

        let identity = derive(&seed, Some(config.identity.role))
            .context("Failed to derive node identity")?;
        info!(
            role = %config.identity.role,
            path = %identity.path(),
            peer_id = %identity.peer_id(),
            "Node identity derived"
        );

        let log = Arc::new(ContentLog::new());
        let genesis: LeafHash = log.append(GENESIS_LEAF);
        info!(leaf = %genesis, root = %log.root_hex(), "Genesis leaf appended");

        let gossip = GossipEngine::new(
            identity.clone(),
            Arc::clone(&log),
            Arc::clone(&bus),
            config.gossip.clone(),
        );

        let registry = Arc::new(
            Registry::new(&seed, config.registry.clone())
                .context("Failed to initialize registry")?,
        );

        Ok(Self {
            identity,
            log,
            bus,
            gossip,
            registry,
            config,
        })
    }
}
