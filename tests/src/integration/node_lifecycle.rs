//! # Node Lifecycle
//!
//! Full nodes built through `node-runtime`'s container, sharing one bus.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hm_01_identity::Role;
    use hm_03_gossip::{EngineState, GossipConfig, GossipError, GossipEvent};
    use node_runtime::{IdentityConfig, NodeConfig, NodeRuntime, SubsystemContainer};
    use shared_bus::InMemoryPubSub;

    use crate::integration::support::next_matching;

    fn config(seed: u8, role: Role) -> NodeConfig {
        NodeConfig {
            identity: IdentityConfig {
                seed_hex: Some(hex::encode([seed; 32])),
                role,
            },
            gossip: GossipConfig::for_testing(),
            ..NodeConfig::default()
        }
    }

    fn node(seed: u8, role: Role, bus: &Arc<InMemoryPubSub>) -> NodeRuntime {
        NodeRuntime::from_container(
            SubsystemContainer::with_bus(config(seed, role), Arc::clone(bus)).unwrap(),
        )
    }

    /// Test: two nodes with genesis-only logs agree on the root
    #[tokio::test]
    async fn test_two_nodes_agree_on_genesis_root() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host = node(1, Role::Host, &bus);
        let client = node(2, Role::Client, &bus);
        let client_id = client.container().identity.peer_id().clone();

        let mut listener = host.container().gossip.subscribe();
        host.start().await.unwrap();
        client.start().await.unwrap();

        let event = next_matching(&mut listener, |e| {
            matches!(e, GossipEvent::Heartbeat { heartbeat, .. } if heartbeat.peer_id == client_id)
        })
        .await
        .unwrap();
        assert!(matches!(event, GossipEvent::Heartbeat { root_matches: true, .. }));

        host.shutdown().await;
        client.shutdown().await;
        assert_eq!(host.state().await, EngineState::Stopped);
    }

    /// Test: a stopped node refuses to restart
    #[tokio::test]
    async fn test_stopped_node_does_not_restart() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host = node(1, Role::Host, &bus);
        host.start().await.unwrap();
        host.shutdown().await;

        let error = host.container().gossip.start().await.unwrap_err();
        assert_eq!(error, GossipError::Stopped);
    }

    /// Test: shutdown before start leaves the engine idle
    #[tokio::test]
    async fn test_shutdown_before_start() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host = node(1, Role::Host, &bus);
        host.shutdown().await;
        assert_eq!(host.state().await, EngineState::Idle);
        host.start().await.unwrap();
        host.shutdown().await;
    }

    /// Test: the node's registry runs beside gossip from the same seed
    #[tokio::test]
    async fn test_registry_available_on_node() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host = node(1, Role::Host, &bus);
        let container = host.container();

        let jane = container.registry.insert("jane_doe").unwrap();
        assert_eq!(container.registry.search("jane_doe").unwrap().0, *jane.path());
        assert_ne!(jane.peer_id(), container.identity.peer_id());
    }
}
