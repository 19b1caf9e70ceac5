//! # Gossip Mesh
//!
//! Several engines share one `InMemoryPubSub`, the way peers in one process
//! would share a pub/sub topic:
//!
//! ```text
//! host ──┐                    ┌──▶ host
//! client ├──▶ "heartbeat" ────┼──▶ client
//! mallory┘   (InMemoryPubSub) └──▶ provider
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use hm_01_identity::{derive, Identity, Role};
    use hm_02_content_log::ContentLog;
    use hm_03_gossip::{
        GossipConfig, GossipEngine, GossipError, GossipEvent, Heartbeat, TrustLevel, VectorClock,
    };
    use shared_bus::{InMemoryPubSub, PubSubTransport};
    use tokio::time::sleep;

    use crate::integration::support::next_matching;

    type Engine = GossipEngine<InMemoryPubSub, ContentLog>;

    fn identity(seed: u8, role: Role) -> Identity {
        derive(&[seed; 32], Some(role)).unwrap()
    }

    fn engine_with(
        identity: Identity,
        log: Arc<ContentLog>,
        bus: &Arc<InMemoryPubSub>,
        config: GossipConfig,
    ) -> Engine {
        GossipEngine::new(identity, log, Arc::clone(bus), config)
    }

    fn engine(identity: Identity, bus: &Arc<InMemoryPubSub>) -> Engine {
        engine_with(
            identity,
            Arc::new(ContentLog::new()),
            bus,
            GossipConfig::for_testing(),
        )
    }

    fn heartbeat_from(event: &GossipEvent, peer: &Identity) -> bool {
        matches!(
            event,
            GossipEvent::Heartbeat { heartbeat, .. } if &heartbeat.peer_id == peer.peer_id()
        )
    }

    /// Test: three peers on one bus learn each other's counters
    #[tokio::test]
    async fn test_three_peers_converge() {
        let bus = Arc::new(InMemoryPubSub::new());
        let ids = [
            identity(1, Role::Host),
            identity(2, Role::Provider),
            identity(3, Role::Client),
        ];
        let engines: Vec<Engine> = ids.iter().map(|id| engine(id.clone(), &bus)).collect();

        let mut listener = engines[0].subscribe();
        futures::future::join_all(engines.iter().map(|e| e.start()))
            .await
            .into_iter()
            .for_each(|r| r.unwrap());

        for peer in &ids[1..] {
            assert!(
                next_matching(&mut listener, |e| heartbeat_from(e, peer))
                    .await
                    .is_some(),
                "host never heard from {}",
                peer.peer_id().short()
            );
        }

        let clock = engines[0].clock();
        for peer in &ids {
            assert!(clock.get(peer.peer_id()) >= 1);
        }
        assert_eq!(engines[0].peers().len(), 2);

        for engine in &engines {
            engine.stop().await;
        }
    }

    /// Test: remote counters only grow as heartbeats keep arriving
    #[tokio::test]
    async fn test_remote_counter_is_monotonic() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host = identity(1, Role::Host);
        let client = identity(2, Role::Client);
        let a = engine(host, &bus);
        let b = engine(client.clone(), &bus);

        let mut listener = a.subscribe();
        a.start().await.unwrap();
        b.start().await.unwrap();

        let mut last = 0;
        for _ in 0..3 {
            next_matching(&mut listener, |e| heartbeat_from(e, &client))
                .await
                .unwrap();
            let seen = a.clock().get(client.peer_id());
            assert!(seen >= last);
            last = seen;
        }
        assert!(last >= 3);

        a.stop().await;
        b.stop().await;
    }

    /// Test: a heartbeat signed by one key but claiming another peer id is
    /// dropped and never merged
    #[tokio::test]
    async fn test_forged_peer_id_is_dropped() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host = engine(identity(1, Role::Host), &bus);
        let victim = identity(2, Role::Client);
        let mallory = identity(9, Role::Client);

        let mut listener = host.subscribe();
        host.start().await.unwrap();

        let forged_clock: VectorClock = [(victim.peer_id().clone(), 1_000)].into_iter().collect();
        let mut forged = Heartbeat::signed(&mallory, forged_clock, &[7u8; 32]).unwrap();
        forged.peer_id = victim.peer_id().clone();
        bus.publish("heartbeat", forged.encode().unwrap())
            .await
            .unwrap();

        let event = next_matching(&mut listener, |e| matches!(e, GossipEvent::Dropped { .. }))
            .await
            .unwrap();
        let GossipEvent::Dropped { peer_id, error } = event else {
            unreachable!()
        };
        assert_eq!(peer_id.as_ref(), Some(victim.peer_id()));
        assert!(matches!(error, GossipError::SignatureInvalid { .. }));
        assert_eq!(host.clock().get(victim.peer_id()), 0);
        assert!(host.peers().is_empty());

        host.stop().await;
    }

    /// Test: once a key is pinned, a different signer for that peer id fails
    #[tokio::test]
    async fn test_pinned_key_rejects_other_signer() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host = engine(identity(1, Role::Host), &bus);
        let victim = identity(2, Role::Client);
        let mallory = identity(9, Role::Client);

        host.trust_peer(*victim.public_key());
        let mut listener = host.subscribe();
        host.start().await.unwrap();

        let mut forged = Heartbeat::signed(&mallory, VectorClock::new(), &[1u8; 32]).unwrap();
        forged.peer_id = victim.peer_id().clone();
        bus.publish("heartbeat", forged.encode().unwrap())
            .await
            .unwrap();

        let event = next_matching(&mut listener, |e| matches!(e, GossipEvent::Dropped { .. }))
            .await
            .unwrap();
        assert!(matches!(
            event,
            GossipEvent::Dropped {
                error: GossipError::SignatureInvalid { .. },
                ..
            }
        ));
        host.stop().await;
    }

    /// Test: garbage on the topic is dropped without a peer id
    #[tokio::test]
    async fn test_malformed_payload_is_dropped() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host = engine(identity(1, Role::Host), &bus);
        let mut listener = host.subscribe();
        host.start().await.unwrap();

        bus.publish("heartbeat", b"{\"peerId\":".to_vec())
            .await
            .unwrap();

        let event = next_matching(&mut listener, |e| matches!(e, GossipEvent::Dropped { .. }))
            .await
            .unwrap();
        assert!(matches!(
            event,
            GossipEvent::Dropped {
                peer_id: None,
                error: GossipError::MalformedMessage(_),
            }
        ));
        host.stop().await;
    }

    /// Test: with pre-shared keys required, only trusted peers are merged
    #[tokio::test]
    async fn test_require_known_peers() {
        let bus = Arc::new(InMemoryPubSub::new());
        let strict = GossipConfig {
            require_known_peers: true,
            ..GossipConfig::for_testing()
        };
        let host = engine_with(
            identity(1, Role::Host),
            Arc::new(ContentLog::new()),
            &bus,
            strict,
        );
        let friend = identity(2, Role::Client);
        let stranger = identity(3, Role::Context);
        let friend_engine = engine(friend.clone(), &bus);
        let stranger_engine = engine(stranger.clone(), &bus);

        host.trust_peer(*friend.public_key());
        let mut listener = host.subscribe();
        host.start().await.unwrap();
        friend_engine.start().await.unwrap();
        stranger_engine.start().await.unwrap();

        let rejected = next_matching(&mut listener, |e| {
            matches!(e, GossipEvent::Dropped { error: GossipError::UnknownSigner(_), .. })
        })
        .await
        .unwrap();
        assert!(matches!(
            rejected,
            GossipEvent::Dropped { peer_id: Some(ref p), .. } if p == stranger.peer_id()
        ));

        let accepted = next_matching(&mut listener, |e| heartbeat_from(e, &friend))
            .await
            .unwrap();
        assert!(matches!(
            accepted,
            GossipEvent::Heartbeat { trust: TrustLevel::Verified, .. }
        ));

        for engine in [&host, &friend_engine, &stranger_engine] {
            engine.stop().await;
        }

        // The stranger's counter may still arrive inside the friend's clock;
        // the stranger itself is never pinned or merged directly.
        let pinned: Vec<_> = host.peers().into_iter().map(|p| p.peer_id).collect();
        assert_eq!(pinned, vec![friend.peer_id().clone()]);
        while let Some(event) = listener.try_recv() {
            assert!(!heartbeat_from(&event, &stranger));
        }
    }

    /// Test: publish failures surface as events and gossip resumes once the
    /// transport is back
    #[tokio::test]
    async fn test_publish_failure_then_recovery() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host = engine(identity(1, Role::Host), &bus);
        let client_id = identity(2, Role::Client);
        let client = engine(client_id.clone(), &bus);

        let mut listener = host.subscribe();
        host.start().await.unwrap();
        client.start().await.unwrap();

        bus.set_online(false);
        assert!(next_matching(&mut listener, |e| {
            matches!(
                e,
                GossipEvent::PublishFailed {
                    error: GossipError::TransportUnavailable(_)
                }
            )
        })
        .await
        .is_some());

        bus.set_online(true);
        assert!(next_matching(&mut listener, |e| heartbeat_from(e, &client_id))
            .await
            .is_some());

        host.stop().await;
        client.stop().await;
    }

    /// Test: peers with identical logs report matching roots
    #[tokio::test]
    async fn test_root_match_tracks_log_contents() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host_log = Arc::new(ContentLog::new());
        let client_log = Arc::new(ContentLog::new());
        host_log.append(b"entry-1".to_vec());
        client_log.append(b"entry-1".to_vec());

        let client_id = identity(2, Role::Client);
        let host = engine_with(
            identity(1, Role::Host),
            Arc::clone(&host_log),
            &bus,
            GossipConfig::for_testing(),
        );
        let client = engine_with(
            client_id.clone(),
            Arc::clone(&client_log),
            &bus,
            GossipConfig::for_testing(),
        );

        let mut listener = host.subscribe();
        host.start().await.unwrap();
        client.start().await.unwrap();

        let event = next_matching(&mut listener, |e| heartbeat_from(e, &client_id))
            .await
            .unwrap();
        assert!(matches!(event, GossipEvent::Heartbeat { root_matches: true, .. }));

        client_log.append(b"entry-2".to_vec());
        let diverged = next_matching(&mut listener, |e| {
            matches!(e, GossipEvent::Heartbeat { heartbeat, root_matches: false, .. }
                if &heartbeat.peer_id == client_id.peer_id())
        })
        .await;
        assert!(diverged.is_some());

        let record = host
            .peers()
            .into_iter()
            .find(|p| &p.peer_id == client_id.peer_id())
            .unwrap();
        assert_eq!(record.trust, TrustLevel::Unverified);
        assert!(record.heartbeats_received >= 2);

        host.stop().await;
        client.stop().await;
    }

    /// Test: a stopped peer goes stale while the others keep talking
    #[tokio::test]
    async fn test_stopped_peer_goes_stale() {
        let bus = Arc::new(InMemoryPubSub::new());
        let host = engine(identity(1, Role::Host), &bus);
        let client_id = identity(2, Role::Client);
        let client = engine(client_id.clone(), &bus);

        let mut listener = host.subscribe();
        host.start().await.unwrap();
        client.start().await.unwrap();
        next_matching(&mut listener, |e| heartbeat_from(e, &client_id))
            .await
            .unwrap();

        client.stop().await;
        sleep(Duration::from_millis(400)).await;

        assert_eq!(
            host.stale_peers(Duration::from_millis(200)),
            vec![client_id.peer_id().clone()]
        );
        host.stop().await;
    }
}
