//! Integration flows, one module per cross-crate concern.

pub mod gossip_mesh;
pub mod node_lifecycle;
pub mod registry_flows;

#[cfg(test)]
pub(crate) mod support {
    use hm_03_gossip::{GossipEvent, HeartbeatListener};
    use std::time::Duration;
    use tokio::time::timeout;

    pub const WAIT: Duration = Duration::from_secs(5);

    /// Next event matching `predicate`, or `None` if none arrives in time.
    pub async fn next_matching<F>(
        listener: &mut HeartbeatListener,
        predicate: F,
    ) -> Option<GossipEvent>
    where
        F: Fn(&GossipEvent) -> bool,
    {
        timeout(WAIT, async {
            loop {
                match listener.recv().await {
                    Some(event) if predicate(&event) => return Some(event),
                    Some(_) => continue,
                    None => return None,
                }
            }
        })
        .await
        .ok()
        .flatten()
    }
}
