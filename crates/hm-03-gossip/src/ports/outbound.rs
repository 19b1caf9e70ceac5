//! Outbound ports (SPI) for the gossip engine.

use hm_02_content_log::ContentLog;
use shared_types::Hash;

pub use shared_bus::PubSubTransport;

/// Source of the log root published in every heartbeat.
pub trait RootSource: Send + Sync {
    /// Root over a fully appended snapshot of the log.
    fn current_root(&self) -> Hash;
}

impl RootSource for ContentLog {
    fn current_root(&self) -> Hash {
        self.root()
    }
}
