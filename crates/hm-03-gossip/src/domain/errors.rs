//! Error types for the gossip engine.

use shared_types::PeerId;
use thiserror::Error;

/// Gossip engine failures.
///
/// Receipt errors never stop the engine: the offending heartbeat is dropped
/// and reported as a `GossipEvent::Dropped`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GossipError {
    /// `start` called while the engine is running.
    #[error("Gossip engine already running")]
    AlreadyRunning,

    /// `start` called after `stop`; an engine is not restartable.
    #[error("Gossip engine stopped")]
    Stopped,

    /// Subscribe or publish could not reach the transport.
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// Signature does not verify for the claimed sender.
    #[error("Invalid heartbeat signature from {peer_id}: {reason}")]
    SignatureInvalid { peer_id: PeerId, reason: String },

    /// Payload is not a well-formed heartbeat.
    #[error("Malformed heartbeat: {0}")]
    MalformedMessage(String),

    /// Sender has no pinned key and unknown peers are not accepted.
    #[error("Unknown signer {0}")]
    UnknownSigner(PeerId),

    /// Local signing failed.
    #[error("Failed to sign heartbeat: {0}")]
    Signing(String),
}
