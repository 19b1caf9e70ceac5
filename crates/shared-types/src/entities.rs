//! # Core Entities
//!
//! Primitive values shared by the identity, log, gossip and registry crates.
//!
//! ## Contents
//!
//! - **Hash**: 32-byte SHA-256 digest used for leaf addresses and log roots
//! - **PeerId**: stable string identifier derived from a peer's public key

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::HexError;

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// The all-zero hash, used as the digest of an empty log and as padding.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Unique identifier for a peer in the mesh.
///
/// The value is the lowercase hex encoding of the SHA-256 digest of the
/// peer's compressed public key. It is the vector-clock index and the
/// `peerId` field of every heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Build a peer id from the 32-byte node digest.
    pub fn from_node_id(node_id: &Hash) -> Self {
        Self(hex::encode(node_id))
    }

    /// Wrap an already-encoded identifier without validation.
    ///
    /// Remote peers choose their own ids; validation happens when the
    /// signature is checked against the claimed id.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        self.0.get(..end).unwrap_or(&self.0)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Encode a hash as lowercase hex.
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Decode a lowercase or uppercase hex string into a 32-byte hash.
pub fn hash_from_hex(value: &str) -> Result<Hash, HexError> {
    let bytes = hex::decode(value).map_err(|e| HexError::InvalidHex(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(HexError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        });
    }
    let mut hash = ZERO_HASH;
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_id_from_node_id_is_hex() {
        let peer = PeerId::from_node_id(&[0xAB; 32]);
        assert_eq!(peer.as_str().len(), 64);
        assert!(peer.as_str().starts_with("abab"));
        assert_eq!(peer.short(), "abababababab");
    }

    #[test]
    fn test_peer_id_serializes_as_plain_string() {
        let peer = PeerId::from("peer-a");
        let json = serde_json::to_string(&peer).unwrap();
        assert_eq!(json, "\"peer-a\"");
    }

    #[test]
    fn test_hash_hex_roundtrip() {
        let hash = [7u8; 32];
        assert_eq!(hash_from_hex(&hash_to_hex(&hash)).unwrap(), hash);
    }

    #[test]
    fn test_hash_from_hex_rejects_wrong_length() {
        let result = hash_from_hex("abcd");
        assert_eq!(
            result,
            Err(HexError::InvalidLength {
                expected: 32,
                actual: 2
            })
        );
    }

    #[test]
    fn test_hash_from_hex_rejects_garbage() {
        assert!(matches!(hash_from_hex("zz"), Err(HexError::InvalidHex(_))));
    }
}
