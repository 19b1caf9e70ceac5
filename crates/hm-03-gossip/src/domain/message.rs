//! # Heartbeat Wire Format
//!
//! UTF-8 JSON, camelCase:
//!
//! ```json
//! {"peerId":"<hex>","vectorClock":{"<peerId>":3},"logRoot":"<hex32>","signature":"<hex65>"}
//! ```
//!
//! `merkleRoot` is accepted in place of `logRoot` on decode. The signature
//! is a recoverable secp256k1 signature over the raw 32 root bytes.

use hm_01_identity::Identity;
use serde::{Deserialize, Serialize};
use shared_crypto::RecoverableSignature;
use shared_types::{hash_from_hex, hash_to_hex, Hash, PeerId};

use super::clock::VectorClock;
use super::errors::GossipError;

/// A signed heartbeat as published on the topic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heartbeat {
    pub peer_id: PeerId,
    pub vector_clock: VectorClock,
    #[serde(alias = "merkleRoot")]
    pub log_root: String,
    pub signature: String,
}

impl Heartbeat {
    /// Build and sign a heartbeat for `identity`.
    pub fn signed(
        identity: &Identity,
        vector_clock: VectorClock,
        log_root: &Hash,
    ) -> Result<Self, GossipError> {
        let signature = identity
            .sign(log_root)
            .map_err(|e| GossipError::Signing(e.to_string()))?;
        Ok(Self {
            peer_id: identity.peer_id().clone(),
            vector_clock,
            log_root: hash_to_hex(log_root),
            signature: signature.to_hex(),
        })
    }

    /// Serialize to wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>, GossipError> {
        serde_json::to_vec(self).map_err(|e| GossipError::MalformedMessage(e.to_string()))
    }

    /// Parse wire bytes, checking field shapes.
    ///
    /// Signature validity is not checked here.
    pub fn decode(bytes: &[u8]) -> Result<Self, GossipError> {
        let heartbeat: Self = serde_json::from_slice(bytes)
            .map_err(|e| GossipError::MalformedMessage(e.to_string()))?;
        if heartbeat.peer_id.as_str().is_empty() {
            return Err(GossipError::MalformedMessage("empty peerId".into()));
        }
        heartbeat.root()?;
        heartbeat.recoverable_signature()?;
        Ok(heartbeat)
    }

    /// Decoded root bytes.
    pub fn root(&self) -> Result<Hash, GossipError> {
        hash_from_hex(&self.log_root)
            .map_err(|e| GossipError::MalformedMessage(format!("logRoot: {e}")))
    }

    /// Decoded signature.
    pub fn recoverable_signature(&self) -> Result<RecoverableSignature, GossipError> {
        RecoverableSignature::from_hex(&self.signature)
            .map_err(|e| GossipError::MalformedMessage(format!("signature: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::recover_public_key;

    fn identity() -> Identity {
        Identity::from_seed(&[0x21; 32]).unwrap()
    }

    #[test]
    fn test_signed_heartbeat_recovers_to_sender() {
        let identity = identity();
        let mut clock = VectorClock::new();
        let snapshot = clock.tick(identity.peer_id());
        let root = [9u8; 32];

        let heartbeat = Heartbeat::signed(&identity, snapshot, &root).unwrap();
        let signature = heartbeat.recoverable_signature().unwrap();
        assert_eq!(
            &recover_public_key(&root, &signature).unwrap(),
            identity.public_key()
        );
    }

    #[test]
    fn test_wire_field_names() {
        let identity = identity();
        let heartbeat = Heartbeat::signed(&identity, VectorClock::new(), &[0u8; 32]).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&heartbeat.encode().unwrap()).unwrap();
        for field in ["peerId", "vectorClock", "logRoot", "signature"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn test_decode_accepts_merkle_root_alias() {
        let identity = identity();
        let heartbeat = Heartbeat::signed(&identity, VectorClock::new(), &[3u8; 32]).unwrap();
        let legacy = serde_json::json!({
            "peerId": heartbeat.peer_id,
            "vectorClock": {},
            "merkleRoot": heartbeat.log_root,
            "signature": heartbeat.signature,
        });
        let decoded = Heartbeat::decode(legacy.to_string().as_bytes()).unwrap();
        assert_eq!(decoded, heartbeat);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let cases: [&[u8]; 4] = [
            b"not json",
            br#"{"peerId":"a","vectorClock":{}}"#,
            br#"{"peerId":"a","vectorClock":{},"logRoot":"zz","signature":"00"}"#,
            br#"{"peerId":"a","vectorClock":{"a":-1},"logRoot":"00","signature":"00"}"#,
        ];
        for case in cases {
            assert!(matches!(
                Heartbeat::decode(case),
                Err(GossipError::MalformedMessage(_))
            ));
        }
    }

    #[test]
    fn test_decode_rejects_short_signature() {
        let identity = identity();
        let mut heartbeat = Heartbeat::signed(&identity, VectorClock::new(), &[1u8; 32]).unwrap();
        heartbeat.signature.truncate(64);
        let bytes = serde_json::to_vec(&heartbeat).unwrap();
        assert!(matches!(
            Heartbeat::decode(&bytes),
            Err(GossipError::MalformedMessage(_))
        ));
    }
}
