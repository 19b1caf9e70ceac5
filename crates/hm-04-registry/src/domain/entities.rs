//! Key material stored in the path trie.

use hm_01_identity::{DerivationPath, Identity, SealedIdentity};
use shared_crypto::SecretKey;
use shared_types::PeerId;

use super::errors::RegistryError;
use super::trie::PathTrie;

/// Entity name to derivation path.
pub type LayerTrie = PathTrie<DerivationPath>;

/// Derivation path to key material.
pub type ProtocolTrie = PathTrie<KeyMaterial>;

/// What the registry holds for a registered path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyMaterial {
    /// Usable identity, registered through `insert`.
    Plain(Identity),
    /// Identity encrypted under a credential challenge.
    Sealed(SealedKey),
}

impl KeyMaterial {
    pub fn path(&self) -> &DerivationPath {
        match self {
            KeyMaterial::Plain(identity) => identity.path(),
            KeyMaterial::Sealed(sealed) => &sealed.inner.path,
        }
    }

    /// The identity, if stored in the clear.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            KeyMaterial::Plain(identity) => Some(identity),
            KeyMaterial::Sealed(_) => None,
        }
    }

    pub fn is_sealed(&self) -> bool {
        matches!(self, KeyMaterial::Sealed(_))
    }
}

/// Identity sealed for a credential registration.
///
/// The sealing key is SHA-256 of the raw challenge bytes, so only the holder
/// of the challenge can open it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedKey {
    inner: SealedIdentity,
    peer_id: PeerId,
}

impl SealedKey {
    pub(crate) fn seal(identity: &Identity, challenge: &[u8]) -> Result<Self, RegistryError> {
        let inner = identity
            .seal(&SecretKey::derive_from(challenge))
            .map_err(|e| RegistryError::Seal(e.to_string()))?;
        Ok(Self {
            inner,
            peer_id: identity.peer_id().clone(),
        })
    }

    /// Recover the identity with the raw challenge bytes.
    pub fn open(&self, challenge: &[u8]) -> Result<Identity, RegistryError> {
        self.inner
            .open(&SecretKey::derive_from(challenge))
            .map_err(|e| RegistryError::Seal(e.to_string()))
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Compressed public key, hex.
    pub fn public_key_hex(&self) -> &str {
        &self.inner.public_key
    }

    pub fn sealed(&self) -> &SealedIdentity {
        &self.inner
    }
}
