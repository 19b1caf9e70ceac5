//! # Domain Entities
//!
//! A peer identity: an HD key node plus the path it was derived at.

use serde::{Deserialize, Serialize};
use shared_crypto::{
    open, seal, CryptoError, ExtendedPrivateKey, Nonce, RecoverableSignature, SealedBox,
    SecretKey, Secp256k1KeyPair, Secp256k1PublicKey,
};
use shared_types::PeerId;
use std::fmt;
use tracing::debug;
use zeroize::Zeroize;

use super::errors::IdentityError;
use super::value_objects::DerivationPath;

/// Serialized extended key length: key(32) || chain code(32) || depth(1) || child(4).
const SEALED_PLAINTEXT_LEN: usize = 69;

/// A derived peer identity.
///
/// Same seed and same path always give bit-identical key material. An
/// identity never changes after creation; children are independent values
/// that only remember their own path.
#[derive(Clone)]
pub struct Identity {
    key: ExtendedPrivateKey,
    path: DerivationPath,
    public_key: Secp256k1PublicKey,
    peer_id: PeerId,
}

impl Identity {
    /// Master identity (path `m`) for a seed.
    ///
    /// # Errors
    ///
    /// `InvalidSeed` when the seed is not 16..=64 bytes or is all zeros.
    pub fn from_seed(seed: &[u8]) -> Result<Self, IdentityError> {
        if seed.iter().all(|b| *b == 0) {
            return Err(IdentityError::InvalidSeed("seed carries no entropy".into()));
        }
        let key = ExtendedPrivateKey::master(seed).map_err(|e| match e {
            CryptoError::InvalidSeedLength { .. } => IdentityError::InvalidSeed(e.to_string()),
            other => IdentityError::Derivation(other.to_string()),
        })?;
        Ok(Self::from_key(key, DerivationPath::master()))
    }

    fn from_key(key: ExtendedPrivateKey, path: DerivationPath) -> Self {
        let public_key = key.public_key();
        let peer_id = PeerId::from_node_id(&public_key.to_node_id());
        Self {
            key,
            path,
            public_key,
            peer_id,
        }
    }

    /// Derive the child at `index` below this identity.
    pub fn derive_child(&self, index: u32) -> Result<Self, IdentityError> {
        let key = self
            .key
            .derive_child(index)
            .map_err(|e| IdentityError::Derivation(e.to_string()))?;
        Ok(Self::from_key(key, self.path.child(index)))
    }

    /// Walk an absolute path. Only valid on the master identity.
    ///
    /// # Errors
    ///
    /// `PathMismatch` when called on anything other than `m`.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, IdentityError> {
        if !self.path.is_master() {
            return Err(IdentityError::PathMismatch {
                current: self.path.to_string(),
                requested: path.to_string(),
            });
        }
        let key = self
            .key
            .derive_indices(path.indices())
            .map_err(|e| IdentityError::Derivation(e.to_string()))?;
        debug!(path = %path, "Derived identity");
        Ok(Self::from_key(key, path.clone()))
    }

    /// Sign a message with this identity's key.
    pub fn sign(&self, message: &[u8]) -> Result<RecoverableSignature, IdentityError> {
        self.key
            .key_pair()
            .sign(message)
            .map_err(|e| IdentityError::Derivation(e.to_string()))
    }

    /// Compressed public key.
    pub fn public_key(&self) -> &Secp256k1PublicKey {
        &self.public_key
    }

    /// Hex of SHA-256 over the compressed public key.
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Path this identity was derived at.
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// Chain code of the underlying HD node.
    pub fn chain_code(&self) -> &[u8; 32] {
        self.key.chain_code()
    }

    /// Signing key pair, for components that sign on this identity's behalf.
    pub fn key_pair(&self) -> Secp256k1KeyPair {
        self.key.key_pair()
    }

    /// Encrypt the extended key under `key`.
    ///
    /// The path and public key stay in clear so a sealed identity can be
    /// indexed without being opened. The path is bound as associated data.
    pub fn seal(&self, key: &SecretKey) -> Result<SealedIdentity, IdentityError> {
        let mut plaintext = Vec::with_capacity(SEALED_PLAINTEXT_LEN);
        let mut secret = self.key.private_key_bytes();
        plaintext.extend_from_slice(&secret);
        secret.zeroize();
        plaintext.extend_from_slice(self.key.chain_code());
        plaintext.push(self.key.depth());
        plaintext.extend_from_slice(&self.key.child_number().to_be_bytes());

        let result = seal(key, &plaintext, self.path.to_string().as_bytes());
        plaintext.zeroize();
        let sealed = result.map_err(|e| IdentityError::Seal(e.to_string()))?;

        Ok(SealedIdentity {
            path: self.path.clone(),
            public_key: self.public_key.to_hex(),
            ciphertext: sealed.ciphertext,
            nonce: *sealed.nonce.as_bytes(),
        })
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("path", &self.path.to_string())
            .field("peer_id", &self.peer_id.short())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.public_key == other.public_key
    }
}

impl Eq for Identity {}

/// An identity encrypted with XChaCha20-Poly1305.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedIdentity {
    pub path: DerivationPath,
    pub public_key: String,
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; 24],
}

impl SealedIdentity {
    /// Decrypt and rebuild the identity.
    ///
    /// # Errors
    ///
    /// `Seal` for a wrong key, tampered ciphertext, a path edited after
    /// sealing, or a public key that does not match the decrypted material.
    pub fn open(&self, key: &SecretKey) -> Result<Identity, IdentityError> {
        let sealed = SealedBox {
            nonce: Nonce::from_bytes(self.nonce),
            ciphertext: self.ciphertext.clone(),
        };
        let mut plaintext = open(key, &sealed, self.path.to_string().as_bytes())
            .map_err(|e| IdentityError::Seal(e.to_string()))?;
        let result = Self::rebuild(&plaintext);
        plaintext.zeroize();

        let identity = Identity::from_key(result?, self.path.clone());
        if identity.public_key.to_hex() != self.public_key {
            return Err(IdentityError::Seal(
                "sealed public key does not match key material".into(),
            ));
        }
        Ok(identity)
    }

    fn rebuild(plaintext: &[u8]) -> Result<ExtendedPrivateKey, IdentityError> {
        if plaintext.len() != SEALED_PLAINTEXT_LEN {
            return Err(IdentityError::Seal(format!(
                "sealed payload has {} bytes, expected {}",
                plaintext.len(),
                SEALED_PLAINTEXT_LEN
            )));
        }
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&plaintext[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&plaintext[32..64]);
        let depth = plaintext[64];
        let mut child = [0u8; 4];
        child.copy_from_slice(&plaintext[65..69]);

        let result = ExtendedPrivateKey::from_parts(
            secret,
            chain_code,
            depth,
            u32::from_be_bytes(child),
        );
        secret.zeroize();
        chain_code.zeroize();
        result.map_err(|e| IdentityError::Seal(e.to_string()))
    }
}
