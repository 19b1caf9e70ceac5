//! # Hierarchical Deterministic Keys (BIP32)
//!
//! Derives a tree of secp256k1 key pairs from a single seed. The same seed
//! and the same sequence of child indices always produce the same key.
//!
//! ## Algorithm
//!
//! - Master: `I = HMAC-SHA512("Bitcoin seed", seed)`, key = `I[..32]`,
//!   chain code = `I[32..]`
//! - Child `i`: `I = HMAC-SHA512(chain, data)` where `data` is
//!   `0x00 || key || i` for hardened indices and `pubkey || i` otherwise;
//!   child key = `I[..32] + key (mod n)`

use crate::ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey};
use crate::CryptoError;
use hmac::{Hmac, Mac};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar};
use sha2::Sha512;
use zeroize::Zeroize;

type HmacSha512 = Hmac<Sha512>;

/// Child indices at or above this value are hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// HMAC key used for master key generation.
const MASTER_KEY_DOMAIN: &[u8] = b"Bitcoin seed";

/// Minimum seed length in bytes (BIP32).
pub const MIN_SEED_LEN: usize = 16;

/// Maximum seed length in bytes (BIP32).
pub const MAX_SEED_LEN: usize = 64;

/// Extended private key: a signing key plus the chain code needed to derive
/// its children.
#[derive(Clone)]
pub struct ExtendedPrivateKey {
    signing_key: SigningKey,
    chain_code: [u8; 32],
    depth: u8,
    child_number: u32,
}

impl ExtendedPrivateKey {
    /// Derive the master key from a seed.
    ///
    /// # Errors
    ///
    /// - `InvalidSeedLength` if the seed is outside 16..=64 bytes
    /// - `InvalidPrivateKey` if the derived key is zero or not below the
    ///   curve order
    pub fn master(seed: &[u8]) -> Result<Self, CryptoError> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(CryptoError::InvalidSeedLength {
                min: MIN_SEED_LEN,
                max: MAX_SEED_LEN,
                actual: seed.len(),
            });
        }

        let mut output = hmac_sha512(MASTER_KEY_DOMAIN, &[seed])?;
        let result = Self::from_hmac_output(&output, 0, 0);
        output.zeroize();
        result
    }

    /// Derive the child at `index` (hardened when `index >= HARDENED_OFFSET`).
    pub fn derive_child(&self, index: u32) -> Result<Self, CryptoError> {
        let depth = self
            .depth
            .checked_add(1)
            .ok_or_else(|| CryptoError::KeyDerivationFailed("maximum depth reached".into()))?;

        let index_bytes = index.to_be_bytes();
        let mut output = if index >= HARDENED_OFFSET {
            let mut secret: [u8; 32] = self.signing_key.to_bytes().into();
            let result = hmac_sha512(&self.chain_code, &[&[0u8], &secret, &index_bytes]);
            secret.zeroize();
            result?
        } else {
            let public = self.public_key();
            hmac_sha512(&self.chain_code, &[public.as_bytes(), &index_bytes])?
        };

        let tweak: Option<Scalar> =
            Scalar::from_repr(FieldBytes::clone_from_slice(&output[..32])).into();
        let tweak = match tweak {
            Some(tweak) => tweak,
            None => {
                output.zeroize();
                return Err(CryptoError::KeyDerivationFailed(format!(
                    "tweak for child {index} exceeds curve order"
                )));
            }
        };

        let parent: Scalar = **self.signing_key.as_nonzero_scalar();
        let child = parent + tweak;
        let signing_key =
            SigningKey::from_bytes(&child.to_repr()).map_err(|_| CryptoError::InvalidPrivateKey)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&output[32..]);
        output.zeroize();

        Ok(Self {
            signing_key,
            chain_code,
            depth,
            child_number: index,
        })
    }

    /// Derive along a sequence of child indices.
    pub fn derive_indices(&self, indices: &[u32]) -> Result<Self, CryptoError> {
        let mut current = self.clone();
        for index in indices {
            current = current.derive_child(*index)?;
        }
        Ok(current)
    }

    fn from_hmac_output(
        output: &[u8; 64],
        depth: u8,
        child_number: u32,
    ) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_bytes(FieldBytes::from_slice(&output[..32]))
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&output[32..]);
        Ok(Self {
            signing_key,
            chain_code,
            depth,
            child_number,
        })
    }

    /// Compressed public key.
    pub fn public_key(&self) -> Secp256k1PublicKey {
        self.key_pair().public_key()
    }

    /// Signing key pair for this node.
    pub fn key_pair(&self) -> Secp256k1KeyPair {
        Secp256k1KeyPair::from_signing_key(self.signing_key.clone())
    }

    /// Chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Depth in the tree (master = 0).
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Index this key was derived at (0 for the master).
    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    /// Secret key bytes (for sealing).
    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }

    /// Rebuild an extended key from its serialized parts.
    pub fn from_parts(
        private_key: [u8; 32],
        chain_code: [u8; 32],
        depth: u8,
        child_number: u32,
    ) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_bytes(FieldBytes::from_slice(&private_key))
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self {
            signing_key,
            chain_code,
            depth,
            child_number,
        })
    }
}

impl Drop for ExtendedPrivateKey {
    fn drop(&mut self) {
        self.chain_code.zeroize();
    }
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 64], CryptoError> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let mut output = [0u8; 64];
    output.copy_from_slice(&mac.finalize().into_bytes());
    Ok(output)
}
