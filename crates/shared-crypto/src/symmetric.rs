//! # Sealing
//!
//! XChaCha20-Poly1305 with associated data. The associated data is not
//! encrypted but is authenticated: a box only opens under the same key *and*
//! the same context it was sealed with, so a sealed blob cannot be moved to
//! another record.

use crate::hashing::sha256;
use crate::CryptoError;
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use zeroize::Zeroize;

/// Byte length of an XChaCha20 nonce.
pub const NONCE_LEN: usize = 24;

/// 256-bit sealing key, wiped on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// SHA-256 of `material`. Turns a credential challenge into a key.
    pub fn derive_from(material: &[u8]) -> Self {
        Self(sha256(material))
    }

    /// Random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new((&self.0).into())
    }
}

/// Random per-seal nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    /// Wrap raw nonce bytes.
    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Raw nonce bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

/// Ciphertext (with tag) and the nonce it was sealed under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedBox {
    /// Nonce used for this box.
    pub nonce: Nonce,
    /// Ciphertext followed by the Poly1305 tag.
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under `key`, binding it to `context`.
///
/// # Errors
///
/// `EncryptionFailed` if the AEAD rejects the input.
pub fn seal(key: &SecretKey, plaintext: &[u8], context: &[u8]) -> Result<SealedBox, CryptoError> {
    let nonce = Nonce::generate();
    let ciphertext = key
        .cipher()
        .encrypt(
            XNonce::from_slice(nonce.as_bytes()),
            Payload {
                msg: plaintext,
                aad: context,
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    Ok(SealedBox { nonce, ciphertext })
}

/// Decrypt a box sealed with [`seal`].
///
/// # Errors
///
/// `DecryptionFailed` for a wrong key, a different context, or tampered
/// ciphertext. The AEAD does not say which.
pub fn open(key: &SecretKey, sealed: &SealedBox, context: &[u8]) -> Result<Vec<u8>, CryptoError> {
    key.cipher()
        .decrypt(
            XNonce::from_slice(sealed.nonce.as_bytes()),
            Payload {
                msg: &sealed.ciphertext,
                aad: context,
            },
        )
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}
