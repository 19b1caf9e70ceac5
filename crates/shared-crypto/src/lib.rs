//! # Shared Crypto - Cryptographic Primitives
//!
//! Black-box primitives consumed by the identity, log and gossip crates.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Leaf addresses, log roots, peer ids |
//! | `ecdsa` | secp256k1 (recoverable) | Heartbeat signatures |
//! | `hd` | BIP32 (HMAC-SHA512) | Hierarchical deterministic identities |
//! | `symmetric` | XChaCha20-Poly1305 | Sealed key material in the registry |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalization,
//!   65-byte `r || s || v` signatures so the signer can be recovered
//! - **BIP32**: same seed and path always yield the same key pair
//! - **XChaCha20**: 192-bit random nonce per seal, context bound as
//!   associated data

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod hd;
pub mod symmetric;

// Re-exports
pub use ecdsa::{recover_public_key, RecoverableSignature, Secp256k1KeyPair, Secp256k1PublicKey};
pub use errors::CryptoError;
pub use hashing::{sha256, sha256_many, Sha256Hasher};
pub use hd::{ExtendedPrivateKey, HARDENED_OFFSET};
pub use symmetric::{open, seal, Nonce, SealedBox, SecretKey, NONCE_LEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
