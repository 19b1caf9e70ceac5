//! # Domain Errors
//!
//! Error types for identity derivation.

use thiserror::Error;

/// Errors that can occur while deriving, parsing or sealing identities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Seed is out of the 16..=64 byte range or carries no entropy.
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// Role name not recognised by the strict parser.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Derivation path string is malformed.
    #[error("Invalid derivation path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Absolute path derivation was requested from a non-master node.
    #[error("Cannot derive absolute path {requested} from {current} (only from m)")]
    PathMismatch { current: String, requested: String },

    /// The underlying key derivation primitive failed.
    #[error("Key derivation failed: {0}")]
    Derivation(String),

    /// Sealing or opening key material failed.
    #[error("Seal error: {0}")]
    Seal(String),
}
