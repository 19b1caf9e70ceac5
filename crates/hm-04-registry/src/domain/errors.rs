//! # Domain Errors

use hm_01_identity::IdentityError;
use thiserror::Error;

/// Errors from registering entities.
///
/// A lookup miss is not an error: `search` returns `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Deriving the entity identity failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Sealing or opening key material failed.
    #[error("Seal error: {0}")]
    Seal(String),

    /// The per-registry entity counter ran out of hardened indices.
    #[error("Entity index space exhausted")]
    Exhausted,
}
