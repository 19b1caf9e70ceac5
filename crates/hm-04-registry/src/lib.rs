//! # Entity Registry (hm-04)
//!
//! Registration and lookup of named entities. Each entity gets its own
//! hardened child below a role node; names and paths are indexed in two
//! path tries so lookups walk shared prefixes.
//!
//! ## Invariants
//!
//! - A name resolves only after its key material is stored
//! - No two registrations share a derivation path
//! - A lookup miss is `None`, never an error

pub mod domain;
pub mod service;

pub use domain::{
    AuthenticatorSelection, CredentialOptions, CredentialUser, KeyMaterial, LayerTrie, PathTrie,
    ProtocolTrie, PubKeyCredParam, RegistryConfig, RegistryError, RelyingParty, SealedKey,
    ALG_ES256, ALG_RS256, CHALLENGE_LEN, DEFAULT_CREDENTIAL_TIMEOUT_MS, DEFAULT_RP_ID,
    DEFAULT_RP_NAME,
};
pub use service::Registry;
