//! # Identity Derivation (hm-01)
//!
//! Turns a seed into a tree of peer identities. Every identity sits at a
//! fixed derivation path, and the path is chosen by the role the peer plays.
//!
//! ```text
//! seed ──HMAC-SHA512──▶ m ──369──▶ m/369 ──0──▶ m/369/0 (environment)
//!                                                  ├─0─▶ host
//!                                                  ├─1─▶ provider
//!                                                  ├─2─▶ client
//!                                                  └─3─▶ context
//! ```
//!
//! ## Invariants
//!
//! - Same seed and same path give bit-identical key material
//! - Distinct roles never share a path
//! - A peer id is the hex SHA-256 of the compressed public key

pub mod domain;

pub use domain::{
    derive, derive_for_role_name, DerivationPath, Identity, IdentityError, Role, SealedIdentity,
    ENVIRONMENT_INDEX, ROOT_INDEX,
};
