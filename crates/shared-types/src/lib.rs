//! # Shared Types Crate
//!
//! Primitive types used across the Hypergraph Mesh crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Hash` and `PeerId` are defined once here so
//!   the identity, log, gossip and registry crates agree on their encoding.
//! - **Wire Stability**: `PeerId` serializes as a bare string and hashes as
//!   lowercase hex, matching the JSON heartbeat record.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
