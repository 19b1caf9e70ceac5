//! # Domain Layer
//!
//! Leaf addressing, the Merkle digest and inclusion proofs. No locking, no I/O.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
