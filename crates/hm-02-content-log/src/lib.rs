//! # Content-Addressed Log (hm-02)
//!
//! Append-only sequence of opaque leaves. Each leaf is addressed by its
//! hash and the whole sequence is summarised by one Merkle root, which is
//! what peers gossip to detect divergence.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Append is the sole mutator | no delete/update API on [`ContentLog`] |
//! | Root is order-sensitive | positional Merkle tree, no sorting |
//! | Readers see whole appends | leaves and root swapped under one write lock |
//! | Empty log root is all zeros | [`SENTINEL_HASH`] |

pub mod domain;
pub mod service;

pub use domain::{
    InclusionProof, LeafHash, LogError, LogSnapshot, MerkleTree, ProofNode, SiblingPosition,
    LEAF_DOMAIN, NODE_DOMAIN, SENTINEL_HASH,
};
pub use service::ContentLog;
