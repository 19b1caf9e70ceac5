//! # Domain Entities
//!
//! Content addresses, the Merkle tree over leaf addresses, and inclusion
//! proofs.
//!
//! ## Hashing
//!
//! - Leaf address: `SHA-256(0x00 || leaf)`
//! - Inner node: `SHA-256(0x01 || left || right)`
//!
//! The distinct prefixes keep a leaf from ever being mistaken for an inner
//! node.

use serde::{Deserialize, Serialize};
use shared_crypto::Sha256Hasher;
use shared_types::{hash_to_hex, Hash, ZERO_HASH};
use std::fmt;

use super::errors::LogError;

/// Domain tag for leaf hashing.
pub const LEAF_DOMAIN: u8 = 0x00;

/// Domain tag for inner node hashing.
pub const NODE_DOMAIN: u8 = 0x01;

/// Padding value for empty slots, and the root of an empty log.
pub const SENTINEL_HASH: Hash = ZERO_HASH;

/// Content address of a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeafHash(pub Hash);

impl LeafHash {
    /// Address a leaf by its content.
    pub fn of(leaf: &[u8]) -> Self {
        let mut hasher = Sha256Hasher::with_domain(LEAF_DOMAIN);
        hasher.update(leaf);
        Self(hasher.finalize())
    }

    /// Raw digest.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hash_to_hex(&self.0)
    }
}

impl fmt::Display for LeafHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Binary Merkle tree over ordered leaf addresses.
///
/// Leaves are padded to the next power of two with [`SENTINEL_HASH`]; the
/// tree is stored in array form `[root, level1..., leaves...]` so parent `i`
/// has children `2i+1` and `2i+2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    nodes: Vec<Hash>,
    leaf_count: usize,
    padded_leaf_count: usize,
}

impl MerkleTree {
    /// Build the tree. Order-sensitive: permuting leaves changes the root.
    pub fn build(leaf_hashes: &[Hash]) -> Self {
        let leaf_count = leaf_hashes.len();
        if leaf_count == 0 {
            return Self {
                nodes: vec![SENTINEL_HASH],
                leaf_count: 0,
                padded_leaf_count: 0,
            };
        }

        let padded_leaf_count = leaf_count.next_power_of_two();
        let leaf_start = padded_leaf_count - 1;
        let mut nodes = vec![SENTINEL_HASH; 2 * padded_leaf_count - 1];
        nodes[leaf_start..leaf_start + leaf_count].copy_from_slice(leaf_hashes);

        for i in (0..leaf_start).rev() {
            nodes[i] = hash_pair(&nodes[2 * i + 1], &nodes[2 * i + 2]);
        }

        Self {
            nodes,
            leaf_count,
            padded_leaf_count,
        }
    }

    /// Root digest over a sequence of leaf addresses.
    pub fn compute_root(leaf_hashes: &[Hash]) -> Hash {
        Self::build(leaf_hashes).root()
    }

    /// Root digest. [`SENTINEL_HASH`] for an empty tree.
    pub fn root(&self) -> Hash {
        self.nodes.first().copied().unwrap_or(SENTINEL_HASH)
    }

    /// Leaves before padding.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<InclusionProof, LogError> {
        if index >= self.leaf_count {
            return Err(LogError::IndexOutOfRange {
                index,
                len: self.leaf_count,
            });
        }

        let mut current = self.padded_leaf_count - 1 + index;
        let leaf_hash = self.nodes[current];
        let mut path = Vec::new();

        while current > 0 {
            let (sibling, position) = if current % 2 == 0 {
                (current - 1, SiblingPosition::Left)
            } else {
                (current + 1, SiblingPosition::Right)
            };
            path.push(ProofNode {
                hash: self.nodes[sibling],
                position,
            });
            current = (current - 1) / 2;
        }

        Ok(InclusionProof {
            leaf_hash: LeafHash(leaf_hash),
            index,
            root: self.root(),
            path,
        })
    }
}

/// Proof that a leaf sits at a given index under a given root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    pub leaf_hash: LeafHash,
    pub index: usize,
    /// Root at the time the proof was produced.
    pub root: Hash,
    /// Siblings from the leaf up.
    pub path: Vec<ProofNode>,
}

impl InclusionProof {
    /// Recompute the root from the leaf and path and compare with `root`.
    pub fn verify(&self, root: &Hash) -> bool {
        let computed = self
            .path
            .iter()
            .fold(self.leaf_hash.0, |current, node| match node.position {
                SiblingPosition::Left => hash_pair(&node.hash, &current),
                SiblingPosition::Right => hash_pair(&current, &node.hash),
            });
        computed == *root
    }
}

/// A sibling hash on a proof path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    pub hash: Hash,
    pub position: SiblingPosition,
}

/// Which side the sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiblingPosition {
    Left,
    Right,
}

/// A consistent view of the log: length and the root over exactly that
/// many leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSnapshot {
    pub len: usize,
    pub root: Hash,
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256Hasher::with_domain(NODE_DOMAIN);
    hasher.update(left).update(right);
    hasher.finalize()
}
