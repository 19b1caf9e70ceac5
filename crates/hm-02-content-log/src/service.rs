//! # Content Log Service
//!
//! The shared, lock-guarded log every component reads the root from.

use parking_lot::RwLock;
use shared_types::{hash_to_hex, Hash};
use std::collections::HashMap;
use tracing::debug;

use crate::domain::{InclusionProof, LeafHash, LogError, LogSnapshot, MerkleTree};

struct LogState {
    leaves: Vec<Vec<u8>>,
    leaf_hashes: Vec<Hash>,
    positions: HashMap<LeafHash, usize>,
    tree: MerkleTree,
}

/// Append-only, content-addressed log.
///
/// `append` is the only mutator. The leaf sequence and its root are swapped
/// under one write lock, so a reader never sees a root that does not match
/// the leaves it can see.
pub struct ContentLog {
    state: RwLock<LogState>,
}

impl ContentLog {
    /// Empty log. Its root is the all-zero sentinel.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LogState {
                leaves: Vec::new(),
                leaf_hashes: Vec::new(),
                positions: HashMap::new(),
                tree: MerkleTree::build(&[]),
            }),
        }
    }

    /// Append a leaf and return its content address.
    ///
    /// The root is recomputed over the whole sequence. Appending the same
    /// bytes twice stores two leaves with the same address.
    pub fn append(&self, leaf: impl Into<Vec<u8>>) -> LeafHash {
        let leaf = leaf.into();
        let address = LeafHash::of(&leaf);

        let mut state = self.state.write();
        let index = state.leaves.len();
        state.leaves.push(leaf);
        state.leaf_hashes.push(address.0);
        state.positions.entry(address).or_insert(index);
        state.tree = MerkleTree::build(&state.leaf_hashes);

        debug!(
            index,
            leaf = %address,
            root = %hash_to_hex(&state.tree.root()),
            "Leaf appended"
        );
        address
    }

    /// Current root.
    pub fn root(&self) -> Hash {
        self.state.read().tree.root()
    }

    /// Current root as lowercase hex.
    pub fn root_hex(&self) -> String {
        hash_to_hex(&self.root())
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.state.read().leaves.len()
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Leaf bytes at `index`.
    pub fn leaf(&self, index: usize) -> Option<Vec<u8>> {
        self.state.read().leaves.get(index).cloned()
    }

    /// Whether a leaf with this address was ever appended.
    pub fn contains(&self, address: &LeafHash) -> bool {
        self.state.read().positions.contains_key(address)
    }

    /// Index of the first leaf with this address.
    pub fn position(&self, address: &LeafHash) -> Option<usize> {
        self.state.read().positions.get(address).copied()
    }

    /// Length and root read under one lock.
    pub fn snapshot(&self) -> LogSnapshot {
        let state = self.state.read();
        LogSnapshot {
            len: state.leaves.len(),
            root: state.tree.root(),
        }
    }

    /// Inclusion proof for the leaf at `index` against the current root.
    pub fn proof(&self, index: usize) -> Result<InclusionProof, LogError> {
        self.state.read().tree.proof(index)
    }
}

impl Default for ContentLog {
    fn default() -> Self {
        Self::new()
    }
}
