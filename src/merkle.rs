//! Merkle tree construction and membership verification
//!
//! Blocks commit to their transactions through a binary hash tree. Each
//! layer pairs elements left-to-right, an odd tail pairing with itself, and
//! reduces every pair to the hash of its concatenated sides until a single
//! root remains. The deduplicated pairs of every layer are recorded on the
//! tree so membership can be re-checked later without the original
//! transactions.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::crypto::{double_sha256_hex, sha256_hex};

/// Seed of the sentinel root for a tree over zero leaves.
const EMPTY_LEAF_SEED: &str = "0";

/// A built hash tree: the root, the number of reduction layers, and the
/// sibling pairs recorded per layer (layer 1 holds the leaves).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MerkleTree {
    pub root: String,
    pub layers: usize,
    pub leaves: BTreeMap<usize, Vec<Vec<String>>>,
}

impl MerkleTree {
    /// Sentinel root of the empty tree: `H(H("0"))`.
    pub fn empty_root() -> String {
        double_sha256_hex(EMPTY_LEAF_SEED)
    }

    /// Build a tree over `values`.
    ///
    /// With `needs_hashing` both sides of a pair are hashed before being
    /// combined; pass `false` when the inputs already are content hashes,
    /// as when re-verifying an existing block. An empty input yields the
    /// sentinel root and zero layers.
    pub fn build(values: &[String], needs_hashing: bool) -> Self {
        let mut tree = MerkleTree::default();
        if values.is_empty() {
            tree.root = Self::empty_root();
            return tree;
        }
        tree.reduce(values.to_vec(), needs_hashing);
        tree
    }

    /// Check that `value` appears among the recorded `pair_lists` and that
    /// their flattened members independently rebuild to `root`.
    ///
    /// Empty inputs are a usage error, not a tamper signal: they log a
    /// warning and return false.
    pub fn verify(value: &str, pair_lists: &[Vec<String>], root: &str) -> bool {
        if value.is_empty() || root.is_empty() {
            warn!("Merkle verification called with an empty value or root");
            return false;
        }
        let members: Vec<String> = pair_lists.iter().flatten().cloned().collect();
        if !members.iter().any(|m| m == value) {
            return false;
        }
        Self::build(&members, false).root == root
    }

    // One reduction layer. The recursive call always hashes its inputs
    // again; the mining and re-verification paths differ only in how the
    // first layer is treated, so upper layers must reduce identically.
    fn reduce(&mut self, level: Vec<String>, needs_hashing: bool) {
        self.layers += 1;
        let mut pairs = Vec::with_capacity((level.len() + 1) / 2);
        let mut combined = Vec::with_capacity((level.len() + 1) / 2);

        let mut i = 0;
        while i < level.len() {
            let raw_left = &level[i];
            let raw_right = if i + 1 == level.len() {
                raw_left
            } else {
                &level[i + 1]
            };

            let (left, right) = if needs_hashing {
                (sha256_hex(raw_left), sha256_hex(raw_right))
            } else {
                (raw_left.clone(), raw_right.clone())
            };

            // Order-preserving dedup: a self-paired tail records one entry.
            let mut pair = vec![left.clone()];
            if right != left {
                pair.push(right.clone());
            }
            pairs.push(pair);

            combined.push(sha256_hex(&format!("{}{}", left, right)));
            i += 2;
        }

        self.leaves.insert(self.layers, pairs);
        if combined.len() == 1 {
            self.root = combined.remove(0);
        } else {
            self.reduce(combined, true);
        }
    }
}
