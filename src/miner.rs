//! Proof-of-work nonce search
//!
//! A block is admitted once some counter, hashed together with the previous
//! block hash and the Merkle root of the pending transactions, produces a
//! digest with the required run of leading zero characters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::crypto::sha256_hex;
use crate::error::{ChainError, Result};
use crate::merkle::MerkleTree;
use crate::transaction::Transaction;

/// Cooperative cancellation handle for an otherwise unbounded search.
/// Clone it, hand one side to the miner and keep the other to abort.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of a successful nonce search.
#[derive(Debug, Clone)]
pub struct PowSolution {
    /// Winning counter rendered as uppercase hex, wrapped to 32 bits.
    pub nonce: String,
    /// The raw winning counter. Blocks record this under their
    /// `difficulty` field; see the note on [`crate::blockchain::Block`].
    pub nonce_value: u64,
    /// The digest that satisfied the difficulty predicate.
    pub hash: String,
    /// Tree over the transactions the search committed to.
    pub merkle_tree: MerkleTree,
}

/// Search for a counter whose candidate digest starts with `difficulty`
/// zero characters. The candidate preimage is the previous hash, the
/// Merkle root, and the counter in decimal, concatenated.
///
/// There is no upper bound on the iteration count. Callers that need a way
/// out hold on to the [`CancelToken`]; cancelling surfaces as
/// [`ChainError::MiningCancelled`].
pub fn search(
    previous_hash: &str,
    transactions: &[Transaction],
    difficulty: u32,
    cancel: &CancelToken,
) -> Result<PowSolution> {
    let leaves: Vec<String> = transactions.iter().map(Transaction::canonical_json).collect();
    let merkle_tree = MerkleTree::build(&leaves, true);
    let root = merkle_tree.root.clone();
    let target = "0".repeat(difficulty as usize);

    let mut counter: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(ChainError::MiningCancelled);
        }
        let candidate = sha256_hex(&format!("{}{}{}", previous_hash, root, counter));
        if candidate.starts_with(&target) {
            info!("Block mined with nonce {} and hash {}", counter, candidate);
            return Ok(PowSolution {
                nonce: format!("{:X}", counter as u32),
                nonce_value: counter,
                hash: candidate,
                merkle_tree,
            });
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::AddressPair;

    fn pair() -> AddressPair {
        AddressPair {
            sender: "0x1111111111111111111111111111111111111111".to_string(),
            recipient: "0x2222222222222222222222222222222222222222".to_string(),
        }
    }

    #[test]
    fn test_solution_satisfies_difficulty() {
        let txs = vec![Transaction::new(21.0, &pair()), Transaction::new(22.0, &pair())];
        let solution = search("prev", &txs, 2, &CancelToken::new()).unwrap();
        assert!(solution.hash.starts_with("00"));
    }

    #[test]
    fn test_solution_hash_is_reproducible() {
        let txs = vec![Transaction::new(21.0, &pair())];
        let solution = search("prev", &txs, 1, &CancelToken::new()).unwrap();
        let recomputed = sha256_hex(&format!(
            "{}{}{}",
            "prev", solution.merkle_tree.root, solution.nonce_value
        ));
        assert_eq!(solution.hash, recomputed);
    }

    #[test]
    fn test_nonce_renders_as_uppercase_hex() {
        let txs = vec![Transaction::new(21.0, &pair())];
        let solution = search("prev", &txs, 1, &CancelToken::new()).unwrap();
        assert_eq!(solution.nonce, format!("{:X}", solution.nonce_value as u32));
    }

    #[test]
    fn test_empty_transactions_commit_to_sentinel_root() {
        let solution = search("prev", &[], 1, &CancelToken::new()).unwrap();
        assert_eq!(solution.merkle_tree.root, MerkleTree::empty_root());
    }

    #[test]
    fn test_cancelled_search_stops() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let txs = vec![Transaction::new(21.0, &pair())];
        match search("prev", &txs, 4, &cancel) {
            Err(ChainError::MiningCancelled) => {}
            other => panic!("expected MiningCancelled, got {:?}", other.map(|s| s.hash)),
        }
    }
}
