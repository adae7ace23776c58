//! Whole-chain structural validation

use log::{error, info};

use crate::crypto::sha256_hex;
use crate::merkle::MerkleTree;
use crate::transaction::Transaction;

use super::chain::Block;

/// Recompute the hash a block claims. A genesis-shaped input, previous
/// hash "0" with the empty-tree root, resolves to the fixed genesis hash;
/// everything else hashes the previous hash, the Merkle root, and the
/// difficulty field, which holds the block's recorded winning counter.
fn expected_hash(
    previous_hash: &str,
    merkle_root: &str,
    difficulty: u64,
    genesis_hash: &str,
) -> String {
    if previous_hash == "0" && merkle_root == MerkleTree::empty_root() {
        genesis_hash.to_string()
    } else {
        sha256_hex(&format!("{}{}{}", previous_hash, merkle_root, difficulty))
    }
}

/// Re-derive every block's Merkle root and hash and check the linkage to
/// the prior block. Pure over the snapshot; failures log a diagnostic and
/// short-circuit to false.
pub fn is_valid_chain(chain: &[Block], genesis_hash: &str) -> bool {
    for (i, block) in chain.iter().enumerate() {
        if i == 0 {
            if block.hash != genesis_hash || block.merkle_root != MerkleTree::empty_root() {
                error!("Genesis block hash is wrong");
                return false;
            }
            continue;
        }

        let leaf_hashes: Vec<String> = block
            .transactions
            .iter()
            .map(Transaction::content_hash)
            .collect();
        if MerkleTree::build(&leaf_hashes, false).root != block.merkle_root {
            error!("Merkle root value at block {} does not verify", i + 1);
            return false;
        }

        if block.hash
            != expected_hash(
                &block.previous_hash,
                &block.merkle_root,
                block.difficulty,
                genesis_hash,
            )
        {
            error!(
                "Block hash for block {} does not match its recorded fields",
                i + 1
            );
            return false;
        }

        if block.previous_hash != chain[i - 1].hash {
            error!(
                "Previous hash value mismatch at block index {} and {}",
                i,
                i + 1
            );
            return false;
        }
    }

    info!("Blockchain is valid; further blocks can be added");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::miner::CancelToken;
    use crate::persistence::InMemoryStore;
    use crate::wallet::AddressPair;
    use crate::blockchain::Blockchain;

    fn pair() -> AddressPair {
        AddressPair {
            sender: "0x5555555555555555555555555555555555555555".to_string(),
            recipient: "0x6666666666666666666666666666666666666666".to_string(),
        }
    }

    fn mined_ledger() -> Blockchain {
        let mut ledger =
            Blockchain::new(LedgerConfig::default(), Box::new(InMemoryStore::new())).unwrap();
        ledger.mine_genesis_block().unwrap();
        ledger.create_transaction(21.0, &pair());
        ledger.create_transaction(22.0, &pair());
        ledger.mine(&CancelToken::new()).unwrap().unwrap();
        ledger
    }

    #[test]
    fn test_empty_chain_is_valid() {
        assert!(is_valid_chain(&[], &sha256_hex("0")));
    }

    #[test]
    fn test_mined_chain_is_valid() {
        let ledger = mined_ledger();
        assert!(is_valid_chain(&ledger.chain, &ledger.genesis_hash()));
    }

    #[test]
    fn test_wrong_genesis_hash_is_invalid() {
        let mut ledger = mined_ledger();
        ledger.chain[0].hash = sha256_hex("not genesis");
        assert!(!ledger.is_valid());
    }

    #[test]
    fn test_tampered_transaction_breaks_the_merkle_root() {
        let mut ledger = mined_ledger();
        ledger.chain[1].transactions[0].amount = 1_000_000.0;
        assert!(!ledger.is_valid());
    }

    #[test]
    fn test_tampered_difficulty_breaks_the_hash() {
        let mut ledger = mined_ledger();
        ledger.chain[1].difficulty += 1;
        assert!(!ledger.is_valid());
    }

    #[test]
    fn test_broken_linkage_is_invalid() {
        let mut ledger = mined_ledger();
        ledger.create_transaction(23.0, &pair());
        ledger.mine(&CancelToken::new()).unwrap().unwrap();

        ledger.chain[2].previous_hash = sha256_hex("someone else's tip");
        assert!(!ledger.is_valid());
    }
}
