use chrono::Utc;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::crypto::sha256_hex;
use crate::error::Result;
use crate::merkle::MerkleTree;
use crate::miner::{self, CancelToken, PowSolution};
use crate::persistence::ChainStore;
use crate::transaction::Transaction;
use crate::wallet::AddressPair;

use super::validation::is_valid_chain;

/// Ledger units credited per raw fee unit when a block totals its fees.
const FEE_SCALE: f64 = 0.000_000_001;

/// A mined batch of transactions, hash-linked to its predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, starting at 1.
    pub index: u64,
    /// Unix seconds at construction time.
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub hash: String,
    /// Winning counter rendered as uppercase hex, wrapped to 32 bits.
    pub nonce: String,
    /// Carries the raw winning counter, not the leading-zero count. The
    /// wire format has always stored it under this name and the hash
    /// recomputation consumes it, so renaming would invalidate every
    /// existing chain.
    pub difficulty: u64,
    pub merkle_root: String,
    pub merkle_tree: MerkleTree,
    /// Sum of the scaled fees multiplied by the transaction count. The
    /// scaling is intentionally non-linear in the count; protocol
    /// behavior, not an accounting identity.
    pub total_fees: f64,
}

impl Block {
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        previous_hash: String,
        pow: PowSolution,
    ) -> Self {
        let total_fees = transactions
            .iter()
            .map(|tx| tx.fee as f64 * FEE_SCALE)
            .sum::<f64>()
            * transactions.len() as f64;

        Block {
            index,
            timestamp: Utc::now().timestamp(),
            transactions,
            previous_hash,
            hash: pow.hash,
            nonce: pow.nonce,
            difficulty: pow.nonce_value,
            merkle_root: pow.merkle_tree.root.clone(),
            merkle_tree: pow.merkle_tree,
            total_fees,
        }
    }
}

/// In-memory ledger state plus its storage collaborator.
///
/// Single-writer: concurrent `mine` calls against one instance are not
/// supported and must be serialized by the caller.
pub struct Blockchain {
    pub chain: Vec<Block>,
    pub pending_transactions: Vec<Transaction>,
    pub difficulty: u32,
    genesis_mined: bool,
    config: LedgerConfig,
    store: Box<dyn ChainStore>,
}

impl Blockchain {
    /// Load the persisted chain (an absent collection is an empty chain)
    /// and derive the current difficulty from its length.
    pub fn new(config: LedgerConfig, store: Box<dyn ChainStore>) -> Result<Self> {
        let chain = store.read(&config.collection)?.unwrap_or_default();
        let difficulty = difficulty_for_length(chain.len());
        Ok(Blockchain {
            chain,
            pending_transactions: Vec::new(),
            difficulty,
            genesis_mined: false,
            config,
            store,
        })
    }

    /// Hash of the fixed first block, derived from the configured seed.
    pub fn genesis_hash(&self) -> String {
        sha256_hex(&self.config.genesis_seed)
    }

    /// Queue a transaction carrying the minimum fee.
    pub fn create_transaction(&mut self, amount: f64, address: &AddressPair) {
        self.create_transaction_with_fee(amount, address, crate::transaction::MIN_FEE)
    }

    /// Queue a transaction with an explicit fee. Identities are accepted
    /// as-is; only pathologically oversized payloads are turned away.
    pub fn create_transaction_with_fee(&mut self, amount: f64, address: &AddressPair, fee: u64) {
        let tx = Transaction::with_fee(amount, address, fee);
        if let Err(e) = tx.validate_size() {
            warn!("Dropping oversized transaction {}: {}", tx.id, e);
            return;
        }
        self.pending_transactions.push(tx);
    }

    /// Mine the fixed first block. Once the chain holds anything beyond
    /// it, or once this instance already minted one, the call degrades to
    /// a logged warning.
    pub fn mine_genesis_block(&mut self) -> Result<()> {
        if self.chain.len() > 1 || self.genesis_mined {
            warn!("Genesis block can only be mined once");
            return Ok(());
        }

        let pow = PowSolution {
            nonce: "0".to_string(),
            nonce_value: 0,
            hash: self.genesis_hash(),
            merkle_tree: MerkleTree::build(&[], true),
        };
        self.append_block(pow)?;
        self.genesis_mined = true;
        info!("Genesis block created");
        Ok(())
    }

    /// Validate, search, append, persist.
    ///
    /// An invalid chain aborts with a logged error and `Ok(None)`, leaving
    /// all state untouched. A cancelled search or a storage failure
    /// surfaces as `Err`; in the storage case the freshly appended block
    /// is rolled back first, so a call admits exactly one block or none.
    pub fn mine(&mut self, cancel: &CancelToken) -> Result<Option<Block>> {
        if !is_valid_chain(&self.chain, &self.genesis_hash()) {
            error!("Refusing to mine on an invalid chain");
            return Ok(None);
        }

        self.difficulty = difficulty_for_length(self.chain.len());
        let previous_hash = self.previous_hash();
        let pow = miner::search(
            &previous_hash,
            &self.pending_transactions,
            self.difficulty,
            cancel,
        )?;

        let block = self.append_block(pow)?;
        info!("Block mined and added to the chain at index {}", block.index);
        Ok(Some(block))
    }

    /// Hash the next block links to: the tip's, or "0" for an empty chain.
    pub fn previous_hash(&self) -> String {
        self.chain
            .last()
            .map(|b| b.hash.clone())
            .unwrap_or_else(|| "0".to_string())
    }

    fn append_block(&mut self, pow: PowSolution) -> Result<Block> {
        let index = self.chain.len() as u64 + 1;
        let previous_hash = self.previous_hash();
        let transactions = std::mem::take(&mut self.pending_transactions);
        let block = Block::new(index, transactions, previous_hash, pow);

        self.chain.push(block.clone());
        if let Err(e) = self.store.write(&self.config.collection, &self.chain) {
            // Append and persistence succeed or fail together.
            self.chain.pop();
            self.pending_transactions = block.transactions;
            return Err(e);
        }
        Ok(block)
    }

    /// Check a transaction content hash against block `block_index`'s
    /// recorded tree. The index is 1-based; out of range reports an error
    /// and yields `None` rather than failing.
    pub fn verify_transaction_hash(&self, block_index: usize, tx_hash: &str) -> Option<bool> {
        if block_index == 0 || block_index > self.chain.len() {
            error!("Block index {} does not fit in the blockchain", block_index);
            return None;
        }

        let block = &self.chain[block_index - 1];
        let leaf_pairs = block
            .merkle_tree
            .leaves
            .get(&1)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Some(MerkleTree::verify(tx_hash, leaf_pairs, &block.merkle_root))
    }

    /// Validate the full in-memory chain.
    pub fn is_valid(&self) -> bool {
        is_valid_chain(&self.chain, &self.genesis_hash())
    }

    /// Advisory telemetry derived from block timestamps. Not a
    /// correctness-relevant figure.
    pub fn average_hash_rate(&self) -> String {
        if self.chain.is_empty() {
            return "0ms".to_string();
        }
        let total: i64 = self.chain.iter().map(|b| b.timestamp).sum();
        let rate = (total as f64 / self.chain.len() as f64 / 10_000.0) % 60.0;
        format!("{:.0}ms", rate)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

/// Difficulty is the decimal digit count of the chain length; an empty
/// chain starts at 1.
pub fn difficulty_for_length(len: usize) -> u32 {
    if len == 0 {
        1
    } else {
        len.to_string().len() as u32
    }
}
