//! Transaction intake types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::sha256_hex;
use crate::error::{ChainError, Result};
use crate::wallet::AddressPair;

/// Smallest fee a transaction may carry; lower requests are clamped up.
pub const MIN_FEE: u64 = 20_000;

/// Maximum serialized transaction size in bytes (100KB) to prevent DoS
pub const MAX_TRANSACTION_SIZE: usize = 100_000;

/// A ledger transaction. Has an amount, a sender and a recipient; no
/// accounting model beyond that. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: f64,
    pub sender: String,
    pub recipient: String,
    pub fee: u64,
    pub id: String,
}

impl Transaction {
    /// Build a transaction carrying the minimum fee.
    pub fn new(amount: f64, address: &AddressPair) -> Self {
        Self::with_fee(amount, address, MIN_FEE)
    }

    /// Build a transaction with an explicit fee. Fees below [`MIN_FEE`]
    /// are raised to it, never rejected.
    pub fn with_fee(amount: f64, address: &AddressPair, fee: u64) -> Self {
        Transaction {
            amount,
            sender: address.sender.clone(),
            recipient: address.recipient.clone(),
            fee: fee.max(MIN_FEE),
            id: Uuid::new_v4().to_string(),
        }
    }

    /// Canonical JSON rendering; the Merkle leaf for this transaction.
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(self).expect("serialize transaction")
    }

    /// SHA-256 over the canonical rendering. This is the identity a
    /// membership check is performed against.
    pub fn content_hash(&self) -> String {
        sha256_hex(&self.canonical_json())
    }

    /// Validate transaction size to prevent DoS attacks
    pub fn validate_size(&self) -> Result<()> {
        let serialized = bincode::serialize(self)
            .map_err(|e| ChainError::SerializationError(format!("Serialization failed: {}", e)))?;

        if serialized.len() > MAX_TRANSACTION_SIZE {
            return Err(ChainError::InvalidTransaction(format!(
                "Transaction too large: {} bytes (max: {})",
                serialized.len(),
                MAX_TRANSACTION_SIZE
            )));
        }
        Ok(())
    }
}
