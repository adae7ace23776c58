#![forbid(unsafe_code)]
//! Drive one mining round: queue a handful of transactions from a fresh
//! address pair, mint the genesis block if the chain is empty, then mine.

use std::env;
use std::time::Instant;

use log::warn;

use hashledger::blockchain::Blockchain;
use hashledger::config::load_config;
use hashledger::miner::CancelToken;
use hashledger::persistence::{ChainStore, Database, InMemoryStore};
use hashledger::wallet;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let amounts: Vec<f64> = env::args()
        .skip(1)
        .map(|arg| {
            arg.parse()
                .map_err(|e| format!("amount '{}' is not a number: {}", arg, e))
        })
        .collect::<Result<_, _>>()?;
    let amounts = if amounts.is_empty() {
        vec![21.0, 22.0, 23.0, 24.0, 25.0]
    } else {
        amounts
    };

    let config = load_config()?;
    let store: Box<dyn ChainStore> = match Database::open(&config.database.path) {
        Ok(db) => Box::new(db),
        Err(e) => {
            warn!(
                "Failed to open DB at {}: {}. Falling back to in-memory storage.",
                config.database.path, e
            );
            Box::new(InMemoryStore::new())
        }
    };

    let mut ledger = Blockchain::new(config.ledger, store)?;
    if ledger.is_empty() {
        println!("⛓️  No chain found – creating genesis block...\n");
        ledger.mine_genesis_block()?;
    }

    let address = wallet::generate_pair();
    for amount in &amounts {
        ledger.create_transaction(*amount, &address);
    }

    println!("⛏️  Mining block {}...", ledger.len() + 1);
    let start_time = Instant::now();
    let mined = ledger.mine(&CancelToken::new())?;
    let elapsed = start_time.elapsed();

    let Some(block) = mined else {
        eprintln!("❌ Chain failed validation; nothing was mined.");
        return Ok(());
    };

    println!("\n✅ Block mined!\n");
    println!("┌──────────────────────────── BLOCK METADATA ────────────────────────────┐");
    println!("│ Index:        #{:<56} │", block.index);
    println!("│ Hash:         {:<57} │", block.hash);
    println!("│ Previous:     {:<57} │", block.previous_hash);
    println!("│ Merkle root:  {:<57} │", block.merkle_root);
    println!("│ Nonce:        {:<57} │", block.nonce);
    println!("│ Transactions: {:<57} │", block.transactions.len());
    println!("│ Total fees:   {:<57} │", block.total_fees);
    println!("│ Mining time:  {:.3} seconds{:<43} │", elapsed.as_secs_f64(), "");
    println!("└────────────────────────────────────────────────────────────────────────┘\n");

    println!("Sender:     {}", address.sender);
    println!("Recipient:  {}", address.recipient);
    println!("Chain size: {} blocks, valid: {}", ledger.len(), ledger.is_valid());

    Ok(())
}
