#![forbid(unsafe_code)]
//! Print the persisted chain with its validity and telemetry.

use hashledger::blockchain::Blockchain;
use hashledger::config::load_config;
use hashledger::persistence::Database;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = load_config()?;
    let store = Database::open(&config.database.path)?;
    let ledger = Blockchain::new(config.ledger, Box::new(store))?;

    if ledger.is_empty() {
        println!("No chain found. Run hashledger-mine to create one.");
        return Ok(());
    }

    println!("📜 Chain history ({} blocks)\n", ledger.len());
    for block in &ledger.chain {
        println!("Block #{}", block.index);
        println!("  timestamp:     {}", block.timestamp);
        println!("  hash:          {}", block.hash);
        println!("  previous hash: {}", block.previous_hash);
        println!("  merkle root:   {}", block.merkle_root);
        println!("  nonce:         {}", block.nonce);
        println!("  transactions:  {}", block.transactions.len());
        println!("  total fees:    {}", block.total_fees);
        for tx in &block.transactions {
            println!(
                "    {} -> {}  amount {}  fee {}  [{}]",
                tx.sender, tx.recipient, tx.amount, tx.fee, tx.id
            );
        }
        println!();
    }

    println!("Valid: {}", ledger.is_valid());
    println!("Average hash rate: {}", ledger.average_hash_rate());

    Ok(())
}
