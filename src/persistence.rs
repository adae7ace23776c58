//! Storage layer for HashLedger
//!
//! The ledger persists the whole chain as one blob under a fixed
//! collection key. An absent key reads back as "no chain yet", never as an
//! error.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use crate::blockchain::Block;
use crate::error::{ChainError, Result};

/// Abstraction for storage backends. Implementations provide atomic
/// get/replace of a chain blob per collection key.
pub trait ChainStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Vec<Block>>>;
    fn write(&self, key: &str, chain: &[Block]) -> Result<()>;
}

/// Volatile backend used by tests and as a fallback when the database
/// cannot be opened.
#[derive(Default)]
pub struct InMemoryStore {
    collections: Mutex<HashMap<String, Vec<Block>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for InMemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<Block>>> {
        let collections = self
            .collections
            .lock()
            .map_err(|_| ChainError::StorageError("Mutex poisoned".to_string()))?;
        Ok(collections.get(key).cloned())
    }

    fn write(&self, key: &str, chain: &[Block]) -> Result<()> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| ChainError::StorageError("Mutex poisoned".to_string()))?;
        collections.insert(key.to_string(), chain.to_vec());
        Ok(())
    }
}

/// SQLite backend: one row per collection, the chain serialized as JSON.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| ChainError::StorageError(format!("Failed to open database: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS chains (
                key TEXT PRIMARY KEY,
                blocks TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| ChainError::StorageError(format!("Failed to create chains table: {}", e)))?;

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }
}

impl ChainStore for Database {
    fn read(&self, key: &str) -> Result<Option<Vec<Block>>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| ChainError::StorageError("Mutex poisoned".to_string()))?;

        let mut stmt = conn
            .prepare("SELECT blocks FROM chains WHERE key = ?1")
            .map_err(|e| ChainError::StorageError(format!("Failed to prepare query: {}", e)))?;
        let mut rows = stmt
            .query(params![key])
            .map_err(|e| ChainError::StorageError(format!("Failed to query chain: {}", e)))?;

        let row = rows
            .next()
            .map_err(|e| ChainError::StorageError(format!("Failed to read row: {}", e)))?;
        match row {
            None => Ok(None),
            Some(row) => {
                let blocks_json: String = row
                    .get(0)
                    .map_err(|e| ChainError::StorageError(format!("Failed to read column: {}", e)))?;
                let blocks: Vec<Block> = serde_json::from_str(&blocks_json).map_err(|e| {
                    ChainError::StorageError(format!("Failed to deserialize chain: {}", e))
                })?;
                Ok(Some(blocks))
            }
        }
    }

    fn write(&self, key: &str, chain: &[Block]) -> Result<()> {
        let blocks_json = serde_json::to_string(chain)
            .map_err(|e| ChainError::StorageError(format!("Failed to serialize chain: {}", e)))?;

        let conn = self
            .conn
            .lock()
            .map_err(|_| ChainError::StorageError("Mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO chains (key, blocks) VALUES (?1, ?2)",
            params![key, blocks_json],
        )
        .map_err(|e| ChainError::StorageError(format!("Failed to save chain: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_missing_key_reads_none() {
        let store = InMemoryStore::new();
        assert!(store.read("chain").unwrap().is_none());
    }

    #[test]
    fn test_in_memory_write_then_read() {
        let store = InMemoryStore::new();
        store.write("chain", &[]).unwrap();
        assert_eq!(store.read("chain").unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_database_missing_key_reads_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ledger.db");
        let db = Database::open(path.to_str().unwrap()).unwrap();
        assert!(db.read("chain").unwrap().is_none());
    }

    #[test]
    fn test_database_write_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let db = Database::open(path.to_str().unwrap()).unwrap();
            db.write("chain", &[]).unwrap();
        }

        let db = Database::open(path.to_str().unwrap()).unwrap();
        assert_eq!(db.read("chain").unwrap(), Some(Vec::new()));
    }
}
