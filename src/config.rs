//! Configuration management for HashLedger

use serde::Deserialize;
use std::fs;

use crate::error::{ChainError, Result};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Values the ledger is constructed with. The genesis seed and the
/// collection key are injected rather than module constants so one
/// process can host differently-keyed ledgers.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Seed whose hash is the fixed genesis block hash.
    #[serde(default = "default_genesis_seed")]
    pub genesis_seed: String,
    /// Collection key the whole chain is persisted under.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            genesis_seed: default_genesis_seed(),
            collection: default_collection(),
        }
    }
}

/// Load `config.toml` from the working directory, with sane defaults when
/// the file is absent.
pub fn load_config() -> Result<Config> {
    load_config_from("config.toml")
}

pub fn load_config_from(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path).unwrap_or_default();
    let config: Config = if config_str.is_empty() {
        Config {
            database: DatabaseConfig {
                path: default_db_path(),
            },
            ledger: LedgerConfig::default(),
        }
    } else {
        toml::from_str(&config_str)
            .map_err(|e| ChainError::ConfigError(format!("Failed to parse {}: {}", path, e)))?
    };

    // Validate critical values
    if config.database.path.is_empty() {
        return Err(ChainError::ConfigError(
            "database.path must be set in config.toml".to_string(),
        ));
    }
    if config.ledger.collection.is_empty() {
        return Err(ChainError::ConfigError(
            "ledger.collection must be set in config.toml".to_string(),
        ));
    }

    Ok(config)
}

fn default_db_path() -> String {
    "hashledger.db".to_string()
}

fn default_genesis_seed() -> String {
    "0".to_string()
}

fn default_collection() -> String {
    "chain".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config_from("definitely-not-a-config.toml").unwrap();
        assert_eq!(config.database.path, "hashledger.db");
        assert_eq!(config.ledger.genesis_seed, "0");
        assert_eq!(config.ledger.collection, "chain");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[database]\npath = \"custom.db\"").unwrap();

        let config = load_config_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.database.path, "custom.db");
        assert_eq!(config.ledger.collection, "chain");
    }

    #[test]
    fn test_empty_collection_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[database]\npath = \"a.db\"\n[ledger]\ncollection = \"\""
        )
        .unwrap();

        assert!(load_config_from(path.to_str().unwrap()).is_err());
    }
}
