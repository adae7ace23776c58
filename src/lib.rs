//! HashLedger - an append-only, hash-linked ledger of transaction batches
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Chain state, block construction and validation
//! - [`transaction`] - Transaction intake types
//!
//! ## Consensus
//! - [`merkle`] - Merkle tree construction and membership verification
//! - [`miner`] - Proof-of-work nonce search
//!
//! ## Cryptography
//! - [`crypto`] - Hashing primitives (SHA-256)
//! - [`wallet`] - Address-pair generation
//!
//! ## State Management
//! - [`persistence`] - Storage backends (in-memory, SQLite)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod merkle;
pub mod miner;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;
pub mod wallet;

// ============================================================================
// State Management
// ============================================================================
pub mod persistence;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
