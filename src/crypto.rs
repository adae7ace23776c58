//! Hashing primitives for HashLedger
//!
//! Everything in the ledger is keyed on lowercase hex renderings of SHA-256
//! digests over UTF-8 strings: block hashes, Merkle nodes, and addresses.

use sha2::{Digest, Sha256};

/// SHA-256 of a string, as lowercase hex.
pub fn sha256_hex(data: &str) -> String {
    let digest = Sha256::digest(data.as_bytes());
    hex::encode(digest)
}

/// Two chained rounds of [`sha256_hex`]; the outer round hashes the hex
/// rendering of the inner one.
pub fn double_sha256_hex(data: &str) -> String {
    sha256_hex(&sha256_hex(data))
}
