//! Address-pair generation
//!
//! Identities are opaque strings: `0x` followed by the first 40 hex
//! characters of a double SHA-256 over a random UUID. The shape is a
//! display contract only; nothing in the ledger validates it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::double_sha256_hex;

/// Hex characters kept from the hashed identifier.
const ADDRESS_HEX_LEN: usize = 40;

/// Sender and recipient identities for transaction intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressPair {
    pub sender: String,
    pub recipient: String,
}

/// Generate a fresh address string.
pub fn generate_address() -> String {
    let digest = double_sha256_hex(&Uuid::new_v4().to_string());
    format!("0x{}", &digest[..ADDRESS_HEX_LEN])
}

/// Generate a fresh (sender, recipient) pair.
pub fn generate_pair() -> AddressPair {
    AddressPair {
        sender: generate_address(),
        recipient: generate_address(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_shape() {
        let address = generate_address();
        assert!(address.starts_with("0x"));
        assert_eq!(address.len(), 2 + ADDRESS_HEX_LEN);
        assert!(address[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_pair_sides_differ() {
        let pair = generate_pair();
        assert_ne!(pair.sender, pair.recipient);
    }

    #[test]
    fn test_addresses_are_random() {
        assert_ne!(generate_address(), generate_address());
    }
}
