// Thin re-export module: implementation is in `blockchain/core.rs` so chain
// management and validation stay in separate files.

pub mod core;
pub use core::*;
