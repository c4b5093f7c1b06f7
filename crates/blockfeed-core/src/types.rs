//! Shared types for the block feed pipeline.

use serde::{Deserialize, Serialize};

/// A block's position in the chain sequence. Used as the ingestion cursor unit.
pub type Height = u64;

// ─── Transaction ──────────────────────────────────────────────────────────────

/// A single transaction inside a block.
///
/// `from` and `to` are `0x`-prefixed 40-hex-digit addresses; `to` may be empty
/// for contract creations. `hash` and `value` are passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction hash (`0x…`).
    pub hash: String,
    /// Sender address.
    pub from: String,
    /// Recipient address (empty for contract creation).
    #[serde(default)]
    pub to: String,
    /// Transferred value as a hex quantity, untouched by the feed.
    pub value: String,
}

// ─── Block ────────────────────────────────────────────────────────────────────

/// An ingested block: its height plus the ordered transactions it carries.
///
/// Blocks are immutable once constructed and shared read-only between the
/// store and every subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block height.
    pub number: Height,
    /// Block hash (`0x…`).
    pub hash: String,
    /// Parent block hash (`0x…`).
    pub parent_hash: String,
    /// Block timestamp as reported by the source (hex quantity, opaque).
    pub timestamp: String,
    /// Transactions in block order.
    pub transactions: Vec<Transaction>,
}

// ─── Address helpers ──────────────────────────────────────────────────────────

/// Returns `true` if `address` is `0x` followed by exactly 40 hex digits.
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Normalize an address for membership tests. Two encodings of the same
/// address are equal iff equal case-insensitively, so comparisons happen in
/// lower case.
pub fn normalize_address(address: &str) -> String {
    address.to_ascii_lowercase()
}
