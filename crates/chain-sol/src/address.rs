//! Solana address parsing and formatting.
//!
//! A Solana address is the Base58 encoding of a raw 32-byte Ed25519 public
//! key (or of an off-curve program-derived address). Everything inside this
//! crate works on `[u8; 32]`; strings only appear at the edges.

use crate::error::SolError;

/// Decode a Base58 address string into its 32 raw bytes.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(SolError::InvalidAddress("address is empty".into()));
    }

    let bytes = bs58::decode(trimmed)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Encode 32 bytes as a Base58 address string.
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Returns `true` when `address` decodes to exactly 32 bytes.
pub fn is_valid_address(address: &str) -> bool {
    address_to_bytes(address).is_ok()
}

/// Shorten an address for display: `AbCd...WxYz`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
