use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// The 40 hex digits after the `0x` prefix, or why there are not 40 of them.
fn hex_body(address: &str) -> Result<&str, EthError> {
    let body = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if body.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            body.len()
        )));
    }
    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress("address contains non-hex characters".into()));
    }
    Ok(body)
}

/// Raw 20 bytes of a 0x-prefixed address. Surrounding whitespace is ignored;
/// the checksum is not checked.
pub fn parse_address(address: &str) -> Result<[u8; 20], EthError> {
    let body = hex_body(address.trim())?;
    let mut out = [0u8; 20];
    hex::decode_to_slice(body, &mut out)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;
    Ok(out)
}

/// True when `address` is well formed and, if mixed-case, carries a valid
/// EIP-55 checksum.
pub fn is_valid_address(address: &str) -> bool {
    matches!(validate_address(address), Ok(true))
}

/// `Err` for malformed input, `Ok(false)` for a mixed-case address whose
/// checksum does not match. Single-case addresses carry no checksum.
pub fn validate_address(address: &str) -> Result<bool, EthError> {
    let body = hex_body(address)?;

    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    if !(has_upper && has_lower) {
        return Ok(true);
    }

    Ok(checksum_address(address)?[2..] == *body)
}

/// EIP-55 form of `address`, accepted in any case.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    let lower = hex_body(address)?.to_ascii_lowercase();
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Ok(out)
}
