//! Minimal ABI encoding for EVM function calls and constructor arguments.
//!
//! Covers the static word types plus `string`/`bytes`, which is everything
//! the token contracts' calls and constructor take. No ABI JSON parsing.

use alloy_primitives::U256;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// A single ABI-encoded parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// A 20-byte address, left-padded to 32 bytes.
    Address([u8; 20]),
    /// Any `uintN`; smaller widths encode identically.
    Uint256(U256),
    Bool(bool),
    /// Dynamic UTF-8 string.
    String(String),
    /// Dynamic byte array.
    Bytes(Vec<u8>),
}

impl AbiParam {
    fn is_dynamic(&self) -> bool {
        matches!(self, AbiParam::String(_) | AbiParam::Bytes(_))
    }
}

/// The 4-byte selector of a canonical function signature such as
/// `"transfer(address,uint256)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Encodes a function call: `selector || encode_params(params)`.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let encoded = encode_params(params);
    let mut data = Vec::with_capacity(4 + encoded.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(&encoded);
    data
}

/// Encodes a parameter tuple with the standard head/tail layout: static
/// values inline, dynamic values as an offset into the tail.
pub fn encode_params(params: &[AbiParam]) -> Vec<u8> {
    let head_len = params.len() * 32;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for param in params {
        if param.is_dynamic() {
            head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
            tail.extend_from_slice(&encode_dynamic(param));
        } else {
            head.extend_from_slice(&encode_static(param));
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Decodes a single uint256 return value (e.g. from `balanceOf`).
pub fn decode_uint256(data: &[u8]) -> Result<U256, EthError> {
    if data.len() < 32 {
        return Err(EthError::EncodingError(format!(
            "expected at least 32 bytes for uint256, got {}",
            data.len()
        )));
    }
    let mut word = [0u8; 32];
    word.copy_from_slice(&data[..32]);
    Ok(U256::from_be_bytes(word))
}

fn uint_word(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

fn encode_static(param: &AbiParam) -> [u8; 32] {
    match param {
        AbiParam::Address(addr) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr);
            word
        }
        AbiParam::Uint256(value) => uint_word(*value),
        AbiParam::Bool(flag) => uint_word(U256::from(u8::from(*flag))),
        // Dynamic values never reach here.
        AbiParam::String(_) | AbiParam::Bytes(_) => [0u8; 32],
    }
}

fn encode_dynamic(param: &AbiParam) -> Vec<u8> {
    let bytes: &[u8] = match param {
        AbiParam::String(s) => s.as_bytes(),
        AbiParam::Bytes(b) => b.as_slice(),
        _ => &[],
    };

    let padded_len = bytes.len().div_ceil(32) * 32;
    let mut out = Vec::with_capacity(32 + padded_len);
    out.extend_from_slice(&uint_word(U256::from(bytes.len())));
    out.extend_from_slice(bytes);
    out.resize(32 + padded_len, 0);
    out
}
