use alloy_primitives::U256;
use serde_json::{json, Map, Value};

use crate::address::{checksum_address, parse_address};
use crate::erc20;
use crate::error::EthError;

/// A transaction handed to the browser wallet for signing and submission.
///
/// Nonce, gas and fees are left to the wallet. `to = None` is a contract
/// deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmTransactionRequest {
    pub chain_id: u64,
    /// Checksummed recipient address.
    pub to: Option<String>,
    pub data: Vec<u8>,
    /// Value in wei.
    pub value: U256,
}

impl EvmTransactionRequest {
    pub fn is_deployment(&self) -> bool {
        self.to.is_none()
    }

    /// The `eth_sendTransaction` parameter object, hex-encoded the way
    /// wallet providers expect.
    pub fn to_provider_params(&self, from: &str) -> Value {
        let mut params = Map::new();
        params.insert("from".into(), json!(from));
        if let Some(to) = &self.to {
            params.insert("to".into(), json!(to));
        }
        params.insert("data".into(), json!(format!("0x{}", hex::encode(&self.data))));
        params.insert("value".into(), json!(format!("0x{:x}", self.value)));
        params.insert("chainId".into(), json!(format!("{:#x}", self.chain_id)));
        Value::Object(params)
    }
}

/// Builds a contract call with no value attached.
pub fn build_call_request(
    chain_id: u64,
    contract: &str,
    data: Vec<u8>,
) -> Result<EvmTransactionRequest, EthError> {
    Ok(EvmTransactionRequest {
        chain_id,
        to: Some(normalize_to_address(contract)?),
        data,
        value: U256::ZERO,
    })
}

/// Builds an ERC-20 `transfer` call against `token_contract`.
pub fn build_erc20_transfer(
    chain_id: u64,
    token_contract: &str,
    to: &str,
    amount: U256,
) -> Result<EvmTransactionRequest, EthError> {
    build_call_request(chain_id, token_contract, erc20::encode_transfer(to, amount)?)
}

/// Builds a contract deployment: `bytecode || constructor_args`.
pub fn build_deploy_request(
    chain_id: u64,
    bytecode: &[u8],
    constructor_args: &[u8],
) -> Result<EvmTransactionRequest, EthError> {
    if bytecode.is_empty() {
        return Err(EthError::TransactionBuildError("contract bytecode is empty".into()));
    }

    let mut data = Vec::with_capacity(bytecode.len() + constructor_args.len());
    data.extend_from_slice(bytecode);
    data.extend_from_slice(constructor_args);

    Ok(EvmTransactionRequest {
        chain_id,
        to: None,
        data,
        value: U256::ZERO,
    })
}

/// Decodes compiler output (`0x`-prefixed or bare hex) into bytecode.
pub fn bytecode_from_hex(bytecode: &str) -> Result<Vec<u8>, EthError> {
    let trimmed = bytecode.trim();
    let hex_str = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(hex_str).map_err(|e| EthError::EncodingError(format!("invalid bytecode hex: {e}")))
}

/// Validates a recipient and returns its EIP-55 form.
fn normalize_to_address(address: &str) -> Result<String, EthError> {
    let bytes = parse_address(address)?;
    checksum_address(&format!("0x{}", hex::encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0xdac17f958d2ee523a2206206994597c13d831ec7";
    const DEAD: &str = "0x000000000000000000000000000000000000dEaD";

    #[test]
    fn call_request_checksums_recipient() {
        let req = build_call_request(1, TOKEN, vec![0xAB]).unwrap();
        assert_eq!(
            req.to.as_deref(),
            Some("0xdAC17F958D2ee523a2206206994597C13D831ec7")
        );
        assert_eq!(req.value, U256::ZERO);
        assert!(!req.is_deployment());
    }

    #[test]
    fn call_request_invalid_contract() {
        assert!(build_call_request(1, "0xinvalid", Vec::new()).is_err());
    }

    #[test]
    fn erc20_transfer_request() {
        let req = build_erc20_transfer(56, TOKEN, DEAD, U256::from(1_000u64)).unwrap();
        assert_eq!(req.chain_id, 56);
        assert_eq!(req.data.len(), 68);
        assert_eq!(hex::encode(&req.data[..4]), "a9059cbb");
    }

    #[test]
    fn erc20_transfer_invalid_recipient() {
        assert!(build_erc20_transfer(1, TOKEN, "bad", U256::from(1u8)).is_err());
    }

    #[test]
    fn deploy_request_appends_constructor_args() {
        let req = build_deploy_request(11155111, &[0x60, 0x80], &[0x01, 0x02]).unwrap();
        assert!(req.is_deployment());
        assert_eq!(req.data, vec![0x60, 0x80, 0x01, 0x02]);
    }

    #[test]
    fn deploy_request_rejects_empty_bytecode() {
        assert!(build_deploy_request(1, &[], &[0x01]).is_err());
    }

    #[test]
    fn bytecode_hex_with_and_without_prefix() {
        assert_eq!(bytecode_from_hex("0x6080").unwrap(), vec![0x60, 0x80]);
        assert_eq!(bytecode_from_hex(" 6080 ").unwrap(), vec![0x60, 0x80]);
        assert!(bytecode_from_hex("0xzz").is_err());
    }

    #[test]
    fn provider_params_for_deployment_omit_to() {
        let req = build_deploy_request(97, &[0x60, 0x80], &[]).unwrap();
        let params = req.to_provider_params(DEAD);

        assert!(params.get("to").is_none());
        assert_eq!(params["from"], DEAD);
        assert_eq!(params["data"], "0x6080");
        assert!(params["value"].as_str().unwrap().starts_with("0x"));
        assert_eq!(params["chainId"], "0x61");
    }

    #[test]
    fn provider_params_for_call_include_to() {
        let req = build_call_request(1, TOKEN, vec![0x84, 0x56, 0xcb, 0x59]).unwrap();
        let params = req.to_provider_params(DEAD);
        assert_eq!(params["to"], "0xdAC17F958D2ee523a2206206994597C13D831ec7");
        assert_eq!(params["data"], "0x8456cb59");
    }
}
