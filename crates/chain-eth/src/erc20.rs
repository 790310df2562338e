//! Calldata for the feature token the dashboard deploys: standard ERC-20
//! reads and transfers plus the owner-only management calls.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::abi::{encode_function_call, encode_params, selector, AbiParam};
use crate::address::parse_address;
use crate::error::EthError;

fn call_with_address(signature: &str, address: &str) -> Result<Vec<u8>, EthError> {
    let addr = parse_address(address)?;
    Ok(encode_function_call(selector(signature), &[AbiParam::Address(addr)]))
}

fn call_with_address_and_amount(
    signature: &str,
    address: &str,
    amount: U256,
) -> Result<Vec<u8>, EthError> {
    let addr = parse_address(address)?;
    let params = [AbiParam::Address(addr), AbiParam::Uint256(amount)];
    Ok(encode_function_call(selector(signature), &params))
}

/// `transfer(address,uint256)`.
pub fn encode_transfer(to: &str, amount: U256) -> Result<Vec<u8>, EthError> {
    call_with_address_and_amount("transfer(address,uint256)", to, amount)
}

/// `balanceOf(address)`.
pub fn encode_balance_of(owner: &str) -> Result<Vec<u8>, EthError> {
    call_with_address("balanceOf(address)", owner)
}

/// `mint(address,uint256)`; the token must be mintable and the caller the owner.
pub fn encode_mint(to: &str, amount: U256) -> Result<Vec<u8>, EthError> {
    call_with_address_and_amount("mint(address,uint256)", to, amount)
}

/// `burn(uint256)` from the caller's own balance.
pub fn encode_burn(amount: U256) -> Vec<u8> {
    encode_function_call(selector("burn(uint256)"), &[AbiParam::Uint256(amount)])
}

pub fn encode_pause() -> Vec<u8> {
    encode_function_call(selector("pause()"), &[])
}

pub fn encode_unpause() -> Vec<u8> {
    encode_function_call(selector("unpause()"), &[])
}

pub fn encode_blacklist(account: &str) -> Result<Vec<u8>, EthError> {
    call_with_address("blacklist(address)", account)
}

pub fn encode_unblacklist(account: &str) -> Result<Vec<u8>, EthError> {
    call_with_address("unBlacklist(address)", account)
}

pub fn encode_transfer_ownership(new_owner: &str) -> Result<Vec<u8>, EthError> {
    call_with_address("transferOwnership(address)", new_owner)
}

// ---------------------------------------------------------------------------
// Constructor
// ---------------------------------------------------------------------------

/// Constructor arguments of the feature token contract.
///
/// Amounts are already in base units. `max_supply` is ignored by the
/// contract unless `capped`; `tax_percentage` and `treasury` unless `tax`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConstructorParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    pub max_supply: U256,
    pub tax_percentage: u8,
    pub treasury: Option<String>,
    pub mintable: bool,
    pub burnable: bool,
    pub pausable: bool,
    pub capped: bool,
    pub tax: bool,
    pub blacklist: bool,
}

/// ABI-encodes the constructor arguments, in declaration order:
/// `(string,string,uint8,uint256,uint256,uint8,address,bool,bool,bool,bool,bool,bool)`.
///
/// A missing treasury encodes as the zero address.
pub fn encode_token_constructor(params: &TokenConstructorParams) -> Result<Vec<u8>, EthError> {
    let treasury = match params.treasury.as_deref() {
        Some(addr) if !addr.trim().is_empty() => parse_address(addr)?,
        _ => [0u8; 20],
    };

    Ok(encode_params(&[
        AbiParam::String(params.name.clone()),
        AbiParam::String(params.symbol.clone()),
        AbiParam::Uint256(U256::from(params.decimals)),
        AbiParam::Uint256(params.total_supply),
        AbiParam::Uint256(params.max_supply),
        AbiParam::Uint256(U256::from(params.tax_percentage)),
        AbiParam::Address(treasury),
        AbiParam::Bool(params.mintable),
        AbiParam::Bool(params.burnable),
        AbiParam::Bool(params.pausable),
        AbiParam::Bool(params.capped),
        AbiParam::Bool(params.tax),
        AbiParam::Bool(params.blacklist),
    ]))
}
