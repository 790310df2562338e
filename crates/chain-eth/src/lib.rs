//! EVM support for the token dashboard.
//!
//! This crate provides:
//! - EIP-55 address validation and checksumming
//! - Minimal ABI encoding (static words, strings, bytes)
//! - Calldata for the feature token's ERC-20 and management functions
//! - Decimal amount parsing into `U256` base units
//! - Transaction requests handed to a browser wallet (calls and deployments)
//!
//! Signing and submission belong to the wallet; nothing here touches keys.

pub mod abi;
pub mod address;
pub mod erc20;
pub mod error;
pub mod transaction;
pub mod units;

pub use address::{checksum_address, is_valid_address, parse_address, validate_address};
pub use alloy_primitives::U256;
pub use erc20::{encode_token_constructor, TokenConstructorParams};
pub use error::EthError;
pub use transaction::{
    build_call_request, build_deploy_request, build_erc20_transfer, bytecode_from_hex,
    EvmTransactionRequest,
};
pub use units::{format_units, parse_units};
