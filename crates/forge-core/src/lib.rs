//! Core of the token dashboard: network registry, wallet connection state
//! for EVM and Solana browser wallets, form validation, deployment flows and
//! the record of what was deployed.
//!
//! Chain-specific encoding lives in `chain-eth` and `chain-sol`; this crate
//! decides when to call them and keeps the state around the calls.

pub mod config;
pub mod deploy;
pub mod error;
pub mod logging;
pub mod networks;
pub mod records;
pub mod storage;
pub mod types;
pub mod validation;
pub mod wallet;

pub use config::ForgeConfig;
pub use deploy::{
    deploy_evm_token, deploy_solana_token, manage_evm_token, manage_solana_token, EvmTokenAction,
    SolanaTokenAction,
};
pub use error::ForgeError;
pub use networks::{
    chains_for_family, get_chain, get_chain_by_id, network_name, supported_chains, AddChainParams,
    ChainDescriptor, ChainFamily, ChainKey, NetworkTier,
};
pub use records::{DeployedToken, TokenRecordStore, TokenStatus};
pub use storage::{ConnectionFlagStore, FileFlagStore, MemoryFlagStore};
pub use types::{EvmTokenRequest, SolanaTokenRequest, TokenCreationRequest};
pub use validation::{validate_request, FieldError, ValidationErrors};
pub use wallet::evm::{
    EvmProvider, EvmProviderEvent, EvmTransactionReceipt, EvmWalletContext, EvmWalletState,
};
pub use wallet::selection::{
    connect_wallet, wallet_options, ConnectedWallet, EvmWalletKind, SolanaWalletKind,
    WalletDescriptor, WalletKind, WalletOption,
};
pub use wallet::solana::{SolanaWalletContext, SolanaWalletProvider, SolanaWalletState};
pub use wallet::{ConnectionStatus, EventListener, ProviderError};
