//! Browser-wallet connection state for both chain families.
//!
//! The wallet extensions themselves sit behind the [`evm::EvmProvider`] and
//! [`solana::SolanaWalletProvider`] traits; this module keeps what the
//! dashboard knows about them.

pub mod evm;
pub mod selection;
pub mod solana;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;

/// Code wallets return when the user dismisses a prompt.
pub const USER_REJECTED_CODE: i64 = 4001;
/// Code an EVM wallet returns when asked to switch to a chain it has never
/// been told about.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Connected, but to a chain other than the one the current action needs.
    WrongNetwork,
}

/// Failure reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Unrecognized chain")]
    UnrecognizedChain,

    #[error("Provider error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl ProviderError {
    /// Classify an EIP-1193 style error code.
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        match code {
            USER_REJECTED_CODE => ProviderError::UserRejected,
            UNRECOGNIZED_CHAIN_CODE => ProviderError::UnrecognizedChain,
            _ => ProviderError::Rpc {
                code,
                message: message.into(),
            },
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::UserRejected)
    }
}

/// Keeps a provider event subscription alive. Dropping it stops the
/// background task.
#[derive(Debug)]
pub struct EventListener {
    handle: JoinHandle<()>,
}

impl EventListener {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// True once the provider's event stream has closed.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
