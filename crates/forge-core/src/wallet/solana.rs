use std::sync::Arc;

use async_trait::async_trait;
use chain_sol::{SignedSolTransaction, SolError, TransactionSigner};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ForgeError;
use crate::networks::ChainFamily;
use crate::storage::ConnectionFlagStore;
use crate::wallet::selection::SolanaWalletKind;
use crate::wallet::{ConnectionStatus, ProviderError};

const CONNECT_REJECTED: &str = "Connection rejected by user";
const SIGN_REJECTED: &str = "User rejected the request";

/// An injected Solana wallet (Phantom, Solflare, ...).
#[async_trait]
pub trait SolanaWalletProvider: Send + Sync {
    fn kind(&self) -> SolanaWalletKind;

    fn is_installed(&self) -> bool;

    /// Request the wallet's public key (Base58). With `only_if_trusted` the
    /// wallet must answer without showing a prompt.
    async fn connect(&self, only_if_trusted: bool) -> Result<String, ProviderError>;

    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Fill the wallet's signature slot in `tx`.
    async fn sign_transaction(
        &self,
        tx: SignedSolTransaction,
    ) -> Result<SignedSolTransaction, ProviderError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolanaWalletState {
    pub wallet: Option<SolanaWalletKind>,
    pub public_key: Option<String>,
    pub status: ConnectionStatus,
}

impl SolanaWalletState {
    pub fn is_connected(&self) -> bool {
        self.public_key.is_some()
    }

    fn refresh_status(&mut self) {
        self.status = if self.is_connected() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };
    }
}

/// Connection state for whichever Solana wallet is active.
#[derive(Clone)]
pub struct SolanaWalletContext {
    providers: Vec<Arc<dyn SolanaWalletProvider>>,
    flags: Arc<dyn ConnectionFlagStore>,
    state: Arc<RwLock<SolanaWalletState>>,
}

impl SolanaWalletContext {
    pub fn new(
        providers: Vec<Arc<dyn SolanaWalletProvider>>,
        flags: Arc<dyn ConnectionFlagStore>,
    ) -> Self {
        Self {
            providers,
            flags,
            state: Arc::new(RwLock::new(SolanaWalletState::default())),
        }
    }

    pub fn snapshot(&self) -> SolanaWalletState {
        self.state.read().clone()
    }

    /// Base58 public key of the active wallet.
    pub fn address(&self) -> Option<String> {
        self.state.read().public_key.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().is_connected()
    }

    /// Wallets whose extension is present, in picker order.
    pub fn available_wallets(&self) -> Vec<SolanaWalletKind> {
        SolanaWalletKind::ALL
            .into_iter()
            .filter(|kind| self.installed_provider(*kind).is_some())
            .collect()
    }

    fn installed_provider(&self, kind: SolanaWalletKind) -> Option<&Arc<dyn SolanaWalletProvider>> {
        self.providers
            .iter()
            .find(|p| p.kind() == kind && p.is_installed())
    }

    /// Connect `kind`, replacing any other active wallet.
    ///
    /// On failure the connection is left as it was; only the status is
    /// settled again.
    pub async fn connect(&self, kind: SolanaWalletKind) -> Result<String, ForgeError> {
        let provider = self
            .installed_provider(kind)
            .ok_or_else(|| kind.not_installed())?;

        self.state.write().status = ConnectionStatus::Connecting;

        let public_key = match provider.connect(false).await {
            Ok(key) if chain_sol::is_valid_address(&key) => key,
            Ok(key) => {
                self.state.write().refresh_status();
                return Err(ForgeError::Network(format!(
                    "{} returned an invalid public key: {key}",
                    kind.descriptor().name
                )));
            }
            Err(e) => {
                self.state.write().refresh_status();
                warn!(wallet = kind.id(), error = %e, "solana wallet connection failed");
                return Err(provider_failure(e, CONNECT_REJECTED));
            }
        };

        let active = self.state.read().wallet;
        if let Some(old) = active.filter(|old| *old != kind) {
            self.disconnect_provider(old).await;
        }

        {
            let mut state = self.state.write();
            state.wallet = Some(kind);
            state.public_key = Some(public_key.clone());
            state.status = ConnectionStatus::Connected;
        }
        self.persist(Some(kind));
        info!(wallet = kind.id(), public_key = %public_key, "solana wallet connected");
        Ok(public_key)
    }

    /// Clear the active wallet. The extension is asked to disconnect too;
    /// a failure there is only logged.
    pub async fn disconnect(&self) {
        let active = {
            let mut state = self.state.write();
            let active = state.wallet.take();
            state.public_key = None;
            state.status = ConnectionStatus::Disconnected;
            active
        };
        self.persist(None);

        if let Some(kind) = active {
            self.disconnect_provider(kind).await;
            info!(wallet = kind.id(), "solana wallet disconnected");
        }
    }

    async fn disconnect_provider(&self, kind: SolanaWalletKind) {
        if let Some(provider) = self.installed_provider(kind) {
            if let Err(e) = provider.disconnect().await {
                warn!(wallet = kind.id(), error = %e, "wallet disconnect failed");
            }
        }
    }

    /// Reconnect silently to the wallet used last session.
    pub async fn restore(&self) -> bool {
        if !self.flags.is_set(ChainFamily::Solana) {
            return false;
        }
        let Some(kind) = self
            .flags
            .last_solana_wallet()
            .and_then(|id| SolanaWalletKind::from_id(&id).ok())
        else {
            self.persist(None);
            return false;
        };
        let Some(provider) = self.installed_provider(kind) else {
            debug!(wallet = kind.id(), "last solana wallet no longer installed");
            return false;
        };

        match provider.connect(true).await {
            Ok(key) if chain_sol::is_valid_address(&key) => {
                let mut state = self.state.write();
                state.wallet = Some(kind);
                state.public_key = Some(key);
                state.status = ConnectionStatus::Connected;
                info!(wallet = kind.id(), "solana wallet restored");
                true
            }
            Ok(_) | Err(_) => {
                warn!(wallet = kind.id(), "could not restore solana wallet");
                self.persist(None);
                false
            }
        }
    }

    fn persist(&self, wallet: Option<SolanaWalletKind>) {
        let result = match wallet {
            Some(kind) => self
                .flags
                .set(ChainFamily::Solana)
                .and_then(|_| self.flags.set_last_solana_wallet(Some(kind.id()))),
            None => self
                .flags
                .clear(ChainFamily::Solana)
                .and_then(|_| self.flags.set_last_solana_wallet(None)),
        };
        if let Err(e) = result {
            warn!(error = %e, "could not persist solana connection flag");
        }
    }
}

#[async_trait]
impl TransactionSigner for SolanaWalletContext {
    fn public_key(&self) -> Result<[u8; 32], SolError> {
        let key = self
            .address()
            .ok_or_else(|| SolError::SigningError("wallet not connected".into()))?;
        chain_sol::address_to_bytes(&key)
    }

    async fn sign_transaction(
        &self,
        tx: SignedSolTransaction,
    ) -> Result<SignedSolTransaction, SolError> {
        let kind = self
            .state
            .read()
            .wallet
            .ok_or_else(|| SolError::SigningError("wallet not connected".into()))?;
        let provider = self
            .installed_provider(kind)
            .ok_or_else(|| SolError::SigningError(format!("{} is not available", kind.id())))?;

        provider.sign_transaction(tx).await.map_err(|e| match e {
            ProviderError::UserRejected => SolError::SigningRejected(SIGN_REJECTED.into()),
            other => SolError::SigningError(other.to_string()),
        })
    }
}

fn provider_failure(err: ProviderError, rejected: &str) -> ForgeError {
    match err {
        ProviderError::UserRejected => ForgeError::UserRejected(rejected.to_string()),
        other => ForgeError::Network(other.to_string()),
    }
}
