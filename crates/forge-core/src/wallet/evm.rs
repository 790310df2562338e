use std::sync::Arc;

use async_trait::async_trait;
use chain_eth::EvmTransactionRequest;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::error::ForgeError;
use crate::networks::{self, AddChainParams, ChainFamily};
use crate::storage::ConnectionFlagStore;
use crate::wallet::selection::{not_installed, EvmWalletKind};
use crate::wallet::{ConnectionStatus, EventListener, ProviderError};

const CONNECT_REJECTED: &str = "Connection rejected by user";
const REQUEST_REJECTED: &str = "User rejected the request";
const ADD_NETWORK_REJECTED: &str = "User rejected adding the network";

/// Events an EVM wallet pushes without being asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvmProviderEvent {
    /// The exposed accounts changed; empty means the site lost access.
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
    Disconnected,
}

/// Mined result of a transaction sent through the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvmTransactionReceipt {
    pub transaction_hash: String,
    /// Set for contract deployments.
    pub contract_address: Option<String>,
}

/// An injected EVM wallet (MetaMask or compatible).
#[async_trait]
pub trait EvmProvider: Send + Sync {
    /// Prompt the user for account access (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Accounts already authorised for this site, without prompting
    /// (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<String>, ProviderError>;

    async fn chain_id(&self) -> Result<u64, ProviderError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), ProviderError>;

    /// Have the wallet sign and submit `request` from `from`, returning once
    /// the transaction is mined.
    async fn send_transaction(
        &self,
        from: &str,
        request: &EvmTransactionRequest,
    ) -> Result<EvmTransactionReceipt, ProviderError>;

    fn subscribe(&self) -> broadcast::Receiver<EvmProviderEvent>;
}

/// Parse a `0x`-prefixed hex chain ID as wallets report it.
pub fn parse_chain_id(hex_id: &str) -> Option<u64> {
    let trimmed = hex_id.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvmWalletState {
    pub address: Option<String>,
    pub chain_id: Option<u64>,
    /// Chain the current page needs, if any.
    pub target_chain_id: Option<u64>,
    pub status: ConnectionStatus,
}

impl EvmWalletState {
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn is_wrong_network(&self) -> bool {
        matches!((self.target_chain_id, self.chain_id), (Some(target), Some(chain)) if target != chain)
    }

    pub fn network_name(&self) -> Option<&'static str> {
        self.chain_id.map(networks::network_name)
    }

    fn refresh_status(&mut self) {
        self.status = if self.address.is_none() {
            ConnectionStatus::Disconnected
        } else if self.is_wrong_network() {
            ConnectionStatus::WrongNetwork
        } else {
            ConnectionStatus::Connected
        };
    }
}

/// Connection state for the EVM wallet, shared with the event listener.
#[derive(Clone)]
pub struct EvmWalletContext {
    provider: Option<Arc<dyn EvmProvider>>,
    flags: Arc<dyn ConnectionFlagStore>,
    state: Arc<RwLock<EvmWalletState>>,
}

impl EvmWalletContext {
    /// `provider` is `None` when no wallet extension was detected.
    pub fn new(provider: Option<Arc<dyn EvmProvider>>, flags: Arc<dyn ConnectionFlagStore>) -> Self {
        Self {
            provider,
            flags,
            state: Arc::new(RwLock::new(EvmWalletState::default())),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.provider.is_some()
    }

    pub fn snapshot(&self) -> EvmWalletState {
        self.state.read().clone()
    }

    pub fn address(&self) -> Option<String> {
        self.state.read().address.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().is_connected()
    }

    pub fn is_wrong_network(&self) -> bool {
        self.state.read().is_wrong_network()
    }

    /// Display name of the connected chain; `None` while no chain is known.
    pub fn network_name(&self) -> Option<&'static str> {
        self.state.read().network_name()
    }

    fn provider(&self) -> Result<&Arc<dyn EvmProvider>, ForgeError> {
        self.provider
            .as_ref()
            .ok_or_else(|| not_installed(EvmWalletKind::MetaMask.descriptor()))
    }

    /// Prompt for account access and record the first account.
    ///
    /// On failure only the status is settled again; account and chain
    /// events that arrived while the prompt was open are kept.
    pub async fn connect(&self) -> Result<String, ForgeError> {
        let provider = self.provider()?;

        self.state.write().status = ConnectionStatus::Connecting;

        let result = async {
            let accounts = provider
                .request_accounts()
                .await
                .map_err(|e| provider_failure(e, CONNECT_REJECTED))?;
            let address = accounts
                .into_iter()
                .next()
                .ok_or_else(|| ForgeError::Network("wallet returned no accounts".into()))?;
            let chain_id = provider
                .chain_id()
                .await
                .map_err(|e| provider_failure(e, CONNECT_REJECTED))?;
            Ok::<_, ForgeError>((address, chain_id))
        }
        .await;

        match result {
            Ok((address, chain_id)) => {
                {
                    let mut state = self.state.write();
                    state.address = Some(address.clone());
                    state.chain_id = Some(chain_id);
                    state.refresh_status();
                }
                persist_flag(self.flags.as_ref(), true);
                info!(address = %address, chain_id, "evm wallet connected");
                Ok(address)
            }
            Err(e) => {
                self.state.write().refresh_status();
                warn!(error = %e, "evm wallet connection failed");
                Err(e)
            }
        }
    }

    /// Forget the connection locally. The wallet keeps its site permission.
    pub fn disconnect(&self) {
        {
            let mut state = self.state.write();
            state.address = None;
            state.chain_id = None;
            state.refresh_status();
        }
        persist_flag(self.flags.as_ref(), false);
        info!("evm wallet disconnected");
    }

    /// Ask the wallet to switch to `chain_id`, adding the network first if
    /// the wallet does not know it.
    pub async fn switch_chain(&self, chain_id: u64) -> Result<(), ForgeError> {
        let provider = self.provider()?;

        match provider.switch_chain(chain_id).await {
            Ok(()) => {
                self.record_chain(chain_id);
                Ok(())
            }
            Err(ProviderError::UnrecognizedChain) => {
                debug!(chain_id, "chain unknown to wallet, adding it");
                self.add_and_switch_network(chain_id).await
            }
            Err(e) => Err(provider_failure(e, REQUEST_REJECTED)),
        }
    }

    /// Register a supported chain with the wallet, then switch to it.
    pub async fn add_and_switch_network(&self, chain_id: u64) -> Result<(), ForgeError> {
        let provider = self.provider()?;
        let chain = networks::get_chain_by_id(chain_id)
            .ok_or_else(|| ForgeError::UnsupportedChain(format!("chain id {chain_id}")))?;
        let params = AddChainParams::from_descriptor(chain)?;

        provider
            .add_chain(&params)
            .await
            .map_err(|e| provider_failure(e, ADD_NETWORK_REJECTED))?;
        provider
            .switch_chain(chain_id)
            .await
            .map_err(|e| provider_failure(e, ADD_NETWORK_REJECTED))?;

        info!(chain = %chain.key, "network added to wallet");
        self.record_chain(chain_id);
        Ok(())
    }

    fn record_chain(&self, chain_id: u64) {
        let mut state = self.state.write();
        state.chain_id = Some(chain_id);
        state.refresh_status();
    }

    /// Set the chain the current page needs; `None` disables the check.
    pub fn set_target_chain(&self, chain_id: Option<u64>) {
        let mut state = self.state.write();
        state.target_chain_id = chain_id;
        state.refresh_status();
    }

    pub fn apply_event(&self, event: EvmProviderEvent) {
        apply_event_to(&self.state, self.flags.as_ref(), event);
    }

    /// Apply provider events in the background until the returned guard is
    /// dropped.
    pub fn listen(&self) -> Result<EventListener, ForgeError> {
        let provider = self.provider()?;
        let runtime = Handle::try_current().map_err(|_| {
            ForgeError::Unavailable("no async runtime to listen for wallet events".into())
        })?;

        let mut events = provider.subscribe();
        let state = Arc::clone(&self.state);
        let flags = Arc::clone(&self.flags);

        let handle = runtime.spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => apply_event_to(&state, flags.as_ref(), event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "evm wallet events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("evm wallet event stream closed");
        });

        Ok(EventListener::new(handle))
    }

    /// Reconnect without prompting if the wallet was connected last session.
    ///
    /// Returns whether a connection was restored. Any failure clears the
    /// persisted flag.
    pub async fn restore(&self) -> bool {
        if !self.flags.is_set(ChainFamily::Evm) {
            return false;
        }
        let Some(provider) = self.provider.as_ref() else {
            return false;
        };

        let accounts = match provider.accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(error = %e, "could not restore evm wallet");
                persist_flag(self.flags.as_ref(), false);
                return false;
            }
        };
        let Some(address) = accounts.into_iter().next() else {
            return false;
        };
        let chain_id = match provider.chain_id().await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "could not read chain while restoring evm wallet");
                persist_flag(self.flags.as_ref(), false);
                return false;
            }
        };

        let mut state = self.state.write();
        state.address = Some(address);
        state.chain_id = Some(chain_id);
        state.refresh_status();
        info!(chain_id, "evm wallet restored");
        true
    }

    /// Send `request` through the wallet and wait for it to be mined.
    pub async fn send_transaction(
        &self,
        request: &EvmTransactionRequest,
    ) -> Result<EvmTransactionReceipt, ForgeError> {
        let from = self.address().ok_or(ForgeError::NotConnected)?;
        let provider = self.provider.as_ref().ok_or(ForgeError::NotConnected)?;

        let receipt = provider
            .send_transaction(&from, request)
            .await
            .map_err(|e| match e {
                ProviderError::Rpc { code, message } => {
                    ForgeError::Submission(format!("{message} (code {code})"))
                }
                other => provider_failure(other, REQUEST_REJECTED),
            })?;

        info!(
            tx = %receipt.transaction_hash,
            chain_id = request.chain_id,
            deployment = request.is_deployment(),
            "evm transaction mined"
        );
        Ok(receipt)
    }
}

fn apply_event_to(
    state: &RwLock<EvmWalletState>,
    flags: &dyn ConnectionFlagStore,
    event: EvmProviderEvent,
) {
    match event {
        EvmProviderEvent::AccountsChanged(accounts) => {
            let first = accounts.into_iter().next();
            let connected = first.is_some();
            {
                let mut state = state.write();
                state.address = first;
                state.refresh_status();
            }
            persist_flag(flags, connected);
            debug!(connected, "evm accounts changed");
        }
        EvmProviderEvent::ChainChanged(chain_id) => {
            let mut state = state.write();
            state.chain_id = Some(chain_id);
            state.refresh_status();
            debug!(chain_id, "evm chain changed");
        }
        EvmProviderEvent::Disconnected => {
            let mut state = state.write();
            state.address = None;
            state.chain_id = None;
            state.refresh_status();
            debug!("evm provider disconnected");
        }
    }
}

fn persist_flag(flags: &dyn ConnectionFlagStore, connected: bool) {
    let result = if connected {
        flags.set(ChainFamily::Evm)
    } else {
        flags.clear(ChainFamily::Evm)
    };
    if let Err(e) = result {
        warn!(error = %e, "could not persist evm connection flag");
    }
}

fn provider_failure(err: ProviderError, rejected: &str) -> ForgeError {
    match err {
        ProviderError::UserRejected => ForgeError::UserRejected(rejected.to_string()),
        ProviderError::UnrecognizedChain => {
            ForgeError::UnsupportedChain("chain not recognized by wallet".into())
        }
        ProviderError::Rpc { code, message } => {
            ForgeError::Network(format!("{message} (code {code})"))
        }
    }
}
