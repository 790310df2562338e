//! Cross-crate integration tests for the dashboard flows:
//! pick a wallet -> connect -> validate form -> deploy -> manage token.
//!
//! Wallets and the Solana cluster are in-process fakes implementing the
//! public provider traits, so every byte that would go to a real node is
//! decoded and checked here.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chain_eth::EvmTransactionRequest;
use chain_sol::{
    address_to_bytes, bytes_to_address, derive_associated_token_address, LatestBlockhash,
    Recipient, SignedSolTransaction, SolError, SolanaRpc, TokenAccountInfo,
    ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use ed25519_dalek::SigningKey;
use forge_core::*;
use parking_lot::Mutex;
use tokio::sync::broadcast;

// ─── Fakes ───────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeCluster {
    accounts: Mutex<HashSet<[u8; 32]>>,
    sent: Mutex<Vec<SignedSolTransaction>>,
}

impl FakeCluster {
    fn last_sent(&self) -> SignedSolTransaction {
        self.sent.lock().last().cloned().expect("nothing was sent")
    }
}

#[async_trait]
impl SolanaRpc for FakeCluster {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, SolError> {
        Ok(LatestBlockhash {
            blockhash: [0x77; 32],
            last_valid_block_height: 10_000,
        })
    }

    async fn account_exists(&self, address: &[u8; 32]) -> Result<bool, SolError> {
        Ok(self.accounts.lock().contains(address))
    }

    async fn get_token_account(&self, address: &[u8; 32]) -> Result<TokenAccountInfo, SolError> {
        Err(SolError::AccountNotFound(bytes_to_address(address)))
    }

    async fn get_mint_decimals(&self, _mint: &[u8; 32]) -> Result<u8, SolError> {
        Ok(6)
    }

    async fn get_minimum_balance_for_rent_exemption(&self, _space: u64) -> Result<u64, SolError> {
        Ok(1_461_600)
    }

    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<String, SolError> {
        let tx = SignedSolTransaction::from_wire(wire)?;
        if !tx.is_fully_signed() {
            return Err(SolError::TransactionFailed("missing signature".into()));
        }
        for i in 0..tx.message.compiled_instructions.len() {
            if tx.message.program_of(i) == Some(&ASSOCIATED_TOKEN_PROGRAM_ID) {
                self.accounts.lock().insert(tx.message.instruction_accounts(i)[1]);
            }
        }
        let signature = tx.signature().unwrap_or_default();
        self.sent.lock().push(tx);
        Ok(signature)
    }

    async fn confirm_transaction(
        &self,
        _signature: &str,
        _blockhash: &LatestBlockhash,
    ) -> Result<(), SolError> {
        Ok(())
    }
}

struct FakePhantom {
    key: SigningKey,
}

impl FakePhantom {
    fn new() -> Self {
        Self {
            key: SigningKey::from_bytes(&[0x21; 32]),
        }
    }

    fn address(&self) -> String {
        bytes_to_address(&self.key.verifying_key().to_bytes())
    }
}

#[async_trait]
impl SolanaWalletProvider for FakePhantom {
    fn kind(&self) -> SolanaWalletKind {
        SolanaWalletKind::Phantom
    }

    fn is_installed(&self) -> bool {
        true
    }

    async fn connect(&self, _only_if_trusted: bool) -> Result<String, ProviderError> {
        Ok(self.address())
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn sign_transaction(
        &self,
        mut tx: SignedSolTransaction,
    ) -> Result<SignedSolTransaction, ProviderError> {
        tx.sign_with(&self.key).map_err(|e| ProviderError::Rpc {
            code: -1,
            message: e.to_string(),
        })?;
        Ok(tx)
    }
}

const METAMASK_ACCOUNT: &str = "0x000000000000000000000000000000000000dEaD";

struct FakeMetaMask {
    chain_id: Mutex<u64>,
    sent: Mutex<Vec<EvmTransactionRequest>>,
    events: broadcast::Sender<EvmProviderEvent>,
}

impl FakeMetaMask {
    fn on_chain(chain_id: u64) -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            chain_id: Mutex::new(chain_id),
            sent: Mutex::new(Vec::new()),
            events,
        }
    }
}

#[async_trait]
impl EvmProvider for FakeMetaMask {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![METAMASK_ACCOUNT.to_string()])
    }

    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![METAMASK_ACCOUNT.to_string()])
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(*self.chain_id.lock())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        *self.chain_id.lock() = chain_id;
        Ok(())
    }

    async fn add_chain(&self, _params: &AddChainParams) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn send_transaction(
        &self,
        _from: &str,
        request: &EvmTransactionRequest,
    ) -> Result<EvmTransactionReceipt, ProviderError> {
        self.sent.lock().push(request.clone());
        Ok(EvmTransactionReceipt {
            transaction_hash: format!("0x{}", "ab".repeat(32)),
            contract_address: request
                .is_deployment()
                .then(|| "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string()),
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<EvmProviderEvent> {
        self.events.subscribe()
    }
}

fn contexts(
    metamask: Option<Arc<FakeMetaMask>>,
    phantom: Arc<FakePhantom>,
) -> (EvmWalletContext, SolanaWalletContext) {
    let flags: Arc<dyn ConnectionFlagStore> = Arc::new(MemoryFlagStore::new());
    let evm = EvmWalletContext::new(
        metamask.map(|m| m as Arc<dyn EvmProvider>),
        Arc::clone(&flags),
    );
    let solana = SolanaWalletContext::new(vec![phantom as Arc<dyn SolanaWalletProvider>], flags);
    (evm, solana)
}

fn amount_of(data: &[u8]) -> u64 {
    u64::from_le_bytes(data[1..9].try_into().unwrap())
}

// ─── Wallet selection ────────────────────────────────────────────────

#[tokio::test]
async fn picker_reflects_installed_wallets() {
    let (evm, solana) = contexts(None, Arc::new(FakePhantom::new()));

    let evm_options = wallet_options(ChainFamily::Evm, &evm, &solana);
    assert_eq!(evm_options.len(), 2);
    assert!(evm_options.iter().all(|o| !o.installed));

    let sol_options = wallet_options(ChainFamily::Solana, &evm, &solana);
    let installed: Vec<_> = sol_options
        .iter()
        .filter(|o| o.installed)
        .map(|o| o.descriptor.id)
        .collect();
    assert_eq!(installed, vec!["phantom"]);
}

#[tokio::test]
async fn picking_missing_metamask_reports_install_url() {
    let (evm, solana) = contexts(None, Arc::new(FakePhantom::new()));
    let kind = WalletKind::from_id(ChainFamily::Evm, "metamask").unwrap();

    let err = connect_wallet(kind, &evm, &solana).await.unwrap_err();
    assert_eq!(err.install_url(), Some("https://metamask.io/download/"));
    assert_eq!(evm.snapshot(), EvmWalletState::default());
}

#[tokio::test]
async fn walletconnect_is_unavailable() {
    let (evm, solana) = contexts(
        Some(Arc::new(FakeMetaMask::on_chain(1))),
        Arc::new(FakePhantom::new()),
    );
    let kind = WalletKind::from_id(ChainFamily::Evm, "walletconnect").unwrap();

    let err = connect_wallet(kind, &evm, &solana).await.unwrap_err();
    assert_eq!(err.to_string(), "WalletConnect integration is coming soon");
    assert!(!evm.is_connected());
}

#[tokio::test]
async fn picking_phantom_connects_solana_only() {
    let phantom = Arc::new(FakePhantom::new());
    let (evm, solana) = contexts(None, phantom.clone());
    let kind = WalletKind::from_id(ChainFamily::Solana, "phantom").unwrap();

    let connected = connect_wallet(kind, &evm, &solana).await.unwrap();
    assert_eq!(connected.address, phantom.address());
    assert_eq!(connected.message(), "Successfully connected to Phantom");
    assert!(solana.is_connected());
    assert!(!evm.is_connected());
}

// ─── Solana: create -> multisend ─────────────────────────────────────

#[tokio::test]
async fn solana_create_then_multisend() {
    let phantom = Arc::new(FakePhantom::new());
    let (_, solana) = contexts(None, phantom.clone());
    solana.connect(SolanaWalletKind::Phantom).await.unwrap();

    let cluster = FakeCluster::default();
    let mut store = TokenRecordStore::new();
    let mut request = SolanaTokenRequest::new("Forge", "FRG", "1000", ChainKey::SolanaDevnet);
    request.decimals = 6;

    let record = deploy_solana_token(&solana, &cluster, &mut store, &request)
        .await
        .unwrap();
    assert_eq!(record.status, TokenStatus::Deployed);
    let mint = record.contract_address.clone().unwrap();

    let create_tx = cluster.last_sent();
    assert_eq!(create_tx.signatures.len(), 2);
    assert_eq!(create_tx.signature(), record.transaction_hash);

    // The deployer's own account now exists; the recipients' do not.
    let a = bytes_to_address(&[0xA1; 32]);
    let b = bytes_to_address(&[0xB2; 32]);
    let action = SolanaTokenAction::Multisend {
        recipients: vec![
            Recipient {
                address: a.clone(),
                amount: 10.0,
            },
            Recipient {
                address: b.clone(),
                amount: 5.0,
            },
        ],
    };
    manage_solana_token(&solana, &cluster, &mint, 6, &action)
        .await
        .unwrap();

    let tx = cluster.last_sent();
    let ixs = &tx.message.compiled_instructions;
    let ata_creations = (0..ixs.len())
        .filter(|i| tx.message.program_of(*i) == Some(&ASSOCIATED_TOKEN_PROGRAM_ID))
        .count();
    let transfers: Vec<u64> = (0..ixs.len())
        .filter(|i| tx.message.program_of(*i) == Some(&TOKEN_PROGRAM_ID))
        .map(|i| amount_of(&ixs[i].data))
        .collect();

    assert_eq!(ata_creations, 2);
    assert_eq!(transfers, vec![10_000_000, 5_000_000]);

    let mint_bytes = address_to_bytes(&mint).unwrap();
    let ata_a = derive_associated_token_address(&address_to_bytes(&a).unwrap(), &mint_bytes).unwrap();
    assert!(cluster.accounts.lock().contains(&ata_a));
}

#[tokio::test]
async fn solana_form_errors_never_reach_cluster() {
    let (_, solana) = contexts(None, Arc::new(FakePhantom::new()));
    solana.connect(SolanaWalletKind::Phantom).await.unwrap();

    let cluster = FakeCluster::default();
    let mut store = TokenRecordStore::new();
    let mut request = SolanaTokenRequest::new("", "FRG", "-4", ChainKey::SolanaTestnet);
    request.website = Some("forge dot example".into());

    let err = deploy_solana_token(&solana, &cluster, &mut store, &request)
        .await
        .unwrap_err();
    match err {
        ForgeError::Validation(errors) => assert_eq!(errors.errors().len(), 3),
        other => panic!("unexpected {other:?}"),
    }
    assert!(cluster.sent.lock().is_empty());
    assert!(store.is_empty());
}

// ─── EVM: switch -> deploy -> manage ─────────────────────────────────

#[tokio::test]
async fn evm_switch_then_deploy_taxed_token() {
    let metamask = Arc::new(FakeMetaMask::on_chain(1));
    let (evm, solana) = contexts(Some(metamask.clone()), Arc::new(FakePhantom::new()));
    connect_wallet(WalletKind::Evm(EvmWalletKind::MetaMask), &evm, &solana)
        .await
        .unwrap();

    let mut request = EvmTokenRequest::new("Forge", "FRG", "1000000", ChainKey::EthereumTestnet);
    request.has_tax = true;
    request.tax_percentage = 2;
    request.treasury_wallet = METAMASK_ACCOUNT.into();

    let mut store = TokenRecordStore::new();
    let err = deploy_evm_token(&evm, &mut store, &request, &[0x60, 0x80])
        .await
        .unwrap_err();
    assert!(matches!(err, ForgeError::WrongNetwork { .. }));

    evm.switch_chain(11155111).await.unwrap();
    assert!(!evm.is_wrong_network());

    let record = deploy_evm_token(&evm, &mut store, &request, &[0x60, 0x80])
        .await
        .unwrap();
    assert_eq!(record.status, TokenStatus::Deployed);
    assert_eq!(record.tax_percentage, Some(2));
    assert_eq!(store.list_by_deployer(METAMASK_ACCOUNT).len(), 1);

    let sent = metamask.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chain_id, 11155111);
    assert!(sent[0].is_deployment());
}

#[tokio::test]
async fn evm_tax_without_treasury_sends_nothing() {
    let metamask = Arc::new(FakeMetaMask::on_chain(56));
    let (evm, _) = contexts(Some(metamask.clone()), Arc::new(FakePhantom::new()));
    evm.connect().await.unwrap();

    let mut request = EvmTokenRequest::new("Forge", "FRG", "1000", ChainKey::BscMainnet);
    request.has_tax = true;

    let mut store = TokenRecordStore::new();
    let err = deploy_evm_token(&evm, &mut store, &request, &[0x60])
        .await
        .unwrap_err();
    match err {
        ForgeError::Validation(errors) => {
            assert_eq!(
                errors.for_field("treasuryWallet"),
                vec!["Treasury wallet address is required when tax feature is enabled"]
            );
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(metamask.sent.lock().is_empty());
}

#[tokio::test]
async fn evm_manage_pauses_deployed_token() {
    let metamask = Arc::new(FakeMetaMask::on_chain(97));
    let (evm, _) = contexts(Some(metamask.clone()), Arc::new(FakePhantom::new()));
    evm.connect().await.unwrap();

    let contract = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    manage_evm_token(&evm, ChainKey::BscTestnet, contract, 18, &EvmTokenAction::Pause)
        .await
        .unwrap();

    let sent = metamask.sent.lock();
    assert_eq!(sent[0].data, vec![0x84, 0x56, 0xcb, 0x59]);
    assert_eq!(sent[0].to.as_deref(), Some(contract));
}

// ─── Records on disk ─────────────────────────────────────────────────

#[tokio::test]
async fn records_and_flags_survive_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = ForgeConfig::default();
    config.data_dir = Some(tmp.path().to_path_buf());
    let records_path = config.data_file("tokens.json").unwrap();
    let flags_path = config.data_file("flags.json").unwrap();

    let phantom = Arc::new(FakePhantom::new());
    {
        let flags = Arc::new(FileFlagStore::open(&flags_path).unwrap());
        let solana = SolanaWalletContext::new(vec![phantom.clone() as Arc<dyn SolanaWalletProvider>], flags);
        solana.connect(SolanaWalletKind::Phantom).await.unwrap();

        let mut store = TokenRecordStore::new();
        let request = SolanaTokenRequest::new("Forge", "FRG", "0", ChainKey::SolanaTestnet);
        deploy_solana_token(&solana, &FakeCluster::default(), &mut store, &request)
            .await
            .unwrap();
        store.save_to_file(&records_path).unwrap();
    }

    let flags = Arc::new(FileFlagStore::open(&flags_path).unwrap());
    let solana = SolanaWalletContext::new(vec![phantom.clone() as Arc<dyn SolanaWalletProvider>], flags);
    assert!(solana.restore().await);
    assert_eq!(solana.address(), Some(phantom.address()));

    let store = TokenRecordStore::load_from_file(&records_path).unwrap();
    let records = store.list_by_deployer(&phantom.address());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, TokenStatus::Deployed);
}
