//! Token deployment and management flows.
//!
//! Each flow validates first, so a bad form never reaches the wallet or the
//! network, then records the attempt before anything is signed so that a
//! failed deployment still leaves a `failed` record behind.

use chain_eth::{TokenConstructorParams, U256};
use chain_sol::{AuthorityKind, NewMintParams, Recipient, SolanaRpc};
use tracing::{info, warn};

use crate::error::ForgeError;
use crate::networks::{self, ChainFamily, ChainKey};
use crate::records::{DeployedToken, TokenRecordStore};
use crate::types::{EvmTokenRequest, SolanaTokenRequest, TokenCreationRequest};
use crate::validation::{validate_evm_request, validate_solana_request, ValidationErrors};
use crate::wallet::evm::EvmWalletContext;
use crate::wallet::solana::SolanaWalletContext;

// ─── Solana ──────────────────────────────────────────────────────────

/// Create an SPL token from `request` with the connected Solana wallet as
/// payer and authority.
pub async fn deploy_solana_token(
    ctx: &SolanaWalletContext,
    rpc: &dyn SolanaRpc,
    store: &mut TokenRecordStore,
    request: &SolanaTokenRequest,
) -> Result<DeployedToken, ForgeError> {
    validate_solana_request(request)?;
    let initial_supply_units = request
        .initial_supply_units()
        .map_err(|e| ForgeError::field("totalSupply", e.to_string()))?;
    let deployer = ctx.address().ok_or(ForgeError::NotConnected)?;

    let id = store.record_pending(&TokenCreationRequest::Solana(request.clone()), &deployer);
    let params = NewMintParams {
        decimals: request.decimals,
        initial_supply_units,
        mint_authority: request.enable_mint_authority,
        freeze_authority: request.enable_freeze_authority,
    };

    match chain_sol::create_token(rpc, ctx, &params).await {
        Ok(created) => {
            let record = store.mark_deployed(&id, &created.mint_address, &created.signature)?;
            info!(
                chain = %request.chain,
                mint = %created.mint_address,
                explorer = %request.chain.descriptor().explorer_tx_url(&created.signature),
                "spl token created"
            );
            Ok(record.clone())
        }
        Err(e) => {
            store.mark_failed(&id)?;
            Err(e.into())
        }
    }
}

/// A management call against an existing SPL mint.
#[derive(Debug, Clone, PartialEq)]
pub enum SolanaTokenAction {
    Mint { destination: String, amount: f64 },
    Burn { amount: f64 },
    Freeze { token_account: String },
    Unfreeze { token_account: String },
    TransferAuthority { kind: AuthorityKind, new_authority: String },
    Multisend { recipients: Vec<Recipient> },
}

/// Run `action` on `mint` with the connected wallet as signer. Returns the
/// transaction signature.
pub async fn manage_solana_token(
    ctx: &SolanaWalletContext,
    rpc: &dyn SolanaRpc,
    mint: &str,
    decimals: u8,
    action: &SolanaTokenAction,
) -> Result<String, ForgeError> {
    check_solana_action(mint, decimals, action)?;
    if !ctx.is_connected() {
        return Err(ForgeError::NotConnected);
    }

    let signature = match action {
        SolanaTokenAction::Mint { destination, amount } => {
            chain_sol::mint_tokens(rpc, ctx, mint, destination, *amount, decimals).await?
        }
        SolanaTokenAction::Burn { amount } => {
            chain_sol::burn_tokens(rpc, ctx, mint, *amount, decimals).await?
        }
        SolanaTokenAction::Freeze { token_account } => {
            chain_sol::freeze_account(rpc, ctx, mint, token_account).await?
        }
        SolanaTokenAction::Unfreeze { token_account } => {
            chain_sol::unfreeze_account(rpc, ctx, mint, token_account).await?
        }
        SolanaTokenAction::TransferAuthority {
            kind,
            new_authority,
        } => chain_sol::transfer_authority(rpc, ctx, mint, *kind, new_authority).await?,
        SolanaTokenAction::Multisend { recipients } => {
            chain_sol::multisend(rpc, ctx, mint, recipients, decimals).await?
        }
    };
    Ok(signature)
}

/// Addresses and amounts of a Solana action, checked before any wallet or
/// node is involved.
fn check_solana_action(
    mint: &str,
    decimals: u8,
    action: &SolanaTokenAction,
) -> Result<(), ForgeError> {
    let mut errors = ValidationErrors::default();
    check_sol_address(&mut errors, "mint", mint);

    match action {
        SolanaTokenAction::Mint { destination, amount } => {
            check_sol_address(&mut errors, "destination", destination);
            check_sol_amount(&mut errors, "amount", *amount, decimals);
        }
        SolanaTokenAction::Burn { amount } => check_sol_amount(&mut errors, "amount", *amount, decimals),
        SolanaTokenAction::Freeze { token_account }
        | SolanaTokenAction::Unfreeze { token_account } => {
            check_sol_address(&mut errors, "tokenAccount", token_account);
        }
        SolanaTokenAction::TransferAuthority { new_authority, .. } => {
            check_sol_address(&mut errors, "newAuthority", new_authority);
        }
        SolanaTokenAction::Multisend { recipients } => {
            if recipients.is_empty() {
                errors.push("recipients", "At least one recipient is required");
            }
            for recipient in recipients {
                check_sol_address(&mut errors, "recipients", &recipient.address);
                check_sol_amount(&mut errors, "recipients", recipient.amount, decimals);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ForgeError::Validation(errors))
    }
}

fn check_sol_address(errors: &mut ValidationErrors, field: &'static str, address: &str) {
    if !chain_sol::is_valid_address(address) {
        errors.push(field, format!("Invalid Solana address: {address}"));
    }
}

fn check_sol_amount(errors: &mut ValidationErrors, field: &'static str, amount: f64, decimals: u8) {
    match chain_sol::ui_amount_to_base_units(amount, decimals) {
        Ok(0) => errors.push(field, "Amount must be greater than 0"),
        Ok(_) => {}
        Err(e) => errors.push(field, e.to_string()),
    }
}

// ─── EVM ─────────────────────────────────────────────────────────────

/// Deploy the feature token described by `request` from the connected EVM
/// wallet. `bytecode` is the compiled contract's creation code.
///
/// The wallet must already be on the request's chain; nothing is switched
/// implicitly.
pub async fn deploy_evm_token(
    ctx: &EvmWalletContext,
    store: &mut TokenRecordStore,
    request: &EvmTokenRequest,
    bytecode: &[u8],
) -> Result<DeployedToken, ForgeError> {
    validate_evm_request(request)?;

    let chain = request.chain.descriptor();
    ctx.set_target_chain(Some(chain.chain_id));
    let state = ctx.snapshot();
    let deployer = state.address.clone().ok_or(ForgeError::NotConnected)?;
    require_chain(state.chain_id, request.chain)?;

    let params = constructor_params(request)?;
    let args = chain_eth::encode_token_constructor(&params)?;
    let tx = chain_eth::build_deploy_request(chain.chain_id, bytecode, &args)?;

    let id = store.record_pending(&TokenCreationRequest::Evm(request.clone()), &deployer);
    let receipt = match ctx.send_transaction(&tx).await {
        Ok(receipt) => receipt,
        Err(e) => {
            store.mark_failed(&id)?;
            return Err(e);
        }
    };

    let Some(contract) = receipt.contract_address.as_deref() else {
        store.mark_failed(&id)?;
        warn!(tx = %receipt.transaction_hash, "deployment receipt has no contract address");
        return Err(ForgeError::Submission(format!(
            "transaction {} did not create a contract",
            receipt.transaction_hash
        )));
    };

    let record = store.mark_deployed(&id, contract, &receipt.transaction_hash)?;
    info!(
        chain = %request.chain,
        contract = %contract,
        explorer = %chain.explorer_address_url(contract),
        "token contract deployed"
    );
    Ok(record.clone())
}

/// A management call against a deployed feature token. Amounts are whole
/// tokens as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvmTokenAction {
    Transfer { to: String, amount: String },
    Mint { to: String, amount: String },
    Burn { amount: String },
    Pause,
    Unpause,
    Blacklist { account: String },
    Unblacklist { account: String },
    TransferOwnership { new_owner: String },
}

impl EvmTokenAction {
    /// Calldata for this call on a token with `decimals`.
    pub fn calldata(&self, decimals: u8) -> Result<Vec<u8>, ForgeError> {
        use chain_eth::erc20;

        let data = match self {
            EvmTokenAction::Transfer { to, amount } => {
                erc20::encode_transfer(to, to_base_units("amount", amount, decimals)?)?
            }
            EvmTokenAction::Mint { to, amount } => {
                erc20::encode_mint(to, to_base_units("amount", amount, decimals)?)?
            }
            EvmTokenAction::Burn { amount } => {
                erc20::encode_burn(to_base_units("amount", amount, decimals)?)
            }
            EvmTokenAction::Pause => erc20::encode_pause(),
            EvmTokenAction::Unpause => erc20::encode_unpause(),
            EvmTokenAction::Blacklist { account } => erc20::encode_blacklist(account)?,
            EvmTokenAction::Unblacklist { account } => erc20::encode_unblacklist(account)?,
            EvmTokenAction::TransferOwnership { new_owner } => {
                erc20::encode_transfer_ownership(new_owner)?
            }
        };
        Ok(data)
    }
}

/// Send `action` to `contract` on `chain`. Returns the transaction hash.
pub async fn manage_evm_token(
    ctx: &EvmWalletContext,
    chain: ChainKey,
    contract: &str,
    decimals: u8,
    action: &EvmTokenAction,
) -> Result<String, ForgeError> {
    if chain.family() != ChainFamily::Evm {
        return Err(ForgeError::UnsupportedChain(format!("{chain} is not an EVM network")));
    }
    check_evm_action(contract, decimals, action)?;
    let chain_id = chain.descriptor().chain_id;
    ctx.set_target_chain(Some(chain_id));
    let state = ctx.snapshot();
    if !state.is_connected() {
        return Err(ForgeError::NotConnected);
    }
    require_chain(state.chain_id, chain)?;

    let tx = chain_eth::build_call_request(chain_id, contract, action.calldata(decimals)?)?;
    let receipt = ctx.send_transaction(&tx).await?;
    Ok(receipt.transaction_hash)
}

/// Addresses and amounts of an EVM call, checked before the wallet is asked
/// to sign anything.
fn check_evm_action(contract: &str, decimals: u8, action: &EvmTokenAction) -> Result<(), ForgeError> {
    let mut errors = ValidationErrors::default();
    check_evm_address(&mut errors, "contract", contract);

    let amount = match action {
        EvmTokenAction::Transfer { to, amount } | EvmTokenAction::Mint { to, amount } => {
            check_evm_address(&mut errors, "to", to);
            Some(amount)
        }
        EvmTokenAction::Burn { amount } => Some(amount),
        EvmTokenAction::Blacklist { account } | EvmTokenAction::Unblacklist { account } => {
            check_evm_address(&mut errors, "account", account);
            None
        }
        EvmTokenAction::TransferOwnership { new_owner } => {
            check_evm_address(&mut errors, "newOwner", new_owner);
            None
        }
        EvmTokenAction::Pause | EvmTokenAction::Unpause => None,
    };
    if let Some(amount) = amount {
        match chain_eth::parse_units(amount, decimals) {
            Ok(units) if units.is_zero() => errors.push("amount", "Amount must be greater than 0"),
            Ok(_) => {}
            Err(e) => errors.push("amount", e.to_string()),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ForgeError::Validation(errors))
    }
}

fn check_evm_address(errors: &mut ValidationErrors, field: &'static str, address: &str) {
    if !chain_eth::is_valid_address(address) {
        errors.push(field, format!("Invalid address: {address}"));
    }
}

fn require_chain(connected: Option<u64>, expected: ChainKey) -> Result<(), ForgeError> {
    let descriptor = expected.descriptor();
    match connected {
        Some(id) if id == descriptor.chain_id => Ok(()),
        Some(id) => Err(ForgeError::WrongNetwork {
            expected: descriptor.name.to_string(),
            actual: networks::network_name(id).to_string(),
        }),
        None => Err(ForgeError::NotConnected),
    }
}

fn constructor_params(request: &EvmTokenRequest) -> Result<TokenConstructorParams, ForgeError> {
    let total_supply = to_base_units("totalSupply", &request.total_supply, request.decimals)?;
    let max_supply = match request.max_supply.as_deref() {
        Some(max) if request.is_capped => to_base_units("maxSupply", max, request.decimals)?,
        _ => U256::ZERO,
    };

    Ok(TokenConstructorParams {
        name: request.name.clone(),
        symbol: request.symbol.clone(),
        decimals: request.decimals,
        total_supply,
        max_supply,
        tax_percentage: if request.has_tax { request.tax_percentage } else { 0 },
        treasury: request
            .has_tax
            .then(|| request.treasury_wallet.trim().to_string()),
        mintable: request.is_mintable,
        burnable: request.is_burnable,
        pausable: request.is_pausable,
        capped: request.is_capped,
        tax: request.has_tax,
        blacklist: request.has_blacklist,
    })
}

/// Whole-token amount to base units, reported as a field error when the
/// amount is not a plain decimal.
fn to_base_units(field: &'static str, amount: &str, decimals: u8) -> Result<U256, ForgeError> {
    chain_eth::parse_units(amount, decimals).map_err(|e| ForgeError::field(field, e.to_string()))
}
