//! SPL token management operations.
//!
//! Every operation follows the same protocol:
//!
//! 1. resolve the token accounts involved, prepending an associated token
//!    account creation when a destination does not exist yet;
//! 2. build the instruction(s) with the amount converted to base units;
//! 3. attach a recent blockhash with the wallet as fee payer;
//! 4. ask the caller's [`TransactionSigner`] for a signature;
//! 5. submit, then wait for confirmation within the blockhash's validity
//!    window;
//! 6. return the transaction signature.
//!
//! Failures from the RPC or the signer are returned as-is. Nothing here
//! retries, and nothing splits a batch that is too large for one
//! transaction.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::address::{address_to_bytes, bytes_to_address};
use crate::amount::{base_units_to_ui_amount, ui_amount_to_base_units};
use crate::error::SolError;
use crate::rpc::SolanaRpc;
use crate::signer::TransactionSigner;
use crate::spl_token::{
    build_burn, build_create_associated_token_account, build_freeze_account,
    build_initialize_mint, build_mint_to, build_set_authority, build_thaw_account,
    build_transfer, derive_associated_token_address, AuthorityKind, MINT_ACCOUNT_LEN,
    TOKEN_PROGRAM_ID,
};
use crate::transaction::{
    build_create_account_instruction, compile_transaction, SignedSolTransaction, SolInstruction,
};

/// One multisend destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    pub amount: f64,
}

/// Parameters for creating a new SPL mint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMintParams {
    pub decimals: u8,
    /// Initial supply in base units, minted to the payer. `0` mints nothing.
    pub initial_supply_units: u64,
    /// Keep the payer as mint authority; otherwise it is revoked after the
    /// initial mint.
    pub mint_authority: bool,
    /// Set the payer as freeze authority.
    pub freeze_authority: bool,
}

/// Result of [`create_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedMint {
    pub mint_address: String,
    pub signature: String,
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

async fn sign_and_submit(
    rpc: &dyn SolanaRpc,
    signer: &dyn TransactionSigner,
    payer: &[u8; 32],
    instructions: &[SolInstruction],
    local_signer: Option<&SigningKey>,
    operation: &str,
) -> Result<String, SolError> {
    let latest = rpc.get_latest_blockhash().await?;
    let message = compile_transaction(instructions, payer, &latest.blockhash)?;

    let mut tx = SignedSolTransaction::new(message);
    if let Some(key) = local_signer {
        tx.sign_with(key)?;
    }

    debug!(operation, instructions = instructions.len(), "requesting wallet signature");
    let signed = signer.sign_transaction(tx).await?;
    if !signed.is_fully_signed() {
        return Err(SolError::SigningError(
            "wallet returned a transaction with missing signatures".into(),
        ));
    }

    let signature = rpc.send_raw_transaction(&signed.to_wire()).await?;
    info!(operation, %signature, "transaction sent");

    rpc.confirm_transaction(&signature, &latest).await?;
    info!(operation, %signature, "transaction confirmed");

    Ok(signature)
}

/// Returns the associated token account for `owner`, plus a creation
/// instruction when the account does not exist on chain yet.
async fn resolve_destination(
    rpc: &dyn SolanaRpc,
    payer: &[u8; 32],
    owner: &[u8; 32],
    mint: &[u8; 32],
) -> Result<([u8; 32], Option<SolInstruction>), SolError> {
    let ata = derive_associated_token_address(owner, mint)?;
    if rpc.account_exists(&ata).await? {
        return Ok((ata, None));
    }
    debug!(owner = %bytes_to_address(owner), "destination token account missing, creating it");
    Ok((
        ata,
        Some(build_create_associated_token_account(payer, &ata, owner, mint)),
    ))
}

// ---------------------------------------------------------------------------
// Instruction planning
// ---------------------------------------------------------------------------

/// Instructions for minting `amount` whole tokens to `destination_owner`'s
/// associated token account.
pub async fn mint_instructions(
    rpc: &dyn SolanaRpc,
    payer: &[u8; 32],
    mint: &[u8; 32],
    destination_owner: &[u8; 32],
    amount: f64,
    decimals: u8,
) -> Result<Vec<SolInstruction>, SolError> {
    let units = ui_amount_to_base_units(amount, decimals)?;
    let (destination, create) = resolve_destination(rpc, payer, destination_owner, mint).await?;

    let mut instructions: Vec<SolInstruction> = create.into_iter().collect();
    instructions.push(build_mint_to(mint, &destination, payer, units)?);
    Ok(instructions)
}

/// Instructions for a multisend: one transfer per recipient, each preceded
/// by an account creation when the recipient has no token account.
pub async fn multisend_instructions(
    rpc: &dyn SolanaRpc,
    payer: &[u8; 32],
    mint: &[u8; 32],
    recipients: &[Recipient],
    decimals: u8,
) -> Result<Vec<SolInstruction>, SolError> {
    if recipients.is_empty() {
        return Err(SolError::TransactionBuildError("no recipients".into()));
    }

    let source = derive_associated_token_address(payer, mint)?;
    let mut created: Vec<[u8; 32]> = Vec::new();
    let mut instructions = Vec::with_capacity(recipients.len() * 2);

    for recipient in recipients {
        let owner = address_to_bytes(&recipient.address)?;
        let units = ui_amount_to_base_units(recipient.amount, decimals)?;

        let (destination, create) = resolve_destination(rpc, payer, &owner, mint).await?;
        if let Some(create) = create {
            // A repeated recipient only needs its account created once.
            if !created.contains(&destination) {
                created.push(destination);
                instructions.push(create);
            }
        }
        instructions.push(build_transfer(&source, &destination, payer, units)?);
    }

    Ok(instructions)
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Mint `amount` tokens to `destination` (a wallet address). The connected
/// wallet must be the mint authority.
pub async fn mint_tokens(
    rpc: &dyn SolanaRpc,
    signer: &dyn TransactionSigner,
    mint_address: &str,
    destination: &str,
    amount: f64,
    decimals: u8,
) -> Result<String, SolError> {
    let payer = signer.public_key()?;
    let mint = address_to_bytes(mint_address)?;
    let owner = address_to_bytes(destination)?;

    let instructions = mint_instructions(rpc, &payer, &mint, &owner, amount, decimals).await?;
    sign_and_submit(rpc, signer, &payer, &instructions, None, "mint").await
}

/// Burn `amount` tokens from the connected wallet's own token account.
pub async fn burn_tokens(
    rpc: &dyn SolanaRpc,
    signer: &dyn TransactionSigner,
    mint_address: &str,
    amount: f64,
    decimals: u8,
) -> Result<String, SolError> {
    let payer = signer.public_key()?;
    let mint = address_to_bytes(mint_address)?;
    let units = ui_amount_to_base_units(amount, decimals)?;
    let token_account = derive_associated_token_address(&payer, &mint)?;

    let instruction = build_burn(&token_account, &mint, &payer, units)?;
    sign_and_submit(rpc, signer, &payer, &[instruction], None, "burn").await
}

/// Freeze a token account. The connected wallet must be the freeze authority.
pub async fn freeze_account(
    rpc: &dyn SolanaRpc,
    signer: &dyn TransactionSigner,
    mint_address: &str,
    token_account: &str,
) -> Result<String, SolError> {
    let payer = signer.public_key()?;
    let mint = address_to_bytes(mint_address)?;
    let account = address_to_bytes(token_account)?;

    let instruction = build_freeze_account(&account, &mint, &payer);
    sign_and_submit(rpc, signer, &payer, &[instruction], None, "freeze").await
}

/// Thaw a previously frozen token account.
pub async fn unfreeze_account(
    rpc: &dyn SolanaRpc,
    signer: &dyn TransactionSigner,
    mint_address: &str,
    token_account: &str,
) -> Result<String, SolError> {
    let payer = signer.public_key()?;
    let mint = address_to_bytes(mint_address)?;
    let account = address_to_bytes(token_account)?;

    let instruction = build_thaw_account(&account, &mint, &payer);
    sign_and_submit(rpc, signer, &payer, &[instruction], None, "unfreeze").await
}

/// Hand the mint or freeze authority of `mint_address` to `new_authority`.
pub async fn transfer_authority(
    rpc: &dyn SolanaRpc,
    signer: &dyn TransactionSigner,
    mint_address: &str,
    kind: AuthorityKind,
    new_authority: &str,
) -> Result<String, SolError> {
    let payer = signer.public_key()?;
    let mint = address_to_bytes(mint_address)?;
    let new_authority = address_to_bytes(new_authority)?;

    let instruction = build_set_authority(&mint, &payer, kind, Some(&new_authority));
    debug!(
        authority = kind.label(),
        to = %bytes_to_address(&new_authority),
        "transferring authority"
    );
    sign_and_submit(rpc, signer, &payer, &[instruction], None, "transfer-authority").await
}

/// Send tokens to several recipients in a single transaction.
///
/// The caller keeps the recipient list small enough to fit in one
/// transaction.
pub async fn multisend(
    rpc: &dyn SolanaRpc,
    signer: &dyn TransactionSigner,
    mint_address: &str,
    recipients: &[Recipient],
    decimals: u8,
) -> Result<String, SolError> {
    let payer = signer.public_key()?;
    let mint = address_to_bytes(mint_address)?;

    let instructions = multisend_instructions(rpc, &payer, &mint, recipients, decimals).await?;
    sign_and_submit(rpc, signer, &payer, &instructions, None, "multisend").await
}

/// Create a new mint owned by the connected wallet, optionally minting an
/// initial supply to the wallet and revoking the mint authority afterwards.
pub async fn create_token(
    rpc: &dyn SolanaRpc,
    signer: &dyn TransactionSigner,
    params: &NewMintParams,
) -> Result<CreatedMint, SolError> {
    let payer = signer.public_key()?;
    let supply_units = params.initial_supply_units;

    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    let mint_key = SigningKey::from_bytes(&seed);
    seed.zeroize();
    let mint = mint_key.verifying_key().to_bytes();

    let rent = rpc
        .get_minimum_balance_for_rent_exemption(MINT_ACCOUNT_LEN)
        .await?;

    let freeze_authority = params.freeze_authority.then_some(&payer);
    let mut instructions = vec![
        build_create_account_instruction(&payer, &mint, rent, MINT_ACCOUNT_LEN, &TOKEN_PROGRAM_ID),
        build_initialize_mint(&mint, params.decimals, &payer, freeze_authority),
    ];

    if supply_units > 0 {
        let ata = derive_associated_token_address(&payer, &mint)?;
        instructions.push(build_create_associated_token_account(&payer, &ata, &payer, &mint));
        instructions.push(build_mint_to(&mint, &ata, &payer, supply_units)?);
    }

    if !params.mint_authority {
        instructions.push(build_set_authority(&mint, &payer, AuthorityKind::Mint, None));
    }

    let signature =
        sign_and_submit(rpc, signer, &payer, &instructions, Some(&mint_key), "create-token")
            .await?;

    Ok(CreatedMint {
        mint_address: bytes_to_address(&mint),
        signature,
    })
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Balance of `owner`'s associated token account in whole tokens. Any
/// failure (missing account, RPC error) reads as zero.
pub async fn get_token_balance(rpc: &dyn SolanaRpc, mint_address: &str, owner: &str) -> f64 {
    let lookup = async {
        let mint = address_to_bytes(mint_address)?;
        let owner = address_to_bytes(owner)?;
        let ata = derive_associated_token_address(&owner, &mint)?;
        let account = rpc.get_token_account(&ata).await?;
        let decimals = rpc.get_mint_decimals(&mint).await?;
        Ok::<f64, SolError>(base_units_to_ui_amount(account.amount, decimals))
    };

    match lookup.await {
        Ok(balance) => balance,
        Err(e) => {
            debug!(error = %e, "token balance lookup failed, reporting zero");
            0.0
        }
    }
}

/// Whether `token_account` is frozen. Unreadable accounts read as not frozen.
pub async fn is_account_frozen(rpc: &dyn SolanaRpc, token_account: &str) -> bool {
    let account = match address_to_bytes(token_account) {
        Ok(account) => account,
        Err(e) => {
            warn!(error = %e, "invalid token account address");
            return false;
        }
    };
    match rpc.get_token_account(&account).await {
        Ok(info) => info.is_frozen,
        Err(e) => {
            debug!(error = %e, "frozen-state lookup failed, reporting not frozen");
            false
        }
    }
}
