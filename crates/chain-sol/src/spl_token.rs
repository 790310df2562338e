//! SPL Token program instructions and associated token account derivation.
//!
//! Built by hand against the token program's stable instruction layout
//! rather than through the `spl-token` crate. Every builder returns a plain
//! [`SolInstruction`]; sequencing them into a transaction is the job of
//! [`crate::token_ops`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SolError;
use crate::transaction::{SolAccountMeta, SolInstruction, SYSTEM_PROGRAM_ID};

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: [u8; 32] = [
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
];

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: [u8; 32] = [
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
];

/// Size in bytes of a mint account.
pub const MINT_ACCOUNT_LEN: u64 = 82;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

// Token program instruction tags.
const IX_SET_AUTHORITY: u8 = 6;
const IX_TRANSFER: u8 = 3;
const IX_MINT_TO: u8 = 7;
const IX_BURN: u8 = 8;
const IX_FREEZE_ACCOUNT: u8 = 10;
const IX_THAW_ACCOUNT: u8 = 11;
const IX_INITIALIZE_MINT2: u8 = 20;

/// Which authority a `SetAuthority` instruction changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorityKind {
    /// Permission to mint new supply.
    Mint,
    /// Permission to freeze and thaw token accounts.
    Freeze,
}

impl AuthorityKind {
    /// The token program's `AuthorityType` discriminant.
    pub fn program_tag(self) -> u8 {
        match self {
            AuthorityKind::Mint => 0,
            AuthorityKind::Freeze => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthorityKind::Mint => "mint",
            AuthorityKind::Freeze => "freeze",
        }
    }
}

// ---------------------------------------------------------------------------
// Instruction builders
// ---------------------------------------------------------------------------

fn tagged_amount(tag: u8, amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(9);
    data.push(tag);
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

/// `COption<Pubkey>` packing used by the token program: tag byte, then the
/// key only when present.
fn push_optional_pubkey(data: &mut Vec<u8>, key: Option<&[u8; 32]>) {
    match key {
        Some(key) => {
            data.push(1);
            data.extend_from_slice(key);
        }
        None => data.push(0),
    }
}

fn require_amount(amount: u64, what: &str) -> Result<(), SolError> {
    if amount == 0 {
        return Err(SolError::TransactionBuildError(format!(
            "{what} amount must be > 0"
        )));
    }
    Ok(())
}

/// Build an SPL Token `Transfer` instruction.
///
/// `amount` is in base units (for 6 decimals, `1_000_000` is one token).
pub fn build_transfer(
    from_token_account: &[u8; 32],
    to_token_account: &[u8; 32],
    owner: &[u8; 32],
    amount: u64,
) -> Result<SolInstruction, SolError> {
    require_amount(amount, "transfer")?;

    Ok(SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*from_token_account, false),
            SolAccountMeta::writable(*to_token_account, false),
            SolAccountMeta::readonly(*owner, true),
        ],
        data: tagged_amount(IX_TRANSFER, amount),
    })
}

/// Build a `MintTo` instruction. The mint authority signs.
pub fn build_mint_to(
    mint: &[u8; 32],
    destination_token_account: &[u8; 32],
    mint_authority: &[u8; 32],
    amount: u64,
) -> Result<SolInstruction, SolError> {
    require_amount(amount, "mint")?;

    Ok(SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*mint, false),
            SolAccountMeta::writable(*destination_token_account, false),
            SolAccountMeta::readonly(*mint_authority, true),
        ],
        data: tagged_amount(IX_MINT_TO, amount),
    })
}

/// Build a `Burn` instruction. The token account owner signs.
pub fn build_burn(
    token_account: &[u8; 32],
    mint: &[u8; 32],
    owner: &[u8; 32],
    amount: u64,
) -> Result<SolInstruction, SolError> {
    require_amount(amount, "burn")?;

    Ok(SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*token_account, false),
            SolAccountMeta::writable(*mint, false),
            SolAccountMeta::readonly(*owner, true),
        ],
        data: tagged_amount(IX_BURN, amount),
    })
}

fn freeze_or_thaw(
    tag: u8,
    token_account: &[u8; 32],
    mint: &[u8; 32],
    freeze_authority: &[u8; 32],
) -> SolInstruction {
    SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*token_account, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::readonly(*freeze_authority, true),
        ],
        data: vec![tag],
    }
}

/// Build a `FreezeAccount` instruction. The mint's freeze authority signs.
pub fn build_freeze_account(
    token_account: &[u8; 32],
    mint: &[u8; 32],
    freeze_authority: &[u8; 32],
) -> SolInstruction {
    freeze_or_thaw(IX_FREEZE_ACCOUNT, token_account, mint, freeze_authority)
}

/// Build a `ThawAccount` instruction (the inverse of freeze).
pub fn build_thaw_account(
    token_account: &[u8; 32],
    mint: &[u8; 32],
    freeze_authority: &[u8; 32],
) -> SolInstruction {
    freeze_or_thaw(IX_THAW_ACCOUNT, token_account, mint, freeze_authority)
}

/// Build a `SetAuthority` instruction on a mint.
///
/// `new_authority = None` revokes the authority permanently.
pub fn build_set_authority(
    mint: &[u8; 32],
    current_authority: &[u8; 32],
    kind: AuthorityKind,
    new_authority: Option<&[u8; 32]>,
) -> SolInstruction {
    let mut data = Vec::with_capacity(35);
    data.push(IX_SET_AUTHORITY);
    data.push(kind.program_tag());
    push_optional_pubkey(&mut data, new_authority);

    SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*mint, false),
            SolAccountMeta::readonly(*current_authority, true),
        ],
        data,
    }
}

/// Build an `InitializeMint2` instruction (no rent sysvar account needed).
pub fn build_initialize_mint(
    mint: &[u8; 32],
    decimals: u8,
    mint_authority: &[u8; 32],
    freeze_authority: Option<&[u8; 32]>,
) -> SolInstruction {
    let mut data = Vec::with_capacity(67);
    data.push(IX_INITIALIZE_MINT2);
    data.push(decimals);
    data.extend_from_slice(mint_authority);
    push_optional_pubkey(&mut data, freeze_authority);

    SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![SolAccountMeta::writable(*mint, false)],
        data,
    }
}

/// Build the Associated Token Account program's `Create` instruction.
///
/// `payer` funds the new account; `associated_account` must be the address
/// returned by [`derive_associated_token_address`] for `owner` and `mint`.
pub fn build_create_associated_token_account(
    payer: &[u8; 32],
    associated_account: &[u8; 32],
    owner: &[u8; 32],
    mint: &[u8; 32],
) -> SolInstruction {
    SolInstruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::writable(*associated_account, false),
            SolAccountMeta::readonly(*owner, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Associated Token Account (PDA) derivation
// ---------------------------------------------------------------------------

/// Derive the associated token account address for a wallet + mint pair.
///
/// The ATA is a Program Derived Address with seeds
/// `[wallet, token_program_id, mint]` under the Associated Token Account
/// program. The bump search runs from 255 down to 0 and stops at the first
/// hash that is NOT on the Ed25519 curve.
pub fn derive_associated_token_address(
    wallet: &[u8; 32],
    mint: &[u8; 32],
) -> Result<[u8; 32], SolError> {
    find_program_address(
        &[wallet.as_ref(), &TOKEN_PROGRAM_ID, mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), SolError> {
    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            return Ok((address, bump));
        }
    }

    Err(SolError::InvalidAddress(
        "could not find valid PDA bump seed".into(),
    ))
}

fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &[u8; 32],
) -> Option<[u8; 32]> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }
    Some(hash)
}

fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}
