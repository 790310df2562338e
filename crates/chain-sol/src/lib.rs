//! Solana chain support for the token dashboard.
//!
//! Builds SPL token instructions and the compact transaction wire format by
//! hand, using `ed25519-dalek` for the one key this crate ever holds (a
//! freshly generated mint account) and `bs58` for addresses. The wallet
//! owner's signature always comes from a [`TransactionSigner`] supplied by
//! the caller.

pub mod address;
pub mod amount;
pub mod error;
pub mod rpc;
pub mod signer;
pub mod spl_token;
pub mod token_ops;
pub mod transaction;

pub use address::{address_to_bytes, bytes_to_address, is_valid_address, short_address};
pub use amount::{base_units_to_ui_amount, parse_ui_amount, ui_amount_to_base_units};
pub use error::SolError;
pub use rpc::{HttpSolanaRpc, LatestBlockhash, SolanaRpc, TokenAccountInfo};
pub use signer::TransactionSigner;
pub use spl_token::{
    derive_associated_token_address, AuthorityKind, ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
pub use token_ops::{
    burn_tokens, create_token, freeze_account, get_token_balance, is_account_frozen,
    mint_tokens, multisend, transfer_authority, unfreeze_account, CreatedMint, NewMintParams,
    Recipient,
};
pub use transaction::{
    compile_transaction, SignedSolTransaction, SolAccountMeta, SolInstruction, SolTransaction,
    SYSTEM_PROGRAM_ID,
};
