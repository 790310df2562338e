use async_trait::async_trait;

use crate::error::SolError;
use crate::transaction::SignedSolTransaction;

/// Something that can add the wallet owner's signature to a transaction.
///
/// Implemented by the Solana wallet context, which forwards to whichever
/// browser wallet is active. Implementations fill the signer's slot and
/// return the transaction; they must not alter the message.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// The public key whose signature slot this signer fills.
    fn public_key(&self) -> Result<[u8; 32], SolError>;

    async fn sign_transaction(
        &self,
        tx: SignedSolTransaction,
    ) -> Result<SignedSolTransaction, SolError>;
}
