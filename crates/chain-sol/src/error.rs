use thiserror::Error;

/// Solana chain operation errors.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("signing rejected: {0}")]
    SigningRejected(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("blockhash expired before confirmation of {0}")]
    BlockhashExpired(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = SolError::InvalidAddress("bad decode".into());
        assert_eq!(err.to_string(), "invalid address: bad decode");
    }

    #[test]
    fn display_invalid_amount() {
        let err = SolError::InvalidAmount("negative".into());
        assert_eq!(err.to_string(), "invalid amount: negative");
    }

    #[test]
    fn display_signing_rejected() {
        let err = SolError::SigningRejected("user closed popup".into());
        assert_eq!(err.to_string(), "signing rejected: user closed popup");
    }

    #[test]
    fn display_blockhash_expired() {
        let err = SolError::BlockhashExpired("5xyz".into());
        assert_eq!(
            err.to_string(),
            "blockhash expired before confirmation of 5xyz"
        );
    }

    #[test]
    fn display_rpc_error() {
        let err = SolError::Rpc("connection refused".into());
        assert_eq!(err.to_string(), "rpc error: connection refused");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(SolError::TransactionFailed("InstructionError".into()));
        assert!(err.to_string().contains("InstructionError"));
    }
}
