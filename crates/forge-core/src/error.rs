use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("{0}")]
    UserRejected(String),

    #[error("{wallet} is not installed. Install it from {install_url}")]
    ProviderNotInstalled { wallet: String, install_url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Transaction failed: {0}")]
    Submission(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Unsupported wallet: {0}")]
    UnsupportedWallet(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("Wrong network: expected {expected}, connected to {actual}")]
    WrongNetwork { expected: String, actual: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ForgeError {
    /// Every failure leaves the process usable; the user can retry or pick
    /// another action.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Whether the user declined a wallet prompt.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ForgeError::UserRejected(_))
    }

    /// A validation failure on a single field.
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        ForgeError::Validation(ValidationErrors::single(field, message))
    }

    /// Install link to show when the wallet extension is missing.
    pub fn install_url(&self) -> Option<&str> {
        match self {
            ForgeError::ProviderNotInstalled { install_url, .. } => Some(install_url),
            _ => None,
        }
    }
}

impl From<chain_sol::SolError> for ForgeError {
    fn from(e: chain_sol::SolError) -> Self {
        use chain_sol::SolError;
        match e {
            SolError::SigningRejected(msg) => ForgeError::UserRejected(msg),
            SolError::Rpc(_) | SolError::AccountNotFound(_) => ForgeError::Network(e.to_string()),
            SolError::InvalidAddress(_) => ForgeError::field("address", e.to_string()),
            SolError::InvalidAmount(_) => ForgeError::field("amount", e.to_string()),
            other => ForgeError::Submission(other.to_string()),
        }
    }
}

impl From<chain_eth::EthError> for ForgeError {
    fn from(e: chain_eth::EthError) -> Self {
        use chain_eth::EthError;
        match e {
            EthError::InvalidAddress(_) => ForgeError::field("address", e.to_string()),
            EthError::InvalidAmount(_) => ForgeError::field("amount", e.to_string()),
            other => ForgeError::Submission(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ForgeError {
    fn from(e: std::io::Error) -> Self {
        ForgeError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(e: serde_json::Error) -> Self {
        ForgeError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_installed_carries_install_url() {
        let err = ForgeError::ProviderNotInstalled {
            wallet: "Phantom".into(),
            install_url: "https://phantom.app/download".into(),
        };
        assert_eq!(
            err.to_string(),
            "Phantom is not installed. Install it from https://phantom.app/download"
        );
        assert_eq!(err.install_url(), Some("https://phantom.app/download"));
    }

    #[test]
    fn display_user_rejected_is_the_message() {
        let err = ForgeError::UserRejected("Connection rejected by user".into());
        assert_eq!(err.to_string(), "Connection rejected by user");
        assert!(err.is_user_rejection());
    }

    #[test]
    fn display_not_connected() {
        assert_eq!(ForgeError::NotConnected.to_string(), "Wallet not connected");
    }

    #[test]
    fn display_wrong_network() {
        let err = ForgeError::WrongNetwork {
            expected: "BNB Testnet".into(),
            actual: "Ethereum Mainnet".into(),
        };
        assert_eq!(
            err.to_string(),
            "Wrong network: expected BNB Testnet, connected to Ethereum Mainnet"
        );
    }

    #[test]
    fn sol_rejection_becomes_user_rejected() {
        let err: ForgeError = chain_sol::SolError::SigningRejected("declined".into()).into();
        assert!(matches!(err, ForgeError::UserRejected(ref m) if m == "declined"));
    }

    #[test]
    fn sol_rpc_failure_keeps_message() {
        let err: ForgeError = chain_sol::SolError::Rpc("timeout".into()).into();
        assert_eq!(err.to_string(), "Network error: rpc error: timeout");
    }

    #[test]
    fn sol_expiry_is_a_submission_failure() {
        let err: ForgeError = chain_sol::SolError::BlockhashExpired("5xyz".into()).into();
        assert!(matches!(err, ForgeError::Submission(_)));
    }

    #[test]
    fn local_input_errors_are_field_errors() {
        let err: ForgeError = chain_eth::EthError::InvalidAddress("short".into()).into();
        match err {
            ForgeError::Validation(errors) => {
                assert_eq!(errors.for_field("address"), vec!["invalid address: short"]);
            }
            other => panic!("unexpected {other:?}"),
        }

        let err: ForgeError = chain_sol::SolError::InvalidAmount("-1 is negative".into()).into();
        assert!(matches!(err, ForgeError::Validation(ref e) if e.for_field("amount").len() == 1));
    }

    #[test]
    fn eth_encoding_error_is_a_submission_failure() {
        let err: ForgeError = chain_eth::EthError::EncodingError("bad word".into()).into();
        assert_eq!(err.to_string(), "Transaction failed: encoding error: bad word");
    }

    #[test]
    fn every_error_is_recoverable() {
        assert!(ForgeError::NotConnected.is_recoverable());
        assert!(ForgeError::Network("down".into()).is_recoverable());
        assert!(ForgeError::Storage("disk full".into()).is_recoverable());
    }
}
