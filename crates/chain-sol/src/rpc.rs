//! Solana JSON-RPC seam.
//!
//! [`SolanaRpc`] lists the handful of node calls the token operations need.
//! [`HttpSolanaRpc`] implements it over `reqwest`; tests substitute an
//! in-memory ledger.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::address::{address_to_bytes, bytes_to_address};
use crate::error::SolError;

/// A recent blockhash plus the last block height at which a transaction
/// referencing it can still land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: [u8; 32],
    pub last_valid_block_height: u64,
}

/// The fields of a token account the dashboard reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountInfo {
    pub mint: [u8; 32],
    pub owner: [u8; 32],
    pub amount: u64,
    pub decimals: u8,
    pub is_frozen: bool,
}

#[async_trait]
pub trait SolanaRpc: Send + Sync {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, SolError>;

    /// Whether any account exists at `address`.
    async fn account_exists(&self, address: &[u8; 32]) -> Result<bool, SolError>;

    /// Read a token account; `AccountNotFound` when it does not exist.
    async fn get_token_account(&self, address: &[u8; 32]) -> Result<TokenAccountInfo, SolError>;

    async fn get_mint_decimals(&self, mint: &[u8; 32]) -> Result<u8, SolError>;

    async fn get_minimum_balance_for_rent_exemption(&self, space: u64) -> Result<u64, SolError>;

    /// Submit a signed wire-format transaction; returns its signature.
    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<String, SolError>;

    /// Block until `signature` is confirmed or `blockhash` stops being valid.
    async fn confirm_transaction(
        &self,
        signature: &str,
        blockhash: &LatestBlockhash,
    ) -> Result<(), SolError>;
}

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const COMMITMENT: &str = "confirmed";

/// JSON-RPC client for a Solana node.
#[derive(Debug, Clone)]
pub struct HttpSolanaRpc {
    client: reqwest::Client,
    url: String,
    poll_interval: Duration,
}

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
    last_valid_block_height: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    err: Option<Value>,
    confirmation_status: Option<String>,
}

impl HttpSolanaRpc {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override how often confirmation status is polled.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, SolError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SolError::Rpc(format!("{method}: {e}")))?;

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| SolError::Rpc(format!("{method}: invalid response: {e}")))?;

        if let Some(err) = envelope.error {
            return Err(SolError::Rpc(format!(
                "{method} failed ({}): {}",
                err.code, err.message
            )));
        }
        envelope
            .result
            .ok_or_else(|| SolError::Rpc(format!("{method}: response has no result")))
    }

    async fn parsed_account_info(&self, address: &[u8; 32]) -> Result<Option<Value>, SolError> {
        let info: WithContext<Option<Value>> = self
            .call(
                "getAccountInfo",
                json!([
                    bytes_to_address(address),
                    { "encoding": "jsonParsed", "commitment": COMMITMENT }
                ]),
            )
            .await?;
        Ok(info.value)
    }

    async fn block_height(&self) -> Result<u64, SolError> {
        self.call("getBlockHeight", json!([{ "commitment": COMMITMENT }]))
            .await
    }
}

fn parsed_info<'a>(account: &'a Value, expected_type: &str) -> Result<&'a Value, SolError> {
    let parsed = &account["data"]["parsed"];
    if parsed["type"].as_str() != Some(expected_type) {
        return Err(SolError::Rpc(format!(
            "account is not a token {expected_type}"
        )));
    }
    Ok(&parsed["info"])
}

fn parse_token_account(info: &Value) -> Result<TokenAccountInfo, SolError> {
    let field = |name: &str| {
        info[name]
            .as_str()
            .ok_or_else(|| SolError::Rpc(format!("token account missing {name}")))
    };
    let amount = info["tokenAmount"]["amount"]
        .as_str()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| SolError::Rpc("token account missing amount".into()))?;
    let decimals = info["tokenAmount"]["decimals"]
        .as_u64()
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| SolError::Rpc("token account missing decimals".into()))?;

    Ok(TokenAccountInfo {
        mint: address_to_bytes(field("mint")?)?,
        owner: address_to_bytes(field("owner")?)?,
        amount,
        decimals,
        is_frozen: info["state"].as_str() == Some("frozen"),
    })
}

#[async_trait]
impl SolanaRpc for HttpSolanaRpc {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, SolError> {
        let latest: WithContext<BlockhashValue> = self
            .call("getLatestBlockhash", json!([{ "commitment": COMMITMENT }]))
            .await?;
        Ok(LatestBlockhash {
            blockhash: address_to_bytes(&latest.value.blockhash)?,
            last_valid_block_height: latest.value.last_valid_block_height,
        })
    }

    async fn account_exists(&self, address: &[u8; 32]) -> Result<bool, SolError> {
        Ok(self.parsed_account_info(address).await?.is_some())
    }

    async fn get_token_account(&self, address: &[u8; 32]) -> Result<TokenAccountInfo, SolError> {
        let account = self
            .parsed_account_info(address)
            .await?
            .ok_or_else(|| SolError::AccountNotFound(bytes_to_address(address)))?;
        parse_token_account(parsed_info(&account, "account")?)
    }

    async fn get_mint_decimals(&self, mint: &[u8; 32]) -> Result<u8, SolError> {
        let account = self
            .parsed_account_info(mint)
            .await?
            .ok_or_else(|| SolError::AccountNotFound(bytes_to_address(mint)))?;
        parsed_info(&account, "mint")?["decimals"]
            .as_u64()
            .and_then(|d| u8::try_from(d).ok())
            .ok_or_else(|| SolError::Rpc("mint missing decimals".into()))
    }

    async fn get_minimum_balance_for_rent_exemption(&self, space: u64) -> Result<u64, SolError> {
        self.call("getMinimumBalanceForRentExemption", json!([space]))
            .await
    }

    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<String, SolError> {
        let encoded = bs58::encode(wire).into_string();
        let signature: String = self
            .call(
                "sendTransaction",
                json!([encoded, { "encoding": "base58", "preflightCommitment": COMMITMENT }]),
            )
            .await?;
        debug!(%signature, "transaction submitted");
        Ok(signature)
    }

    async fn confirm_transaction(
        &self,
        signature: &str,
        blockhash: &LatestBlockhash,
    ) -> Result<(), SolError> {
        loop {
            let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
                .call("getSignatureStatuses", json!([[signature]]))
                .await?;

            if let Some(Some(status)) = statuses.value.into_iter().next() {
                if let Some(err) = status.err {
                    return Err(SolError::TransactionFailed(err.to_string()));
                }
                if matches!(
                    status.confirmation_status.as_deref(),
                    Some("confirmed") | Some("finalized")
                ) {
                    debug!(%signature, "transaction confirmed");
                    return Ok(());
                }
            }

            if self.block_height().await? > blockhash.last_valid_block_height {
                return Err(SolError::BlockhashExpired(signature.to_string()));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_account_json(state: &str) -> Value {
        json!({
            "data": {
                "program": "spl-token",
                "parsed": {
                    "type": "account",
                    "info": {
                        "isNative": false,
                        "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                        "owner": "11111111111111111111111111111111",
                        "state": state,
                        "tokenAmount": {
                            "amount": "2500000",
                            "decimals": 6,
                            "uiAmount": 2.5,
                            "uiAmountString": "2.5"
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn parses_initialized_token_account() {
        let account = token_account_json("initialized");
        let info = parse_token_account(parsed_info(&account, "account").unwrap()).unwrap();
        assert_eq!(info.amount, 2_500_000);
        assert_eq!(info.decimals, 6);
        assert_eq!(info.owner, [0u8; 32]);
        assert!(!info.is_frozen);
    }

    #[test]
    fn parses_frozen_state() {
        let account = token_account_json("frozen");
        let info = parse_token_account(parsed_info(&account, "account").unwrap()).unwrap();
        assert!(info.is_frozen);
    }

    #[test]
    fn mint_is_not_a_token_account() {
        let account = json!({
            "data": { "parsed": { "type": "mint", "info": { "decimals": 9 } } }
        });
        assert!(parsed_info(&account, "account").is_err());
        assert_eq!(parsed_info(&account, "mint").unwrap()["decimals"], 9);
    }

    #[test]
    fn envelope_with_error_body() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32002,"message":"blockhash not found"}}"#;
        let env: RpcEnvelope<String> = serde_json::from_str(raw).unwrap();
        assert!(env.result.is_none());
        let err = env.error.unwrap();
        assert_eq!(err.code, -32002);
        assert_eq!(err.message, "blockhash not found");
    }

    #[test]
    fn signature_status_deserializes() {
        let raw = r#"{"slot":1,"confirmations":null,"err":null,"confirmationStatus":"finalized"}"#;
        let status: SignatureStatus = serde_json::from_str(raw).unwrap();
        assert!(status.err.is_none());
        assert_eq!(status.confirmation_status.as_deref(), Some("finalized"));
    }

    #[test]
    fn client_keeps_url_and_poll_interval() {
        let rpc = HttpSolanaRpc::new("https://api.devnet.solana.com")
            .with_poll_interval(Duration::from_millis(50));
        assert_eq!(rpc.url(), "https://api.devnet.solana.com");
        assert_eq!(rpc.poll_interval, Duration::from_millis(50));
    }
}
