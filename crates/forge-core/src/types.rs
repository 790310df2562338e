use chain_sol::SolError;
use serde::{Deserialize, Serialize};

use crate::networks::{ChainFamily, ChainKey};

fn default_evm_decimals() -> u8 {
    18
}

fn default_solana_decimals() -> u8 {
    9
}

fn default_tax_percentage() -> u8 {
    5
}

fn enabled() -> bool {
    true
}

/// Form data for an EVM feature token.
///
/// Supplies are decimal strings in whole-token units, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmTokenRequest {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_evm_decimals")]
    pub decimals: u8,
    pub total_supply: String,
    #[serde(rename = "chainId")]
    pub chain: ChainKey,

    #[serde(default = "enabled")]
    pub is_mintable: bool,
    #[serde(default = "enabled")]
    pub is_burnable: bool,
    #[serde(default = "enabled")]
    pub is_pausable: bool,
    #[serde(default)]
    pub is_capped: bool,
    #[serde(default)]
    pub has_tax: bool,
    #[serde(default)]
    pub has_blacklist: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_supply: Option<String>,
    #[serde(default = "default_tax_percentage")]
    pub tax_percentage: u8,
    #[serde(default)]
    pub treasury_wallet: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EvmTokenRequest {
    /// A request with the form's default feature set.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        total_supply: impl Into<String>,
        chain: ChainKey,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: default_evm_decimals(),
            total_supply: total_supply.into(),
            chain,
            is_mintable: true,
            is_burnable: true,
            is_pausable: true,
            is_capped: false,
            has_tax: false,
            has_blacklist: false,
            max_supply: None,
            tax_percentage: default_tax_percentage(),
            treasury_wallet: String::new(),
            logo_url: None,
            description: None,
        }
    }
}

/// Form data for an SPL token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaTokenRequest {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_solana_decimals")]
    pub decimals: u8,
    /// Empty or "0" means no initial supply.
    #[serde(default)]
    pub total_supply: String,
    #[serde(rename = "chainId")]
    pub chain: ChainKey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(default = "enabled")]
    pub enable_mint_authority: bool,
    #[serde(default = "enabled")]
    pub enable_freeze_authority: bool,
    #[serde(default = "enabled")]
    pub enable_update_authority: bool,
}

impl SolanaTokenRequest {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        total_supply: impl Into<String>,
        chain: ChainKey,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: default_solana_decimals(),
            total_supply: total_supply.into(),
            chain,
            description: None,
            website: None,
            twitter: None,
            telegram: None,
            logo_url: None,
            enable_mint_authority: true,
            enable_freeze_authority: true,
            enable_update_authority: true,
        }
    }

    /// Initial supply in base units, scaled on the typed decimal string.
    /// Empty and "0" both mean none.
    pub fn initial_supply_units(&self) -> Result<u64, SolError> {
        let total = self.total_supply.trim();
        if total.is_empty() {
            return Ok(0);
        }
        chain_sol::parse_ui_amount(total, self.decimals)
    }

    /// `"mintable"` when the mint authority is kept, `"standard"` otherwise.
    pub fn token_type(&self) -> &'static str {
        if self.enable_mint_authority {
            "mintable"
        } else {
            "standard"
        }
    }
}

/// A token creation form of either family, tagged by `blockchainType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "blockchainType")]
pub enum TokenCreationRequest {
    #[serde(rename = "EVM")]
    Evm(EvmTokenRequest),
    Solana(SolanaTokenRequest),
}

impl TokenCreationRequest {
    pub fn chain(&self) -> ChainKey {
        match self {
            TokenCreationRequest::Evm(req) => req.chain,
            TokenCreationRequest::Solana(req) => req.chain,
        }
    }

    pub fn family(&self) -> ChainFamily {
        match self {
            TokenCreationRequest::Evm(_) => ChainFamily::Evm,
            TokenCreationRequest::Solana(_) => ChainFamily::Solana,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TokenCreationRequest::Evm(req) => &req.name,
            TokenCreationRequest::Solana(req) => &req.name,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            TokenCreationRequest::Evm(req) => &req.symbol,
            TokenCreationRequest::Solana(req) => &req.symbol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evm_request_defaults_from_minimal_json() {
        let req: EvmTokenRequest = serde_json::from_str(
            r#"{"name":"Forge","symbol":"FRG","totalSupply":"1000","chainId":"bsc-testnet"}"#,
        )
        .unwrap();

        assert_eq!(req.decimals, 18);
        assert_eq!(req.chain, ChainKey::BscTestnet);
        assert!(req.is_mintable && req.is_burnable && req.is_pausable);
        assert!(!req.is_capped && !req.has_tax && !req.has_blacklist);
        assert_eq!(req.tax_percentage, 5);
        assert!(req.treasury_wallet.is_empty());
        assert_eq!(req, EvmTokenRequest::new("Forge", "FRG", "1000", ChainKey::BscTestnet));
    }

    #[test]
    fn solana_request_defaults() {
        let req: SolanaTokenRequest = serde_json::from_str(
            r#"{"name":"Forge","symbol":"FRG","chainId":"solana-testnet"}"#,
        )
        .unwrap();

        assert_eq!(req.decimals, 9);
        assert!(req.total_supply.is_empty());
        assert!(req.enable_mint_authority && req.enable_freeze_authority);
        assert_eq!(req.initial_supply_units().unwrap(), 0);
    }

    #[test]
    fn initial_supply_scales_decimal_string() {
        let req = SolanaTokenRequest::new("A", "A", " 1000.5 ", ChainKey::SolanaDevnet);
        assert_eq!(req.initial_supply_units().unwrap(), 1_000_500_000_000);
    }

    #[test]
    fn initial_supply_keeps_integers_beyond_f64_precision() {
        let mut req = SolanaTokenRequest::new("A", "A", "9007199254740993", ChainKey::SolanaDevnet);
        req.decimals = 0;
        assert_eq!(req.initial_supply_units().unwrap(), 9_007_199_254_740_993);
    }

    #[test]
    fn token_type_follows_mint_authority() {
        let mut req = SolanaTokenRequest::new("A", "A", "0", ChainKey::SolanaDevnet);
        assert_eq!(req.token_type(), "mintable");
        req.enable_mint_authority = false;
        assert_eq!(req.token_type(), "standard");
    }

    #[test]
    fn creation_request_tagged_by_blockchain_type() {
        let json = r#"{"blockchainType":"EVM","name":"Forge","symbol":"FRG",
            "totalSupply":"1","chainId":"ethereum-testnet","hasTax":true}"#;
        let req: TokenCreationRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.family(), ChainFamily::Evm);
        assert_eq!(req.chain(), ChainKey::EthereumTestnet);
        match req {
            TokenCreationRequest::Evm(evm) => assert!(evm.has_tax),
            TokenCreationRequest::Solana(_) => panic!("expected EVM variant"),
        }
    }

    #[test]
    fn solana_variant_serializes_tag() {
        let req = TokenCreationRequest::Solana(SolanaTokenRequest::new(
            "Forge",
            "FRG",
            "0",
            ChainKey::SolanaMainnet,
        ));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["blockchainType"], "Solana");
        assert_eq!(value["chainId"], "solana-mainnet");
        assert_eq!(req.symbol(), "FRG");
    }

    #[test]
    fn unknown_blockchain_type_rejected() {
        let json = r#"{"blockchainType":"Bitcoin","name":"x","symbol":"x","chainId":"bsc-mainnet"}"#;
        assert!(serde_json::from_str::<TokenCreationRequest>(json).is_err());
    }
}
