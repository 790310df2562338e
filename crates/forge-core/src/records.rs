use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ForgeError;
use crate::networks::ChainKey;
use crate::types::TokenCreationRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Pending,
    Deployed,
    Failed,
}

/// A token this dashboard has deployed, or tried to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedToken {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
    #[serde(rename = "chainId")]
    pub chain: ChainKey,
    /// Contract address on EVM, mint address on Solana.
    pub contract_address: Option<String>,
    pub deployer_address: String,
    pub transaction_hash: Option<String>,
    pub status: TokenStatus,

    // EVM features
    pub is_mintable: bool,
    pub is_burnable: bool,
    pub is_pausable: bool,
    pub is_capped: bool,
    pub has_tax: bool,
    pub has_blacklist: bool,
    pub max_supply: Option<String>,
    pub tax_percentage: Option<u8>,
    pub treasury_wallet: Option<String>,

    // Solana
    pub token_type: Option<String>,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    /// Metadata update authority. Mint creation writes no metadata
    /// account, so deployments record none.
    pub update_authority: Option<String>,

    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deployed_at: Option<DateTime<Utc>>,
}

impl DeployedToken {
    fn pending(request: &TokenCreationRequest, deployer: &str) -> Self {
        let mut record = DeployedToken {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name().to_string(),
            symbol: request.symbol().to_string(),
            decimals: 0,
            total_supply: String::new(),
            chain: request.chain(),
            contract_address: None,
            deployer_address: deployer.to_string(),
            transaction_hash: None,
            status: TokenStatus::Pending,
            is_mintable: false,
            is_burnable: false,
            is_pausable: false,
            is_capped: false,
            has_tax: false,
            has_blacklist: false,
            max_supply: None,
            tax_percentage: None,
            treasury_wallet: None,
            token_type: None,
            mint_authority: None,
            freeze_authority: None,
            update_authority: None,
            logo_url: None,
            description: None,
            created_at: Utc::now(),
            deployed_at: None,
        };

        match request {
            TokenCreationRequest::Evm(req) => {
                record.decimals = req.decimals;
                record.total_supply = req.total_supply.trim().to_string();
                record.is_mintable = req.is_mintable;
                record.is_burnable = req.is_burnable;
                record.is_pausable = req.is_pausable;
                record.is_capped = req.is_capped;
                record.has_tax = req.has_tax;
                record.has_blacklist = req.has_blacklist;
                record.max_supply = req.max_supply.clone().filter(|_| req.is_capped);
                record.tax_percentage = req.has_tax.then_some(req.tax_percentage);
                record.treasury_wallet = req
                    .has_tax
                    .then(|| req.treasury_wallet.trim().to_string());
                record.logo_url = req.logo_url.clone();
                record.description = req.description.clone();
            }
            TokenCreationRequest::Solana(req) => {
                let authority = |enabled: bool| enabled.then(|| deployer.to_string());
                record.decimals = req.decimals;
                record.total_supply = req.total_supply.trim().to_string();
                record.is_mintable = req.enable_mint_authority;
                record.token_type = Some(req.token_type().to_string());
                record.mint_authority = authority(req.enable_mint_authority);
                record.freeze_authority = authority(req.enable_freeze_authority);
                record.logo_url = req.logo_url.clone();
                record.description = req.description.clone();
            }
        }
        record
    }
}

/// Deployment history, keyed by record id.
///
/// Records are only ever added or updated; nothing in the deploy flow
/// removes one.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TokenRecordStore {
    tokens: HashMap<String, DeployedToken>,
}

impl TokenRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a pending record for `request` and return its id.
    pub fn record_pending(&mut self, request: &TokenCreationRequest, deployer: &str) -> String {
        let record = DeployedToken::pending(request, deployer);
        let id = record.id.clone();
        info!(
            record_id = %id,
            chain = %record.chain,
            symbol = %record.symbol,
            "token deployment pending"
        );
        self.tokens.insert(id.clone(), record);
        id
    }

    /// Mark a record deployed at `address` by `tx_hash`.
    pub fn mark_deployed(
        &mut self,
        id: &str,
        address: &str,
        tx_hash: &str,
    ) -> Result<&DeployedToken, ForgeError> {
        let record = self
            .tokens
            .get_mut(id)
            .ok_or_else(|| ForgeError::Storage(format!("no token record {id}")))?;
        record.status = TokenStatus::Deployed;
        record.contract_address = Some(address.to_string());
        record.transaction_hash = Some(tx_hash.to_string());
        record.deployed_at = Some(Utc::now());
        info!(record_id = %id, address = %address, tx = %tx_hash, "token deployed");
        Ok(record)
    }

    pub fn mark_failed(&mut self, id: &str) -> Result<&DeployedToken, ForgeError> {
        let record = self
            .tokens
            .get_mut(id)
            .ok_or_else(|| ForgeError::Storage(format!("no token record {id}")))?;
        record.status = TokenStatus::Failed;
        warn!(record_id = %id, "token deployment failed");
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Option<&DeployedToken> {
        self.tokens.get(id)
    }

    /// All records, newest first.
    pub fn list(&self) -> Vec<&DeployedToken> {
        let mut tokens: Vec<_> = self.tokens.values().collect();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        tokens
    }

    /// Records deployed from `deployer`, newest first. EVM addresses compare
    /// case-insensitively.
    pub fn list_by_deployer(&self, deployer: &str) -> Vec<&DeployedToken> {
        self.list()
            .into_iter()
            .filter(|t| same_address(&t.deployer_address, deployer))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ForgeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), count = self.len(), "token records saved");
        Ok(())
    }

    /// Load records from `path`; a missing file is an empty store.
    pub fn load_from_file(path: &Path) -> Result<Self, ForgeError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path)?;
        let store: Self = serde_json::from_str(&raw)?;
        info!(path = %path.display(), count = store.len(), "token records loaded");
        Ok(store)
    }
}

fn same_address(a: &str, b: &str) -> bool {
    if a.starts_with("0x") || a.starts_with("0X") {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}
