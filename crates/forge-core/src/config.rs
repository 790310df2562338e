use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chain_sol::HttpSolanaRpc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ForgeError;
use crate::networks::{ChainFamily, ChainKey};

const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_LOG_FILTER: &str = "info,forge_core=debug,chain_sol=debug";
const RPC_ENV_PREFIX: &str = "FORGE_RPC_";

/// Runtime settings for the dashboard core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Per-network RPC endpoints that replace the registry defaults.
    pub rpc_overrides: BTreeMap<ChainKey, String>,
    /// How often Solana confirmation status is polled.
    pub confirmation_poll_ms: u64,
    /// Where connection flags and token records are kept.
    pub data_dir: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            rpc_overrides: BTreeMap::new(),
            confirmation_poll_ms: DEFAULT_POLL_INTERVAL_MS,
            data_dir: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ForgeConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ForgeError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| ForgeError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| ForgeError::Config(format!("failed to parse {}: {e}", path.display())))?;

        for (chain, url) in &config.rpc_overrides {
            if !validate_rpc_url(url) {
                return Err(ForgeError::Config(format!("invalid RPC URL for {chain}: {url}")));
            }
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ForgeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Point `chain` at a custom endpoint. Only http(s) URLs with a host are
    /// accepted.
    pub fn set_rpc_override(&mut self, chain: ChainKey, url: &str) -> Result<(), ForgeError> {
        let url = url.trim();
        if !validate_rpc_url(url) {
            return Err(ForgeError::Config(format!("invalid RPC URL: {url}")));
        }
        self.rpc_overrides.insert(chain, url.to_string());
        Ok(())
    }

    pub fn clear_rpc_override(&mut self, chain: ChainKey) {
        self.rpc_overrides.remove(&chain);
    }

    /// The endpoint to use for `chain`: the override when set, else the
    /// registry default.
    pub fn rpc_url(&self, chain: ChainKey) -> &str {
        self.rpc_overrides
            .get(&chain)
            .map(String::as_str)
            .unwrap_or(chain.descriptor().rpc_url)
    }

    /// Apply `FORGE_RPC_<CHAIN_KEY>` environment overrides.
    pub fn apply_env(&mut self) -> Result<(), ForgeError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Same as [`apply_env`](Self::apply_env) with an injectable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ForgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for chain in ChainKey::ALL {
            let name = format!("{RPC_ENV_PREFIX}{}", chain.env_suffix());
            if let Some(url) = lookup(&name) {
                self.set_rpc_override(chain, &url)
                    .map_err(|_| ForgeError::Config(format!("{name} is not a valid RPC URL")))?;
                debug!(%chain, "rpc override from environment");
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_ms.max(1))
    }

    /// A JSON-RPC client for a Solana cluster, honouring overrides.
    pub fn solana_rpc(&self, chain: ChainKey) -> Result<HttpSolanaRpc, ForgeError> {
        if chain.family() != ChainFamily::Solana {
            return Err(ForgeError::UnsupportedChain(format!(
                "{chain} is not a Solana cluster"
            )));
        }
        Ok(HttpSolanaRpc::new(self.rpc_url(chain)).with_poll_interval(self.poll_interval()))
    }

    /// File inside the data directory, if one is configured.
    pub fn data_file(&self, name: &str) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(name))
    }
}

/// A URL is usable as an RPC endpoint when it parses, uses http or https,
/// and names a host.
pub fn validate_rpc_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}
