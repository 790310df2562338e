use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForgeError;

/// Supported networks, keyed the way the dashboard stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainKey {
    EthereumMainnet,
    /// Sepolia.
    EthereumTestnet,
    BscMainnet,
    BscTestnet,
    SolanaMainnet,
    SolanaTestnet,
    SolanaDevnet,
}

impl ChainKey {
    pub const ALL: [ChainKey; 7] = [
        ChainKey::EthereumMainnet,
        ChainKey::EthereumTestnet,
        ChainKey::BscMainnet,
        ChainKey::BscTestnet,
        ChainKey::SolanaMainnet,
        ChainKey::SolanaTestnet,
        ChainKey::SolanaDevnet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainKey::EthereumMainnet => "ethereum-mainnet",
            ChainKey::EthereumTestnet => "ethereum-testnet",
            ChainKey::BscMainnet => "bsc-mainnet",
            ChainKey::BscTestnet => "bsc-testnet",
            ChainKey::SolanaMainnet => "solana-mainnet",
            ChainKey::SolanaTestnet => "solana-testnet",
            ChainKey::SolanaDevnet => "solana-devnet",
        }
    }

    pub fn descriptor(&self) -> &'static ChainDescriptor {
        match self {
            ChainKey::EthereumMainnet => &ETHEREUM_MAINNET,
            ChainKey::EthereumTestnet => &ETHEREUM_SEPOLIA,
            ChainKey::BscMainnet => &BSC_MAINNET,
            ChainKey::BscTestnet => &BSC_TESTNET,
            ChainKey::SolanaMainnet => &SOLANA_MAINNET,
            ChainKey::SolanaTestnet => &SOLANA_TESTNET,
            ChainKey::SolanaDevnet => &SOLANA_DEVNET,
        }
    }

    pub fn family(&self) -> ChainFamily {
        self.descriptor().family
    }

    /// Upper-snake form used in environment variable names.
    pub fn env_suffix(&self) -> String {
        self.as_str().replace('-', "_").to_ascii_uppercase()
    }
}

impl fmt::Display for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainKey {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChainKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| ForgeError::UnsupportedChain(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainFamily {
    #[serde(rename = "EVM")]
    Evm,
    Solana,
}

impl ChainFamily {
    pub fn label(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "EVM",
            ChainFamily::Solana => "Solana",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkTier {
    Mainnet,
    Testnet,
    Devnet,
}

/// Static description of a supported network.
#[derive(Debug, Clone, Serialize)]
pub struct ChainDescriptor {
    pub key: ChainKey,
    /// EVM chain ID; 0 for Solana clusters.
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub family: ChainFamily,
    pub tier: NetworkTier,
    pub rpc_url: &'static str,
    pub explorer_base: &'static str,
    /// Solana explorer `cluster` query value, when not mainnet.
    pub explorer_cluster: Option<&'static str>,
}

pub const ETHEREUM_MAINNET: ChainDescriptor = ChainDescriptor {
    key: ChainKey::EthereumMainnet,
    chain_id: 1,
    name: "Ethereum Mainnet",
    symbol: "ETH",
    decimals: 18,
    family: ChainFamily::Evm,
    tier: NetworkTier::Mainnet,
    rpc_url: "https://eth.llamarpc.com",
    explorer_base: "https://etherscan.io",
    explorer_cluster: None,
};

pub const ETHEREUM_SEPOLIA: ChainDescriptor = ChainDescriptor {
    key: ChainKey::EthereumTestnet,
    chain_id: 11155111,
    name: "Ethereum Sepolia",
    symbol: "SepoliaETH",
    decimals: 18,
    family: ChainFamily::Evm,
    tier: NetworkTier::Testnet,
    rpc_url: "https://rpc.sepolia.org",
    explorer_base: "https://sepolia.etherscan.io",
    explorer_cluster: None,
};

pub const BSC_MAINNET: ChainDescriptor = ChainDescriptor {
    key: ChainKey::BscMainnet,
    chain_id: 56,
    name: "BNB Smart Chain",
    symbol: "BNB",
    decimals: 18,
    family: ChainFamily::Evm,
    tier: NetworkTier::Mainnet,
    rpc_url: "https://bsc-dataseed.binance.org",
    explorer_base: "https://bscscan.com",
    explorer_cluster: None,
};

pub const BSC_TESTNET: ChainDescriptor = ChainDescriptor {
    key: ChainKey::BscTestnet,
    chain_id: 97,
    name: "BNB Testnet",
    symbol: "tBNB",
    decimals: 18,
    family: ChainFamily::Evm,
    tier: NetworkTier::Testnet,
    rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545",
    explorer_base: "https://testnet.bscscan.com",
    explorer_cluster: None,
};

pub const SOLANA_MAINNET: ChainDescriptor = ChainDescriptor {
    key: ChainKey::SolanaMainnet,
    chain_id: 0,
    name: "Solana Mainnet",
    symbol: "SOL",
    decimals: 9,
    family: ChainFamily::Solana,
    tier: NetworkTier::Mainnet,
    rpc_url: "https://api.mainnet-beta.solana.com",
    explorer_base: "https://explorer.solana.com",
    explorer_cluster: None,
};

pub const SOLANA_TESTNET: ChainDescriptor = ChainDescriptor {
    key: ChainKey::SolanaTestnet,
    chain_id: 0,
    name: "Solana Testnet",
    symbol: "SOL",
    decimals: 9,
    family: ChainFamily::Solana,
    tier: NetworkTier::Testnet,
    rpc_url: "https://api.testnet.solana.com",
    explorer_base: "https://explorer.solana.com",
    explorer_cluster: Some("testnet"),
};

pub const SOLANA_DEVNET: ChainDescriptor = ChainDescriptor {
    key: ChainKey::SolanaDevnet,
    chain_id: 0,
    name: "Solana Devnet",
    symbol: "SOL",
    decimals: 9,
    family: ChainFamily::Solana,
    tier: NetworkTier::Devnet,
    rpc_url: "https://api.devnet.solana.com",
    explorer_base: "https://explorer.solana.com",
    explorer_cluster: Some("devnet"),
};

const ALL_CHAINS: &[&ChainDescriptor] = &[
    &ETHEREUM_MAINNET,
    &ETHEREUM_SEPOLIA,
    &BSC_MAINNET,
    &BSC_TESTNET,
    &SOLANA_MAINNET,
    &SOLANA_TESTNET,
    &SOLANA_DEVNET,
];

impl ChainDescriptor {
    pub fn is_evm(&self) -> bool {
        self.family == ChainFamily::Evm
    }

    pub fn is_testnet(&self) -> bool {
        self.tier != NetworkTier::Mainnet
    }

    /// `0x`-prefixed chain ID as wallet RPC methods expect it.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Explorer landing page, cluster query included.
    pub fn explorer_url(&self) -> String {
        self.explorer_link("")
    }

    pub fn explorer_tx_url(&self, signature: &str) -> String {
        self.explorer_link(&format!("/tx/{signature}"))
    }

    pub fn explorer_address_url(&self, address: &str) -> String {
        self.explorer_link(&format!("/address/{address}"))
    }

    fn explorer_link(&self, path: &str) -> String {
        let base = self.explorer_base;
        match self.explorer_cluster {
            Some(cluster) if path.is_empty() => format!("{base}/?cluster={cluster}"),
            Some(cluster) => format!("{base}{path}?cluster={cluster}"),
            None => format!("{base}{path}"),
        }
    }
}

/// Look a network up by its string key.
pub fn get_chain(key: &str) -> Result<&'static ChainDescriptor, ForgeError> {
    Ok(key.parse::<ChainKey>()?.descriptor())
}

/// Look an EVM network up by its numeric chain ID.
pub fn get_chain_by_id(chain_id: u64) -> Option<&'static ChainDescriptor> {
    ALL_CHAINS
        .iter()
        .find(|c| c.is_evm() && c.chain_id == chain_id)
        .copied()
}

/// Display name for an EVM chain ID, or "Unknown Network".
pub fn network_name(chain_id: u64) -> &'static str {
    get_chain_by_id(chain_id)
        .map(|c| c.name)
        .unwrap_or("Unknown Network")
}

pub fn supported_chains() -> Vec<&'static ChainDescriptor> {
    ALL_CHAINS.to_vec()
}

pub fn chains_for_family(family: ChainFamily) -> Vec<&'static ChainDescriptor> {
    ALL_CHAINS
        .iter()
        .filter(|c| c.family == family)
        .copied()
        .collect()
}

/// Parameters for `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl AddChainParams {
    pub fn from_descriptor(chain: &ChainDescriptor) -> Result<Self, ForgeError> {
        if !chain.is_evm() {
            return Err(ForgeError::UnsupportedChain(format!(
                "{} cannot be added to an EVM wallet",
                chain.key
            )));
        }
        Ok(Self {
            chain_id: chain.chain_id_hex(),
            chain_name: chain.name.to_string(),
            native_currency: NativeCurrency {
                name: chain.symbol.to_string(),
                symbol: chain.symbol.to_string(),
                decimals: chain.decimals,
            },
            rpc_urls: vec![chain.rpc_url.to_string()],
            block_explorer_urls: vec![chain.explorer_base.to_string()],
        })
    }
}
