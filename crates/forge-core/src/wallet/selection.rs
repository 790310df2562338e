use serde::Serialize;
use tracing::info;

use crate::error::ForgeError;
use crate::networks::ChainFamily;
use crate::wallet::evm::EvmWalletContext;
use crate::wallet::solana::SolanaWalletContext;

/// What the wallet picker shows for one wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub install_url: Option<&'static str>,
    pub family: ChainFamily,
    /// False for wallets listed in the picker but not wired up yet.
    pub supported: bool,
}

const METAMASK: WalletDescriptor = WalletDescriptor {
    id: "metamask",
    name: "MetaMask",
    description: "Connect with MetaMask browser extension",
    install_url: Some("https://metamask.io/download/"),
    family: ChainFamily::Evm,
    supported: true,
};

const WALLETCONNECT: WalletDescriptor = WalletDescriptor {
    id: "walletconnect",
    name: "WalletConnect",
    description: "Scan QR code with your mobile wallet",
    install_url: None,
    family: ChainFamily::Evm,
    supported: false,
};

const PHANTOM: WalletDescriptor = WalletDescriptor {
    id: "phantom",
    name: "Phantom",
    description: "Most popular Solana wallet",
    install_url: Some("https://phantom.app/download"),
    family: ChainFamily::Solana,
    supported: true,
};

const OKX: WalletDescriptor = WalletDescriptor {
    id: "okx",
    name: "OKX Wallet",
    description: "Multi-chain wallet with great UX",
    install_url: Some("https://www.okx.com/web3"),
    family: ChainFamily::Solana,
    supported: true,
};

const SOLFLARE: WalletDescriptor = WalletDescriptor {
    id: "solflare",
    name: "Solflare",
    description: "Powerful Solana wallet",
    install_url: Some("https://solflare.com/download"),
    family: ChainFamily::Solana,
    supported: true,
};

const BACKPACK: WalletDescriptor = WalletDescriptor {
    id: "backpack",
    name: "Backpack",
    description: "Modern wallet for Solana",
    install_url: Some("https://backpack.app/downloads"),
    family: ChainFamily::Solana,
    supported: true,
};

pub const WALLETCONNECT_UNAVAILABLE: &str = "WalletConnect integration is coming soon";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EvmWalletKind {
    MetaMask,
    WalletConnect,
}

impl EvmWalletKind {
    pub const ALL: [EvmWalletKind; 2] = [EvmWalletKind::MetaMask, EvmWalletKind::WalletConnect];

    pub fn descriptor(&self) -> &'static WalletDescriptor {
        match self {
            EvmWalletKind::MetaMask => &METAMASK,
            EvmWalletKind::WalletConnect => &WALLETCONNECT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SolanaWalletKind {
    Phantom,
    Okx,
    Solflare,
    Backpack,
}

impl SolanaWalletKind {
    pub const ALL: [SolanaWalletKind; 4] = [
        SolanaWalletKind::Phantom,
        SolanaWalletKind::Okx,
        SolanaWalletKind::Solflare,
        SolanaWalletKind::Backpack,
    ];

    pub fn descriptor(&self) -> &'static WalletDescriptor {
        match self {
            SolanaWalletKind::Phantom => &PHANTOM,
            SolanaWalletKind::Okx => &OKX,
            SolanaWalletKind::Solflare => &SOLFLARE,
            SolanaWalletKind::Backpack => &BACKPACK,
        }
    }

    pub fn id(&self) -> &'static str {
        self.descriptor().id
    }

    pub fn from_id(id: &str) -> Result<Self, ForgeError> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or_else(|| ForgeError::UnsupportedWallet(id.to_string()))
    }

    /// The error shown when this wallet's extension is missing.
    pub fn not_installed(&self) -> ForgeError {
        not_installed(self.descriptor())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WalletKind {
    Evm(EvmWalletKind),
    Solana(SolanaWalletKind),
}

impl WalletKind {
    /// Resolve a picker id within `family`. Unknown ids are an error rather
    /// than a fallback to some default wallet.
    pub fn from_id(family: ChainFamily, id: &str) -> Result<Self, ForgeError> {
        let id = id.trim().to_ascii_lowercase();
        match family {
            ChainFamily::Evm => EvmWalletKind::ALL
                .into_iter()
                .find(|k| k.descriptor().id == id)
                .map(WalletKind::Evm)
                .ok_or(ForgeError::UnsupportedWallet(id)),
            ChainFamily::Solana => SolanaWalletKind::from_id(&id).map(WalletKind::Solana),
        }
    }

    pub fn descriptor(&self) -> &'static WalletDescriptor {
        match self {
            WalletKind::Evm(kind) => kind.descriptor(),
            WalletKind::Solana(kind) => kind.descriptor(),
        }
    }

    pub fn family(&self) -> ChainFamily {
        self.descriptor().family
    }
}

pub(crate) fn not_installed(descriptor: &WalletDescriptor) -> ForgeError {
    ForgeError::ProviderNotInstalled {
        wallet: descriptor.name.to_string(),
        install_url: descriptor.install_url.unwrap_or_default().to_string(),
    }
}

/// A picker row: the wallet plus whether its extension was detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletOption {
    pub kind: WalletKind,
    pub descriptor: &'static WalletDescriptor,
    pub installed: bool,
}

/// The wallets to offer for `family`, in display order.
pub fn wallet_options(
    family: ChainFamily,
    evm: &EvmWalletContext,
    solana: &SolanaWalletContext,
) -> Vec<WalletOption> {
    match family {
        ChainFamily::Evm => EvmWalletKind::ALL
            .into_iter()
            .map(|kind| WalletOption {
                kind: WalletKind::Evm(kind),
                descriptor: kind.descriptor(),
                installed: match kind {
                    EvmWalletKind::MetaMask => evm.is_installed(),
                    EvmWalletKind::WalletConnect => false,
                },
            })
            .collect(),
        ChainFamily::Solana => {
            let available = solana.available_wallets();
            SolanaWalletKind::ALL
                .into_iter()
                .map(|kind| WalletOption {
                    kind: WalletKind::Solana(kind),
                    descriptor: kind.descriptor(),
                    installed: available.contains(&kind),
                })
                .collect()
        }
    }
}

/// Result of a successful pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedWallet {
    pub kind: WalletKind,
    pub address: String,
}

impl ConnectedWallet {
    pub fn message(&self) -> String {
        format!("Successfully connected to {}", self.kind.descriptor().name)
    }
}

/// Connect the picked wallet through the context of its family.
pub async fn connect_wallet(
    kind: WalletKind,
    evm: &EvmWalletContext,
    solana: &SolanaWalletContext,
) -> Result<ConnectedWallet, ForgeError> {
    let address = match kind {
        WalletKind::Evm(EvmWalletKind::WalletConnect) => {
            return Err(ForgeError::Unavailable(WALLETCONNECT_UNAVAILABLE.to_string()));
        }
        WalletKind::Evm(EvmWalletKind::MetaMask) => evm.connect().await?,
        WalletKind::Solana(wallet) => solana.connect(wallet).await?,
    };

    let connected = ConnectedWallet { kind, address };
    info!(wallet = connected.kind.descriptor().id, "{}", connected.message());
    Ok(connected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_id_resolves_within_family() {
        assert_eq!(
            WalletKind::from_id(ChainFamily::Evm, "metamask").unwrap(),
            WalletKind::Evm(EvmWalletKind::MetaMask)
        );
        assert_eq!(
            WalletKind::from_id(ChainFamily::Solana, "OKX").unwrap(),
            WalletKind::Solana(SolanaWalletKind::Okx)
        );
    }

    #[test]
    fn from_id_rejects_unknown_and_cross_family() {
        assert!(matches!(
            WalletKind::from_id(ChainFamily::Solana, "trust"),
            Err(ForgeError::UnsupportedWallet(id)) if id == "trust"
        ));
        assert!(WalletKind::from_id(ChainFamily::Evm, "phantom").is_err());
        assert!(WalletKind::from_id(ChainFamily::Solana, "metamask").is_err());
    }

    #[test]
    fn descriptors_match_picker_copy() {
        let okx = SolanaWalletKind::Okx.descriptor();
        assert_eq!(okx.name, "OKX Wallet");
        assert_eq!(okx.install_url, Some("https://www.okx.com/web3"));

        let wc = EvmWalletKind::WalletConnect.descriptor();
        assert!(wc.install_url.is_none());
        assert!(!wc.supported);
    }

    #[test]
    fn every_solana_wallet_has_install_url() {
        for kind in SolanaWalletKind::ALL {
            assert!(kind.descriptor().install_url.is_some(), "{kind:?}");
            assert_eq!(kind.descriptor().family, ChainFamily::Solana);
        }
    }

    #[test]
    fn not_installed_error_carries_url() {
        let err = SolanaWalletKind::Backpack.not_installed();
        assert_eq!(err.install_url(), Some("https://backpack.app/downloads"));
        assert!(err.to_string().starts_with("Backpack is not installed"));
    }

    #[test]
    fn connected_message_uses_display_name() {
        let connected = ConnectedWallet {
            kind: WalletKind::Solana(SolanaWalletKind::Solflare),
            address: "x".into(),
        };
        assert_eq!(connected.message(), "Successfully connected to Solflare");
    }
}
