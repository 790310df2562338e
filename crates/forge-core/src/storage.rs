use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::ForgeError;
use crate::networks::ChainFamily;

pub const EVM_CONNECTED_KEY: &str = "evmWalletConnected";
pub const SOLANA_CONNECTED_KEY: &str = "solanaWalletConnected";
pub const SOLANA_WALLET_NAME_KEY: &str = "solanaWalletName";

fn connected_key(family: ChainFamily) -> &'static str {
    match family {
        ChainFamily::Evm => EVM_CONNECTED_KEY,
        ChainFamily::Solana => SOLANA_CONNECTED_KEY,
    }
}

/// Small key/value store for "was connected" flags.
///
/// Only flags and the last wallet name are ever written; never keys or
/// addresses.
pub trait ConnectionFlagStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&self, key: &str, value: &str) -> Result<(), ForgeError>;

    fn remove(&self, key: &str) -> Result<(), ForgeError>;

    fn is_set(&self, family: ChainFamily) -> bool {
        self.get(connected_key(family)).as_deref() == Some("true")
    }

    fn set(&self, family: ChainFamily) -> Result<(), ForgeError> {
        self.put(connected_key(family), "true")
    }

    fn clear(&self, family: ChainFamily) -> Result<(), ForgeError> {
        self.remove(connected_key(family))
    }

    /// Id of the Solana wallet used last, for silent reconnect.
    fn last_solana_wallet(&self) -> Option<String> {
        self.get(SOLANA_WALLET_NAME_KEY)
    }

    fn set_last_solana_wallet(&self, wallet_id: Option<&str>) -> Result<(), ForgeError> {
        match wallet_id {
            Some(id) => self.put(SOLANA_WALLET_NAME_KEY, id),
            None => self.remove(SOLANA_WALLET_NAME_KEY),
        }
    }
}

/// Flags that live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConnectionFlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<(), ForgeError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ForgeError> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Flags kept in a JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileFlagStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileFlagStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ForgeError> {
        let path = path.into();
        let values = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), entries = values.len(), "flag store opened");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), ForgeError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

impl ConnectionFlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<(), ForgeError> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), ForgeError> {
        let mut values = self.values.write();
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_flags_per_family() {
        let store = MemoryFlagStore::new();
        assert!(!store.is_set(ChainFamily::Evm));

        store.set(ChainFamily::Evm).unwrap();
        assert!(store.is_set(ChainFamily::Evm));
        assert!(!store.is_set(ChainFamily::Solana));
        assert_eq!(store.get(EVM_CONNECTED_KEY).as_deref(), Some("true"));

        store.clear(ChainFamily::Evm).unwrap();
        assert!(!store.is_set(ChainFamily::Evm));
    }

    #[test]
    fn only_true_counts_as_set() {
        let store = MemoryFlagStore::new();
        store.put(SOLANA_CONNECTED_KEY, "yes").unwrap();
        assert!(!store.is_set(ChainFamily::Solana));
    }

    #[test]
    fn last_solana_wallet_roundtrip() {
        let store = MemoryFlagStore::new();
        assert!(store.last_solana_wallet().is_none());
        store.set_last_solana_wallet(Some("phantom")).unwrap();
        assert_eq!(store.last_solana_wallet().as_deref(), Some("phantom"));
        store.set_last_solana_wallet(None).unwrap();
        assert!(store.last_solana_wallet().is_none());
    }

    #[test]
    fn file_store_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("flags.json");

        let store = FileFlagStore::open(&path).unwrap();
        store.set(ChainFamily::Solana).unwrap();
        store.set_last_solana_wallet(Some("solflare")).unwrap();
        drop(store);

        let reopened = FileFlagStore::open(&path).unwrap();
        assert!(reopened.is_set(ChainFamily::Solana));
        assert_eq!(reopened.last_solana_wallet().as_deref(), Some("solflare"));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn file_store_clear_is_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state").join("flags.json");

        let store = FileFlagStore::open(&path).unwrap();
        store.set(ChainFamily::Evm).unwrap();
        store.clear(ChainFamily::Evm).unwrap();

        let reopened = FileFlagStore::open(&path).unwrap();
        assert!(!reopened.is_set(ChainFamily::Evm));
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("flags.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileFlagStore::open(&path).unwrap_err();
        assert!(matches!(err, ForgeError::Storage(_)));
    }
}
