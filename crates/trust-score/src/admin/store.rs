use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::domain::ConfigLedger;

/// Persistence abstraction so the manager can be exercised without durable storage.
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<Option<ConfigLedger>, StoreError>;
    fn save(&self, ledger: &ConfigLedger) -> Result<(), StoreError>;
}

/// Error enumeration for ledger persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("config store unavailable: {0}")]
    Unavailable(String),
    #[error("config ledger io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("config ledger is not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("persisted config ledger is inconsistent: {0}")]
    Corrupt(String),
}

/// Keeps the latest ledger in process memory only.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    ledger: Mutex<Option<ConfigLedger>>,
}

impl InMemoryConfigStore {
    pub fn with_ledger(ledger: ConfigLedger) -> Self {
        Self {
            ledger: Mutex::new(Some(ledger)),
        }
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load(&self) -> Result<Option<ConfigLedger>, StoreError> {
        let guard = self
            .ledger
            .lock()
            .map_err(|_| StoreError::Unavailable("config store mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, ledger: &ConfigLedger) -> Result<(), StoreError> {
        let mut guard = self
            .ledger
            .lock()
            .map_err(|_| StoreError::Unavailable("config store mutex poisoned".to_string()))?;
        *guard = Some(ledger.clone());
        Ok(())
    }
}

/// Stores the ledger as pretty-printed JSON, replacing the file atomically on save.
///
/// Saves go temp file, fsync, rename, fsync parent dir; a crash leaves either the
/// old ledger or the new one, never a truncated file.
#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    path: PathBuf,
}

impl JsonFileConfigStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn load(&self) -> Result<Option<ConfigLedger>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let ledger = serde_json::from_str(&raw)?;
        Ok(Some(ledger))
    }

    fn save(&self, ledger: &ConfigLedger) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        let encoded = serde_json::to_vec_pretty(ledger)?;
        {
            let mut file = fs::File::create(&staging)?;
            file.write_all(&encoded)?;
            file.sync_all()?;
        }

        if let Err(err) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        // ext4/xfs can lose the rename unless the directory entry is flushed too.
        let parent = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
        Ok(())
    }
}
