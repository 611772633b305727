use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::admin::domain::ConfigLedger;
use crate::admin::manager::ConfigChangeManager;
use crate::admin::store::{ConfigStore, InMemoryConfigStore, StoreError};
use crate::evaluation::{ScoringConfig, Thresholds, TrustWeights};

pub(super) fn build_manager() -> (
    ConfigChangeManager<InMemoryConfigStore>,
    Arc<InMemoryConfigStore>,
) {
    let store = Arc::new(InMemoryConfigStore::default());
    let manager = ConfigChangeManager::bootstrap(ScoringConfig::default(), store.clone())
        .expect("default config bootstraps");
    (manager, store)
}

pub(super) fn source_heavy_config() -> ScoringConfig {
    let mut config = ScoringConfig::default();
    config.weights = TrustWeights {
        source: 0.7,
        content: 0.3,
    };
    config
}

pub(super) fn strict_subscriber_config() -> ScoringConfig {
    let mut config = ScoringConfig::default();
    config.subscriber_thresholds = Thresholds {
        high: 5_000_000,
        medium: 500_000,
        low: 50_000,
    };
    config
}

pub(super) fn unbalanced_config() -> ScoringConfig {
    let mut config = ScoringConfig::default();
    config.weights = TrustWeights {
        source: 0.7,
        content: 0.4,
    };
    config
}

/// Store whose saves fail once `start_failing` has been called.
pub(super) struct FailingStore {
    pub(super) inner: InMemoryConfigStore,
    pub(super) fail_saves: AtomicBool,
}

impl FailingStore {
    pub(super) fn new() -> Self {
        Self {
            inner: InMemoryConfigStore::default(),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub(super) fn start_failing(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }
}

impl ConfigStore for FailingStore {
    fn load(&self) -> Result<Option<ConfigLedger>, StoreError> {
        self.inner.load()
    }

    fn save(&self, ledger: &ConfigLedger) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk offline".to_string()));
        }
        self.inner.save(ledger)
    }
}

/// Store whose armed saves announce themselves and then wait to be released.
pub(super) struct GatedStore {
    pub(super) inner: InMemoryConfigStore,
    pub(super) armed: AtomicBool,
    pub(super) entered: Mutex<Sender<()>>,
    pub(super) release: Mutex<Receiver<()>>,
}

impl GatedStore {
    pub(super) fn new(entered: Sender<()>, release: Receiver<()>) -> Self {
        Self {
            inner: InMemoryConfigStore::default(),
            armed: AtomicBool::new(false),
            entered: Mutex::new(entered),
            release: Mutex::new(release),
        }
    }

    pub(super) fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl ConfigStore for GatedStore {
    fn load(&self) -> Result<Option<ConfigLedger>, StoreError> {
        self.inner.load()
    }

    fn save(&self, ledger: &ConfigLedger) -> Result<(), StoreError> {
        if self.armed.load(Ordering::SeqCst) {
            let entered = self.entered.lock().expect("entered sender");
            entered.send(()).expect("test waiting for save");
            let release = self.release.lock().expect("release receiver");
            release.recv().expect("test releases save");
        }
        self.inner.save(ledger)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
