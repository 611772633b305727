use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{ChangeId, ConfigLedger, HistoryEntry, HistoryId, PendingChange};
use super::store::{ConfigStore, StoreError};
use crate::evaluation::{ScoringConfig, ValidationError};

/// Actor recorded on the bootstrap history entry.
pub const SYSTEM_ACTOR: &str = "system";

/// Sole owner of the active scoring config, the change queue and the history log.
///
/// Mutations are serialized on `writer`: the next ledger is computed on a copy
/// and persisted, then swapped in under a short write lock. Readers only wait
/// for the swap, never for the store.
///
/// Store calls are synchronous; async callers should run mutations on a
/// blocking thread (see the admin router).
pub struct ConfigChangeManager<S: ?Sized> {
    ledger: RwLock<ConfigLedger>,
    writer: Mutex<()>,
    store: Arc<S>,
}

impl<S> ConfigChangeManager<S>
where
    S: ConfigStore + ?Sized,
{
    /// Restore the persisted ledger, or seed a new one from `initial`.
    pub fn bootstrap(initial: ScoringConfig, store: Arc<S>) -> Result<Self, ConfigChangeError> {
        let ledger = match store.load()? {
            Some(ledger) => {
                if let Some(reason) = ledger.inconsistency() {
                    return Err(StoreError::Corrupt(reason).into());
                }
                info!(
                    version = ?ledger.active_version(),
                    history = ledger.history().len(),
                    "restored scoring config ledger"
                );
                ledger
            }
            None => {
                initial.validate()?;
                let ledger = ConfigLedger::bootstrap(initial, SYSTEM_ACTOR, Utc::now());
                store.save(&ledger)?;
                info!("bootstrapped scoring config ledger");
                ledger
            }
        };

        Ok(Self {
            ledger: RwLock::new(ledger),
            writer: Mutex::new(()),
            store,
        })
    }

    pub fn get_active(&self) -> ScoringConfig {
        self.read(|ledger| ledger.active().clone())
    }

    /// Active config together with the history entry it came from.
    pub fn active_snapshot(&self) -> (HistoryId, ScoringConfig) {
        self.read(|ledger| {
            let version = ledger.active_version().unwrap_or(HistoryId(0));
            (version, ledger.active().clone())
        })
    }

    pub fn submit_pending(
        &self,
        proposed_config: ScoringConfig,
        submitted_by: &str,
    ) -> Result<PendingChange, ConfigChangeError> {
        let submitted_by = submitted_by.trim();
        let validation = if submitted_by.is_empty() {
            Err(ValidationError::single("submitted_by", "must not be blank"))
        } else {
            proposed_config.validate()
        };
        if let Err(err) = validation {
            warn!(actor = submitted_by, error = %err, "rejected invalid scoring config proposal");
            return Err(err.into());
        }

        let change =
            self.transact(|ledger| Ok(ledger.submit(proposed_config, submitted_by, Utc::now())))?;
        info!(change_id = %change.id, actor = submitted_by, "scoring config change submitted");
        Ok(change)
    }

    pub fn approve(
        &self,
        change_id: ChangeId,
        reviewed_by: &str,
    ) -> Result<ScoringConfig, ConfigChangeError> {
        self.approve_recorded(change_id, reviewed_by)
            .map(|entry| entry.config)
    }

    /// Approve a change and return the history entry it produced.
    pub fn approve_recorded(
        &self,
        change_id: ChangeId,
        reviewed_by: &str,
    ) -> Result<HistoryEntry, ConfigChangeError> {
        let entry = self.transact(|ledger| ledger.approve(change_id, reviewed_by, Utc::now()))?;
        info!(
            change_id = %change_id,
            history_id = %entry.id,
            actor = reviewed_by,
            changes = entry.changes.len(),
            "scoring config change approved"
        );
        Ok(entry)
    }

    pub fn reject(
        &self,
        change_id: ChangeId,
        reviewed_by: &str,
    ) -> Result<PendingChange, ConfigChangeError> {
        let change = self.transact(|ledger| ledger.reject(change_id, reviewed_by, Utc::now()))?;
        info!(change_id = %change_id, actor = reviewed_by, "scoring config change rejected");
        Ok(change)
    }

    pub fn rollback(
        &self,
        history_id: HistoryId,
        requested_by: &str,
    ) -> Result<ScoringConfig, ConfigChangeError> {
        self.rollback_recorded(history_id, requested_by)
            .map(|entry| entry.config)
    }

    /// Roll back and return the new history entry recording the rollback.
    pub fn rollback_recorded(
        &self,
        history_id: HistoryId,
        requested_by: &str,
    ) -> Result<HistoryEntry, ConfigChangeError> {
        let entry = self.transact(|ledger| ledger.rollback(history_id, requested_by, Utc::now()))?;
        info!(
            rollback_to = %history_id,
            history_id = %entry.id,
            actor = requested_by,
            "scoring config rolled back"
        );
        Ok(entry)
    }

    /// Changes still awaiting review, in submission order.
    pub fn list_pending(&self) -> Vec<PendingChange> {
        self.read(|ledger| {
            ledger
                .changes()
                .iter()
                .filter(|change| change.is_actionable())
                .cloned()
                .collect()
        })
    }

    /// Every change ever submitted, including reviewed ones.
    pub fn list_changes(&self) -> Vec<PendingChange> {
        self.read(|ledger| ledger.changes().to_vec())
    }

    pub fn list_history(&self) -> Vec<HistoryEntry> {
        self.read(|ledger| ledger.history().to_vec())
    }

    pub fn get_change(&self, change_id: ChangeId) -> Result<PendingChange, ConfigChangeError> {
        self.read(|ledger| ledger.change(change_id).cloned())
            .ok_or(ConfigChangeError::ChangeNotFound(change_id))
    }

    pub fn get_history(&self, history_id: HistoryId) -> Result<HistoryEntry, ConfigChangeError> {
        self.read(|ledger| ledger.history_entry(history_id).cloned())
            .ok_or(ConfigChangeError::HistoryNotFound(history_id))
    }

    fn read<T>(&self, view: impl FnOnce(&ConfigLedger) -> T) -> T {
        // Writers only ever assign a fully built ledger, so a poisoned lock still
        // guards a consistent value.
        let guard = self.ledger.read().unwrap_or_else(PoisonError::into_inner);
        view(&guard)
    }

    fn transact<T>(
        &self,
        apply: impl FnOnce(&mut ConfigLedger) -> Result<T, ConfigChangeError>,
    ) -> Result<T, ConfigChangeError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = self.read(ConfigLedger::clone);
        let outcome = apply(&mut next)?;
        self.store.save(&next)?;
        *self.ledger.write().unwrap_or_else(PoisonError::into_inner) = next;
        Ok(outcome)
    }
}

/// Error raised by config change operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigChangeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no pending change with id {0}")]
    ChangeNotFound(ChangeId),
    #[error("no history entry with id {0}")]
    HistoryNotFound(HistoryId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ConfigChangeError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigChangeError::ChangeNotFound(_) | ConfigChangeError::HistoryNotFound(_)
        )
    }
}
