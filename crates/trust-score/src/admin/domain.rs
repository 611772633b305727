use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::manager::ConfigChangeError;
use crate::evaluation::ScoringConfig;

/// Monotonic identifier of a submitted change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(pub u64);

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic identifier of a history entry; doubles as the config version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(pub u64);

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a change request. Approved and rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeStatus::Pending => "pending",
            ChangeStatus::Approved => "approved",
            ChangeStatus::Rejected => "rejected",
        }
    }
}

/// Administrator-proposed configuration awaiting (or past) review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    pub id: ChangeId,
    pub proposed_config: ScoringConfig,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub status: ChangeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl PendingChange {
    pub fn is_actionable(&self) -> bool {
        self.status == ChangeStatus::Pending
    }
}

/// How a history entry came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryKind {
    Bootstrap,
    Approval,
    Rollback { target: HistoryId },
}

/// Append-only record of a configuration becoming active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub config: ScoringConfig,
    pub changed_by: String,
    pub timestamp: DateTime<Utc>,
    pub source_change_id: Option<ChangeId>,
    pub kind: HistoryKind,
    #[serde(default)]
    pub changes: Vec<String>,
}

/// The active config, the change queue and the history log as one consistent record.
///
/// Transitions mutate the ledger in place; callers that need all-or-nothing
/// semantics apply them to a clone and publish the clone afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigLedger {
    active: ScoringConfig,
    changes: Vec<PendingChange>,
    history: Vec<HistoryEntry>,
    next_change_id: u64,
    next_history_id: u64,
}

impl ConfigLedger {
    /// Seed a ledger whose single history entry is the bootstrap config.
    pub fn bootstrap(config: ScoringConfig, actor: &str, now: DateTime<Utc>) -> Self {
        let entry = HistoryEntry {
            id: HistoryId(1),
            config: config.clone(),
            changed_by: actor.to_string(),
            timestamp: now,
            source_change_id: None,
            kind: HistoryKind::Bootstrap,
            changes: Vec::new(),
        };

        Self {
            active: config,
            changes: Vec::new(),
            history: vec![entry],
            next_change_id: 1,
            next_history_id: 2,
        }
    }

    pub fn active(&self) -> &ScoringConfig {
        &self.active
    }

    /// Id of the history entry the active config came from.
    pub fn active_version(&self) -> Option<HistoryId> {
        self.history.last().map(|entry| entry.id)
    }

    pub fn changes(&self) -> &[PendingChange] {
        &self.changes
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn change(&self, id: ChangeId) -> Option<&PendingChange> {
        self.changes.iter().find(|change| change.id == id)
    }

    pub fn history_entry(&self, id: HistoryId) -> Option<&HistoryEntry> {
        self.history.iter().find(|entry| entry.id == id)
    }

    /// Describe why a ledger cannot be trusted, if it cannot.
    pub fn inconsistency(&self) -> Option<String> {
        let Some(tail) = self.history.last() else {
            return Some("history is empty".to_string());
        };
        if tail.config != self.active {
            return Some(format!(
                "active config differs from history entry {}",
                tail.id
            ));
        }
        if self
            .history
            .windows(2)
            .any(|pair| pair[0].id >= pair[1].id)
        {
            return Some("history ids are not strictly increasing".to_string());
        }
        if self.history.iter().any(|entry| entry.id.0 >= self.next_history_id) {
            return Some("history id counter is behind recorded entries".to_string());
        }
        if self.changes.iter().any(|change| change.id.0 >= self.next_change_id) {
            return Some("change id counter is behind recorded changes".to_string());
        }
        None
    }

    pub(crate) fn submit(
        &mut self,
        proposed_config: ScoringConfig,
        submitted_by: &str,
        now: DateTime<Utc>,
    ) -> PendingChange {
        let change = PendingChange {
            id: ChangeId(self.next_change_id),
            proposed_config,
            submitted_by: submitted_by.to_string(),
            submitted_at: now,
            status: ChangeStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
        };
        self.next_change_id += 1;
        self.changes.push(change.clone());
        change
    }

    pub(crate) fn approve(
        &mut self,
        id: ChangeId,
        reviewed_by: &str,
        now: DateTime<Utc>,
    ) -> Result<HistoryEntry, ConfigChangeError> {
        let change = self.actionable_change_mut(id)?;
        change.status = ChangeStatus::Approved;
        change.reviewed_by = Some(reviewed_by.to_string());
        change.reviewed_at = Some(now);
        let proposed = change.proposed_config.clone();

        Ok(self.activate(proposed, reviewed_by, now, Some(id), HistoryKind::Approval))
    }

    pub(crate) fn reject(
        &mut self,
        id: ChangeId,
        reviewed_by: &str,
        now: DateTime<Utc>,
    ) -> Result<PendingChange, ConfigChangeError> {
        let change = self.actionable_change_mut(id)?;
        change.status = ChangeStatus::Rejected;
        change.reviewed_by = Some(reviewed_by.to_string());
        change.reviewed_at = Some(now);
        Ok(change.clone())
    }

    pub(crate) fn rollback(
        &mut self,
        target: HistoryId,
        requested_by: &str,
        now: DateTime<Utc>,
    ) -> Result<HistoryEntry, ConfigChangeError> {
        let config = self
            .history_entry(target)
            .map(|entry| entry.config.clone())
            .ok_or(ConfigChangeError::HistoryNotFound(target))?;

        Ok(self.activate(
            config,
            requested_by,
            now,
            None,
            HistoryKind::Rollback { target },
        ))
    }

    fn actionable_change_mut(&mut self, id: ChangeId) -> Result<&mut PendingChange, ConfigChangeError> {
        self.changes
            .iter_mut()
            .find(|change| change.id == id && change.is_actionable())
            .ok_or(ConfigChangeError::ChangeNotFound(id))
    }

    fn activate(
        &mut self,
        config: ScoringConfig,
        changed_by: &str,
        now: DateTime<Utc>,
        source_change_id: Option<ChangeId>,
        kind: HistoryKind,
    ) -> HistoryEntry {
        let entry = HistoryEntry {
            id: HistoryId(self.next_history_id),
            changes: self.active.describe_changes(&config),
            config: config.clone(),
            changed_by: changed_by.to_string(),
            timestamp: now,
            source_change_id,
            kind,
        };
        self.next_history_id += 1;
        self.history.push(entry.clone());
        self.active = config;
        entry
    }
}
