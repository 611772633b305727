//! Staged, auditable changes to the active scoring configuration.
//!
//! Proposals enter a pending queue, are approved or rejected by an
//! administrator, and every activation (including rollbacks) is appended to
//! an immutable history log whose tail always equals the active config.

pub mod domain;
pub mod manager;
pub mod router;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    ChangeId, ChangeStatus, ConfigLedger, HistoryEntry, HistoryId, HistoryKind, PendingChange,
};
pub use manager::{ConfigChangeError, ConfigChangeManager, SYSTEM_ACTOR};
pub use router::{admin_router, ActiveConfigView, ReviewRequest, SubmitChangeRequest};
pub use store::{ConfigStore, InMemoryConfigStore, JsonFileConfigStore, StoreError};
