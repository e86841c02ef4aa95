pub mod json_backend;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{allocation::AllocationSnapshot, errors::FlowError};

pub type Result<T> = std::result::Result<T, FlowError>;

/// One committed allocation, kept for the history view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub committed_at: DateTime<Utc>,
    pub snapshot: AllocationSnapshot,
}

impl HistoryEntry {
    pub fn new(snapshot: AllocationSnapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            committed_at: Utc::now(),
            snapshot,
        }
    }
}

/// Durable home for the applied allocation.
///
/// The engine never touches storage; callers persist only after a preview has
/// passed validation.
pub trait AllocationStore: Send + Sync {
    /// Last stored allocation, or `None` if nothing was ever committed.
    fn load_applied(&self) -> Result<Option<AllocationSnapshot>>;
    fn save_applied(&self, snapshot: &AllocationSnapshot) -> Result<HistoryEntry>;
    /// Committed allocations, newest first.
    fn history(&self) -> Result<Vec<HistoryEntry>>;
}

pub use json_backend::{JsonStorage, FLOW_SCHEMA_VERSION};
