use thiserror::Error;

use crate::allocation::FlowCategory;

/// Error type shared by the allocation engine, storage, and configuration layers.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{0} is derived from the other categories and cannot be set directly")]
    InvalidCategory(FlowCategory),
    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl FlowError {
    /// True for failures caused by caller input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FlowError::InvalidCategory(_) | FlowError::InvalidAllocation(_)
        )
    }
}
