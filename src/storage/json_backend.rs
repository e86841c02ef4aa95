use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AllocationStore, HistoryEntry, Result};
use crate::{
    allocation::AllocationSnapshot,
    errors::FlowError,
    utils::persistence::{ensure_dir, read_json, write_json_atomic},
};

pub const FLOW_SCHEMA_VERSION: u32 = 1;
const DOCUMENT_FILE: &str = "flow.json";
const DEFAULT_RETENTION: usize = 5;

/// On-disk layout of `flow.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlowDocument {
    schema_version: u32,
    #[serde(default)]
    applied: Option<AllocationSnapshot>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

impl Default for FlowDocument {
    fn default() -> Self {
        Self {
            schema_version: FLOW_SCHEMA_VERSION,
            applied: None,
            history: Vec::new(),
        }
    }
}

/// Stores the applied allocation and a bounded commit history in one JSON file.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    document_path: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: PathBuf, retention: Option<usize>) -> Result<Self> {
        ensure_dir(&root)?;
        let document_path = root.join(DOCUMENT_FILE);
        Ok(Self {
            root,
            document_path,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    fn read_document(&self) -> Result<FlowDocument> {
        let Some(document) = read_json::<FlowDocument>(&self.document_path)? else {
            return Ok(FlowDocument::default());
        };
        if document.schema_version > FLOW_SCHEMA_VERSION {
            return Err(FlowError::Persistence(format!(
                "`{}` was written by a newer version (schema {})",
                self.document_path.display(),
                document.schema_version
            )));
        }
        Ok(document)
    }
}

impl AllocationStore for JsonStorage {
    fn load_applied(&self) -> Result<Option<AllocationSnapshot>> {
        Ok(self.read_document()?.applied)
    }

    fn save_applied(&self, snapshot: &AllocationSnapshot) -> Result<HistoryEntry> {
        let mut document = self.read_document()?;
        let entry = HistoryEntry::new(*snapshot);
        document.schema_version = FLOW_SCHEMA_VERSION;
        document.applied = Some(*snapshot);
        document.history.insert(0, entry.clone());
        document.history.truncate(self.retention);
        write_json_atomic(&self.document_path, &document)?;
        tracing::debug!(
            path = %self.document_path.display(),
            history = document.history.len(),
            "allocation saved"
        );
        Ok(entry)
    }

    fn history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.read_document()?.history)
    }
}
