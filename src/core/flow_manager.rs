use crate::{
    allocation::{
        project_impact, AllocationPolicy, AllocationSnapshot, FlowCategory, ImpactProjection,
        PreviewUpdate, ReconciliationState,
    },
    errors::FlowError,
    storage::{AllocationStore, HistoryEntry},
};

pub type ServiceResult<T> = Result<T, FlowError>;

/// Couples one adjustment session with a persistence backend.
///
/// Only validated previews reach storage, and `applied` moves forward only
/// after the store accepted the write.
pub struct FlowManager {
    storage: Box<dyn AllocationStore>,
    session: ReconciliationState,
}

impl FlowManager {
    /// Seeds the session from the last stored allocation, or the default
    /// 50/20/30 split when nothing has been committed yet.
    pub fn open(storage: Box<dyn AllocationStore>, policy: AllocationPolicy) -> ServiceResult<Self> {
        let applied = match storage.load_applied()? {
            Some(snapshot) => snapshot,
            None => {
                tracing::info!("no stored allocation, starting from the default split");
                AllocationSnapshot::default()
            }
        };
        Ok(Self {
            session: ReconciliationState::with_policy(applied, policy),
            storage,
        })
    }

    pub fn storage(&self) -> &dyn AllocationStore {
        self.storage.as_ref()
    }

    pub fn session(&self) -> &ReconciliationState {
        &self.session
    }

    pub fn preview(&self) -> &AllocationSnapshot {
        self.session.preview()
    }

    pub fn applied(&self) -> &AllocationSnapshot {
        self.session.applied()
    }

    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }

    /// Starts a fresh session from the applied allocation, discarding any
    /// uncommitted preview.
    pub fn begin(&mut self) -> &AllocationSnapshot {
        if self.session.is_dirty() {
            tracing::debug!(session = %self.session.session_id(), "replacing dirty session");
        }
        let applied = *self.session.applied();
        self.session = ReconciliationState::with_policy(applied, self.session.policy());
        self.session.preview()
    }

    pub fn adjust(&mut self, category: FlowCategory, raw_percent: f64) -> ServiceResult<PreviewUpdate> {
        self.session.update_preview(category, raw_percent)
    }

    /// Validates and persists the preview, then promotes it to applied.
    pub fn commit(&mut self) -> ServiceResult<AllocationSnapshot> {
        let candidate = *self.session.validate_preview()?;
        if let Err(err) = self.storage.save_applied(&candidate) {
            tracing::warn!(error = %err, "allocation not persisted, keeping previous state");
            return Err(err);
        }
        self.session.commit()
    }

    pub fn cancel(&mut self) -> AllocationSnapshot {
        self.session.cancel()
    }

    pub fn history(&self) -> ServiceResult<Vec<HistoryEntry>> {
        self.storage.history()
    }

    /// Money view of the current preview.
    pub fn impact(&self, income_cents: i64) -> ServiceResult<ImpactProjection> {
        project_impact(self.session.preview(), income_cents)
    }
}
