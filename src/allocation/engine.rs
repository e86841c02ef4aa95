//! Preview/applied reconciliation for an interactive adjustment session.

use uuid::Uuid;

use super::{
    category::{FlowCategory, PercentBounds, FOUNDATION_BOUNDS, FUTURE_BOUNDS},
    snapshot::{AllocationSnapshot, EPSILON, TOTAL_PERCENT},
};
use crate::errors::FlowError;

/// Tunables applied to raw slider input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationPolicy {
    pub epsilon: f64,
    /// Slider granularity. Raw input snaps to the nearest multiple before clamping.
    pub step: Option<f64>,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            step: None,
        }
    }
}

impl AllocationPolicy {
    pub fn with_step(step: f64) -> Self {
        Self {
            step: Some(step),
            ..Self::default()
        }
    }

    fn clamp(&self, bounds: PercentBounds, raw: f64) -> Result<f64, FlowError> {
        if raw.is_nan() {
            return Err(FlowError::InvalidAllocation(
                "percentage must be a number".into(),
            ));
        }
        let snapped = match self.step {
            Some(step) if step > 0.0 && raw.is_finite() => (raw / step).round() * step,
            _ => raw,
        };
        Ok(bounds.clamp(snapped))
    }
}

/// Outcome of a single drag update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewUpdate {
    pub snapshot: AllocationSnapshot,
    /// Freedom reached zero; the UI should signal a hard stop.
    pub saturated: bool,
}

/// Owns the live preview and the last committed allocation.
#[derive(Debug, Clone)]
pub struct ReconciliationState {
    session_id: Uuid,
    policy: AllocationPolicy,
    preview: AllocationSnapshot,
    applied: AllocationSnapshot,
}

/// Starts an adjustment session with the default policy.
pub fn begin_adjustment(current: AllocationSnapshot) -> ReconciliationState {
    ReconciliationState::with_policy(current, AllocationPolicy::default())
}

impl ReconciliationState {
    pub fn with_policy(current: AllocationSnapshot, policy: AllocationPolicy) -> Self {
        let session_id = Uuid::new_v4();
        tracing::debug!(session = %session_id, applied = %current, "adjustment session started");
        Self {
            session_id,
            policy,
            preview: current,
            applied: current,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    pub fn preview(&self) -> &AllocationSnapshot {
        &self.preview
    }

    pub fn applied(&self) -> &AllocationSnapshot {
        &self.applied
    }

    /// True when the preview holds changes that have not been committed.
    pub fn is_dirty(&self) -> bool {
        !self.preview.approx_eq(&self.applied, self.policy.epsilon)
    }

    /// Sets `category` on the preview, clamped to its bounds, and recomputes
    /// Freedom. When the pair would exceed 100% the other adjustable category
    /// gives way so Freedom stops at zero.
    pub fn update_preview(
        &mut self,
        category: FlowCategory,
        raw_percent: f64,
    ) -> Result<PreviewUpdate, FlowError> {
        let (foundation, future) = match category {
            FlowCategory::Foundation => {
                let value = self.policy.clamp(FOUNDATION_BOUNDS, raw_percent)?;
                (value, self.preview.future().min(TOTAL_PERCENT - value))
            }
            FlowCategory::Future => {
                let value = self.policy.clamp(FUTURE_BOUNDS, raw_percent)?;
                (self.preview.foundation().min(TOTAL_PERCENT - value), value)
            }
            FlowCategory::Freedom => {
                tracing::warn!(session = %self.session_id, "rejected direct Freedom adjustment");
                return Err(FlowError::InvalidCategory(category));
            }
        };

        self.preview = AllocationSnapshot::from_parts(foundation, future);
        let saturated = self.preview.is_saturated(self.policy.epsilon);
        tracing::debug!(
            session = %self.session_id,
            %category,
            raw_percent,
            preview = %self.preview,
            saturated,
            "preview updated"
        );
        Ok(PreviewUpdate {
            snapshot: self.preview,
            saturated,
        })
    }

    /// Checks the preview against every invariant without committing it.
    pub fn validate_preview(&self) -> Result<&AllocationSnapshot, FlowError> {
        self.preview.validate(self.policy.epsilon)?;
        Ok(&self.preview)
    }

    /// Promotes the preview to applied. `applied` is untouched on failure.
    pub fn commit(&mut self) -> Result<AllocationSnapshot, FlowError> {
        if let Err(err) = self.preview.validate(self.policy.epsilon) {
            tracing::warn!(session = %self.session_id, error = %err, "commit rejected");
            return Err(err);
        }
        self.applied = self.preview;
        tracing::info!(session = %self.session_id, applied = %self.applied, "allocation committed");
        Ok(self.applied)
    }

    /// Drops uncommitted changes.
    pub fn cancel(&mut self) -> AllocationSnapshot {
        if self.is_dirty() {
            tracing::debug!(session = %self.session_id, "preview discarded");
        }
        self.preview = self.applied;
        self.applied
    }
}
