//! Foundation/Future/Freedom allocation model and the preview/applied
//! reconciliation engine.

pub mod category;
pub mod engine;
pub mod impact;
pub mod snapshot;

pub use category::{FlowCategory, PercentBounds, FOUNDATION_BOUNDS, FUTURE_BOUNDS};
pub use engine::{begin_adjustment, AllocationPolicy, PreviewUpdate, ReconciliationState};
pub use impact::{
    format_cents, income_to_cents, project_impact, ImpactProjection, MAX_INCOME_CENTS,
};
pub use snapshot::{AllocationSnapshot, EPSILON, TOTAL_PERCENT};
