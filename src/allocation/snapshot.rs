use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::{FlowCategory, FOUNDATION_BOUNDS, FUTURE_BOUNDS};
use crate::errors::FlowError;

/// Tolerance for the sum-to-100 invariant.
pub const EPSILON: f64 = 1e-6;
pub const TOTAL_PERCENT: f64 = 100.0;

/// One complete Foundation/Future/Freedom split.
///
/// Freedom is always the residual of the other two; there is no way to set it
/// independently, so a snapshot built through [`AllocationSnapshot::new`] can
/// never drift away from 100%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord", into = "SnapshotRecord")]
pub struct AllocationSnapshot {
    foundation: f64,
    future: f64,
    freedom: f64,
}

impl AllocationSnapshot {
    /// Builds a validated snapshot from the two adjustable percentages.
    pub fn new(foundation: f64, future: f64) -> Result<Self, FlowError> {
        let snapshot = Self::from_parts(foundation, future);
        snapshot.validate(EPSILON)?;
        Ok(snapshot)
    }

    /// Computes freedom without validating bounds. Rounding noise just below
    /// zero is folded to zero.
    pub(crate) fn from_parts(foundation: f64, future: f64) -> Self {
        let mut freedom = TOTAL_PERCENT - foundation - future;
        if freedom < 0.0 && freedom > -EPSILON {
            freedom = 0.0;
        }
        Self {
            foundation,
            future,
            freedom,
        }
    }

    pub fn foundation(&self) -> f64 {
        self.foundation
    }

    pub fn future(&self) -> f64 {
        self.future
    }

    pub fn freedom(&self) -> f64 {
        self.freedom
    }

    pub fn percent(&self, category: FlowCategory) -> f64 {
        match category {
            FlowCategory::Foundation => self.foundation,
            FlowCategory::Future => self.future,
            FlowCategory::Freedom => self.freedom,
        }
    }

    pub fn total(&self) -> f64 {
        self.foundation + self.future + self.freedom
    }

    /// Checks bounds, non-negative freedom, and the sum-to-100 invariant.
    pub fn validate(&self, epsilon: f64) -> Result<(), FlowError> {
        for category in FlowCategory::ALL {
            let value = self.percent(category);
            if !value.is_finite() {
                return Err(FlowError::InvalidAllocation(format!(
                    "{} is not a finite percentage",
                    category
                )));
            }
        }
        if !FOUNDATION_BOUNDS.contains(self.foundation, epsilon) {
            return Err(FlowError::InvalidAllocation(format!(
                "Foundation {}% is outside {}..={}",
                self.foundation, FOUNDATION_BOUNDS.min, FOUNDATION_BOUNDS.max
            )));
        }
        if !FUTURE_BOUNDS.contains(self.future, epsilon) {
            return Err(FlowError::InvalidAllocation(format!(
                "Future {}% is outside {}..={}",
                self.future, FUTURE_BOUNDS.min, FUTURE_BOUNDS.max
            )));
        }
        if self.freedom < -epsilon {
            return Err(FlowError::InvalidAllocation(format!(
                "Freedom would be negative ({}%)",
                self.freedom
            )));
        }
        let drift = (self.total() - TOTAL_PERCENT).abs();
        if drift > epsilon {
            return Err(FlowError::InvalidAllocation(format!(
                "categories sum to {}% instead of 100%",
                self.total()
            )));
        }
        Ok(())
    }

    pub fn is_saturated(&self, epsilon: f64) -> bool {
        self.freedom.abs() <= epsilon
    }

    pub fn approx_eq(&self, other: &AllocationSnapshot, epsilon: f64) -> bool {
        FlowCategory::ALL
            .iter()
            .all(|&category| (self.percent(category) - other.percent(category)).abs() <= epsilon)
    }
}

impl Default for AllocationSnapshot {
    fn default() -> Self {
        Self::from_parts(50.0, 20.0)
    }
}

impl fmt::Display for AllocationSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Foundation {:.1}% / Future {:.1}% / Freedom {:.1}%",
            self.foundation, self.future, self.freedom
        )
    }
}

/// Wire form. Freedom is written for readability and checked on the way back in.
#[derive(Serialize, Deserialize)]
struct SnapshotRecord {
    foundation: f64,
    future: f64,
    #[serde(default)]
    freedom: Option<f64>,
}

impl TryFrom<SnapshotRecord> for AllocationSnapshot {
    type Error = FlowError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let snapshot = AllocationSnapshot::new(record.foundation, record.future)?;
        if let Some(stored) = record.freedom {
            if (stored - snapshot.freedom).abs() > EPSILON {
                return Err(FlowError::InvalidAllocation(format!(
                    "stored Freedom {}% does not match derived {}%",
                    stored, snapshot.freedom
                )));
            }
        }
        Ok(snapshot)
    }
}

impl From<AllocationSnapshot> for SnapshotRecord {
    fn from(snapshot: AllocationSnapshot) -> Self {
        Self {
            foundation: snapshot.foundation,
            future: snapshot.future,
            freedom: Some(snapshot.freedom),
        }
    }
}
