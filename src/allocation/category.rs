use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::FlowError;

/// The three buckets of the Flow method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowCategory {
    Foundation,
    Future,
    Freedom,
}

/// Inclusive percentage range a category may be set to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentBounds {
    pub min: f64,
    pub max: f64,
}

impl PercentBounds {
    pub(crate) const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64, epsilon: f64) -> bool {
        value >= self.min - epsilon && value <= self.max + epsilon
    }
}

pub const FOUNDATION_BOUNDS: PercentBounds = PercentBounds::new(30.0, 80.0);
pub const FUTURE_BOUNDS: PercentBounds = PercentBounds::new(0.0, 30.0);

impl FlowCategory {
    pub const ALL: [FlowCategory; 3] = [
        FlowCategory::Foundation,
        FlowCategory::Future,
        FlowCategory::Freedom,
    ];

    /// Bounds for categories the user can drag. Freedom has none.
    pub fn bounds(self) -> Option<PercentBounds> {
        match self {
            FlowCategory::Foundation => Some(FOUNDATION_BOUNDS),
            FlowCategory::Future => Some(FUTURE_BOUNDS),
            FlowCategory::Freedom => None,
        }
    }

    pub fn is_adjustable(self) -> bool {
        self.bounds().is_some()
    }

    pub fn label(self) -> &'static str {
        match self {
            FlowCategory::Foundation => "Foundation",
            FlowCategory::Future => "Future",
            FlowCategory::Freedom => "Freedom",
        }
    }
}

impl fmt::Display for FlowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FlowCategory {
    type Err = FlowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "foundation" => Ok(FlowCategory::Foundation),
            "future" => Ok(FlowCategory::Future),
            "freedom" => Ok(FlowCategory::Freedom),
            other => Err(FlowError::InvalidAllocation(format!(
                "unknown category `{}`",
                other
            ))),
        }
    }
}
