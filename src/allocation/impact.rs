use serde::{Deserialize, Serialize};

use super::{
    category::FlowCategory,
    snapshot::{AllocationSnapshot, TOTAL_PERCENT},
};
use crate::errors::FlowError;

/// Largest income accepted from user input: ten trillion in whole units.
pub const MAX_INCOME_CENTS: i64 = 1_000_000_000_000_000;

/// Percentages are resolved to 1/10_000 of a percent before splitting.
const PERCENT_SCALE: f64 = 10_000.0;
const WHOLE_UNITS: i128 = 1_000_000;

/// Money view of a snapshot for a given monthly income, in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactProjection {
    pub income_cents: i64,
    pub foundation_cents: i64,
    pub future_cents: i64,
    pub freedom_cents: i64,
}

impl ImpactProjection {
    pub fn amount(&self, category: FlowCategory) -> i64 {
        match category {
            FlowCategory::Foundation => self.foundation_cents,
            FlowCategory::Future => self.future_cents,
            FlowCategory::Freedom => self.freedom_cents,
        }
    }

    /// Sum of the three parts, widened so hand-built projections cannot overflow.
    pub fn total(&self) -> i128 {
        FlowCategory::ALL
            .iter()
            .map(|category| i128::from(self.amount(*category)))
            .sum()
    }
}

/// Splits `income_cents` across the categories so the parts add back up to the
/// income exactly. Leftover cents go to the largest fractional shares, ties in
/// Foundation, Future, Freedom order.
pub fn project_impact(
    snapshot: &AllocationSnapshot,
    income_cents: i64,
) -> Result<ImpactProjection, FlowError> {
    if income_cents < 0 {
        return Err(FlowError::InvalidAllocation(format!(
            "income cannot be negative ({})",
            format_cents(income_cents)
        )));
    }

    // Freedom takes whatever the rounded pair leaves so the units total 100%.
    let foundation_units = (snapshot.foundation() * PERCENT_SCALE).round() as i128;
    let future_units = (snapshot.future() * PERCENT_SCALE).round() as i128;
    let units = [
        foundation_units,
        future_units,
        (WHOLE_UNITS - foundation_units - future_units).max(0),
    ];

    let income = i128::from(income_cents);
    let mut amounts = [0_i128; 3];
    let mut remainders = [0_i128; 3];
    for idx in 0..3 {
        let exact = income * units[idx];
        amounts[idx] = exact / WHOLE_UNITS;
        remainders[idx] = exact % WHOLE_UNITS;
    }

    let mut order = [0_usize, 1, 2];
    order.sort_by(|a, b| remainders[*b].cmp(&remainders[*a]));

    let leftover = income - amounts.iter().sum::<i128>();
    for idx in order.iter().take(leftover.clamp(0, 3) as usize) {
        amounts[*idx] += 1;
    }

    let part = |idx: usize| {
        i64::try_from(amounts[idx]).map_err(|_| {
            FlowError::InvalidAllocation("impact amount does not fit in cents".into())
        })
    };
    Ok(ImpactProjection {
        income_cents,
        foundation_cents: part(0)?,
        future_cents: part(1)?,
        freedom_cents: part(2)?,
    })
}

/// Converts a decimal currency amount into whole cents. Amounts above
/// [`MAX_INCOME_CENTS`] are rejected rather than saturated.
pub fn income_to_cents(amount: f64) -> Result<i64, FlowError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(FlowError::InvalidAllocation(format!(
            "income must be a non-negative amount, got {}",
            amount
        )));
    }
    let cents = (amount * 100.0).round();
    if cents > MAX_INCOME_CENTS as f64 {
        return Err(FlowError::InvalidAllocation(format!(
            "income {} exceeds the supported maximum of {}",
            amount,
            format_cents(MAX_INCOME_CENTS)
        )));
    }
    Ok(cents as i64)
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
