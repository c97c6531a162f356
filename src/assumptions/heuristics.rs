//! Factors for the levers that are approximated rather than re-amortized
//!
//! Payment-method changes, deferment and budget adjustments report a bounded
//! annual cash-flow improvement instead of a full schedule recomputation.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeuristicFactors {
    /// Cap on a payment-method change's annual improvement, as a share of
    /// the account's annual payment
    pub payment_method_cap_ratio: f64,

    /// Longest deferment the calculator will credit
    pub deferment_max_months: u32,

    /// Share of deferred payments counted as annual relief
    pub deferment_relief_ratio: f64,

    /// Months used to annualize monthly budget deltas
    pub budget_months_per_year: f64,
}

impl Default for HeuristicFactors {
    fn default() -> Self {
        Self {
            payment_method_cap_ratio: 0.15,
            deferment_max_months: 12,
            deferment_relief_ratio: 1.0,
            budget_months_per_year: 12.0,
        }
    }
}

impl HeuristicFactors {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.payment_method_cap_ratio) {
            return Err(PlannerError::validation(
                "payment_method_cap_ratio",
                format!("must lie in [0, 1], got {}", self.payment_method_cap_ratio),
            ));
        }
        if !(0.0..=1.0).contains(&self.deferment_relief_ratio) {
            return Err(PlannerError::validation(
                "deferment_relief_ratio",
                format!("must lie in [0, 1], got {}", self.deferment_relief_ratio),
            ));
        }
        if !self.budget_months_per_year.is_finite() || self.budget_months_per_year <= 0.0 {
            return Err(PlannerError::validation(
                "budget_months_per_year",
                format!("must be positive, got {}", self.budget_months_per_year),
            ));
        }
        Ok(())
    }
}
