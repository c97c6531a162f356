//! Effect records produced by the lever calculator

use std::ops::Add;

use serde::{Deserialize, Serialize};

use super::LeverKind;

/// Savings from applying one lever to one account (or the household)
///
/// Every field is clamped at zero: a lever that would cost money is reported
/// as "no benefit".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverEffect {
    /// Lifetime interest avoided
    pub interest_saved: f64,
    /// Reduction in the monthly outflow
    pub monthly_delta: f64,
    /// Months removed from the remaining term
    pub term_delta_months: f64,
    /// Annualized cash-flow improvement used for projections
    pub annual_improvement: f64,
}

impl LeverEffect {
    /// An effect with no benefit
    pub fn none() -> Self {
        Self::default()
    }

    /// Clamp negative (and non-finite) components to zero
    pub fn clamped(self) -> Self {
        Self {
            interest_saved: clamp_saving(self.interest_saved),
            monthly_delta: clamp_saving(self.monthly_delta),
            term_delta_months: clamp_saving(self.term_delta_months),
            annual_improvement: clamp_saving(self.annual_improvement),
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::none()
    }
}

impl Add for LeverEffect {
    type Output = LeverEffect;

    fn add(self, other: LeverEffect) -> LeverEffect {
        LeverEffect {
            interest_saved: self.interest_saved + other.interest_saved,
            monthly_delta: self.monthly_delta + other.monthly_delta,
            term_delta_months: self.term_delta_months + other.term_delta_months,
            annual_improvement: self.annual_improvement + other.annual_improvement,
        }
    }
}

fn clamp_saving(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// One account's share of a lever's effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountEffect {
    pub account_id: u32,
    pub effect: LeverEffect,
}

/// Effect of a lever summed across every affected account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectSummary {
    pub lever: LeverKind,
    pub interest_saved: f64,
    pub monthly_delta: f64,
    pub term_delta_months: f64,
    pub annual_improvement: f64,
    pub per_account_breakdown: Vec<AccountEffect>,
}

impl EffectSummary {
    /// Summary for a lever that touches nothing
    pub fn empty(lever: LeverKind) -> Self {
        Self::from_parts(lever, Vec::new(), None)
    }

    /// Sum per-account effects plus an optional household-level effect
    pub fn from_parts(lever: LeverKind, breakdown: Vec<AccountEffect>, household: Option<LeverEffect>) -> Self {
        let total = breakdown
            .iter()
            .map(|a| a.effect)
            .chain(household)
            .fold(LeverEffect::none(), |acc, e| acc + e);

        Self {
            lever,
            interest_saved: total.interest_saved,
            monthly_delta: total.monthly_delta,
            term_delta_months: total.term_delta_months,
            annual_improvement: total.annual_improvement,
            per_account_breakdown: breakdown,
        }
    }

    pub fn total(&self) -> LeverEffect {
        LeverEffect {
            interest_saved: self.interest_saved,
            monthly_delta: self.monthly_delta,
            term_delta_months: self.term_delta_months,
            annual_improvement: self.annual_improvement,
        }
    }
}
