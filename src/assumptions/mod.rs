//! Planning assumptions: reference rates, lever heuristics and the baseline curve model

mod heuristics;
pub mod loader;

pub use heuristics::HeuristicFactors;
pub use loader::{load_assumptions_from_reader, DEFAULT_REFERENCE_INDEX_RATE_PERCENT};

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::levers::LeverKind;
use crate::projection::BaselinePhaseModel;

/// Container for all assumptions used by a planning session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Assumptions {
    /// Reference index rate (annual percent) that floating loans reprice against
    pub reference_index_rate_percent: f64,

    /// Bounds for the approximate (non-amortizing) levers
    pub heuristics: HeuristicFactors,

    /// Order in which the session walks the levers
    pub lever_order: Vec<LeverKind>,

    /// Parametric model for the synthetic baseline curve
    pub baseline: BaselinePhaseModel,
}

impl Assumptions {
    /// Default planning assumptions
    pub fn default_planning() -> Self {
        Self {
            reference_index_rate_percent: DEFAULT_REFERENCE_INDEX_RATE_PERCENT,
            heuristics: HeuristicFactors::default(),
            lever_order: LeverKind::ALL.to_vec(),
            baseline: BaselinePhaseModel::default(),
        }
    }

    /// Parse assumptions from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let assumptions: Self = serde_json::from_str(json)?;
        assumptions.validate()?;
        Ok(assumptions)
    }

    /// Check that every configured value is usable
    pub fn validate(&self) -> Result<()> {
        if !self.reference_index_rate_percent.is_finite() || self.reference_index_rate_percent < 0.0 {
            return Err(PlannerError::validation(
                "reference_index_rate_percent",
                format!("must be a non-negative number, got {}", self.reference_index_rate_percent),
            ));
        }

        for (i, kind) in self.lever_order.iter().enumerate() {
            if self.lever_order[..i].contains(kind) {
                return Err(PlannerError::validation(
                    "lever_order",
                    format!("lever {} appears more than once", kind),
                ));
            }
        }

        self.heuristics.validate()?;
        self.baseline.validate()
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_planning()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_walks_all_levers() {
        let assumptions = Assumptions::default_planning();
        assert_eq!(assumptions.lever_order.len(), 6);
        assert_eq!(assumptions.lever_order[0], LeverKind::CommercialToFundConversion);
        assert!(assumptions.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let assumptions = Assumptions::from_json_str(r#"{"referenceIndexRatePercent": 3.5}"#).unwrap();
        assert_eq!(assumptions.reference_index_rate_percent, 3.5);
        assert_eq!(assumptions.heuristics, HeuristicFactors::default());
    }

    #[test]
    fn test_duplicate_lever_rejected() {
        let json = r#"{"leverOrder": ["prepayment", "deferment", "prepayment"]}"#;
        let err = Assumptions::from_json_str(json).unwrap_err();
        assert!(matches!(err, PlannerError::Validation { field: "lever_order", .. }));
    }

    #[test]
    fn test_negative_reference_rate_rejected() {
        let err = Assumptions::from_json_str(r#"{"referenceIndexRatePercent": -1.0}"#).unwrap_err();
        assert!(matches!(err, PlannerError::Validation { .. }));
    }

    #[test]
    fn test_json_keys_are_camel_case() {
        let value = serde_json::to_value(Assumptions::default_planning()).unwrap();
        assert!(value.get("referenceIndexRatePercent").is_some());
        assert!(value.get("leverOrder").is_some());
        assert!(value["heuristics"].get("paymentMethodCapRatio").is_some());
        assert!(value["baseline"].get("stabilizationTrendPerUnit").is_some());
        assert!(value.get("reference_index_rate_percent").is_none());

        let json = r#"{"heuristics": {"defermentReliefRatio": 0.5}, "baseline": {"eventOffset": 4.0}}"#;
        let assumptions = Assumptions::from_json_str(json).unwrap();
        assert_eq!(assumptions.heuristics.deferment_relief_ratio, 0.5);
        assert_eq!(assumptions.baseline.event_offset, 4.0);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Assumptions::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, PlannerError::Parse(_)));
    }
}
