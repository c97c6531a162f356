//! Field-level account updates issued by the host

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RepaymentMethod;
use crate::error::{PlannerError, Result};
use crate::levers::{LeverKind, PrepaymentMode};

/// Every account or lever parameter the host may edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountField {
    Principal,
    AnnualRatePercent,
    RemainingTermMonths,
    RepaymentMethod,
    ConvertAmount,
    FundRatePercent,
    FeeRatePercent,
    LprBasisPointDelta,
    NewMethod,
    PrepaymentAmount,
    PrepaymentMode,
    DefermentMonths,
}

impl AccountField {
    const NAMES: [(AccountField, &'static str); 12] = [
        (AccountField::Principal, "principal"),
        (AccountField::AnnualRatePercent, "annualRatePercent"),
        (AccountField::RemainingTermMonths, "remainingTermMonths"),
        (AccountField::RepaymentMethod, "repaymentMethod"),
        (AccountField::ConvertAmount, "convertAmount"),
        (AccountField::FundRatePercent, "fundRatePercent"),
        (AccountField::FeeRatePercent, "feeRatePercent"),
        (AccountField::LprBasisPointDelta, "lprBasisPointDelta"),
        (AccountField::NewMethod, "newMethod"),
        (AccountField::PrepaymentAmount, "prepaymentAmount"),
        (AccountField::PrepaymentMode, "prepaymentMode"),
        (AccountField::DefermentMonths, "defermentMonths"),
    ];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(field, _)| field == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    /// Lever whose parameters this field edits, if any
    pub fn lever_kind(&self) -> Option<LeverKind> {
        match self {
            AccountField::ConvertAmount | AccountField::FundRatePercent | AccountField::FeeRatePercent => {
                Some(LeverKind::CommercialToFundConversion)
            }
            AccountField::LprBasisPointDelta => Some(LeverKind::FixedToFloatingConversion),
            AccountField::NewMethod => Some(LeverKind::PaymentMethodChange),
            AccountField::PrepaymentAmount | AccountField::PrepaymentMode => Some(LeverKind::Prepayment),
            AccountField::DefermentMonths => Some(LeverKind::Deferment),
            AccountField::Principal
            | AccountField::AnnualRatePercent
            | AccountField::RemainingTermMonths
            | AccountField::RepaymentMethod => None,
        }
    }
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountField {
    type Err = PlannerError;

    /// Accepts camelCase or snake_case names
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s.chars().filter(|c| *c != '_').collect::<String>().to_ascii_lowercase();
        Self::NAMES
            .iter()
            .find(|(_, name)| name.to_ascii_lowercase() == normalized)
            .map(|(field, _)| *field)
            .ok_or_else(|| PlannerError::UnknownField(s.to_string()))
    }
}

/// New value for an [`AccountField`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Mode(PrepaymentMode),
    Method(RepaymentMethod),
}

impl FieldValue {
    pub(crate) fn number(self, field: AccountField) -> Result<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Ok(n),
            other => Err(mismatch(field, other)),
        }
    }

    pub(crate) fn whole_number(self, field: AccountField) -> Result<u32> {
        match self {
            FieldValue::Number(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => {
                Ok(n as u32)
            }
            other => Err(mismatch(field, other)),
        }
    }

    pub(crate) fn mode(self, field: AccountField) -> Result<PrepaymentMode> {
        match self {
            FieldValue::Mode(mode) => Ok(mode),
            other => Err(mismatch(field, other)),
        }
    }

    pub(crate) fn method(self, field: AccountField) -> Result<RepaymentMethod> {
        match self {
            FieldValue::Method(method) => Ok(method),
            other => Err(mismatch(field, other)),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<PrepaymentMode> for FieldValue {
    fn from(value: PrepaymentMode) -> Self {
        FieldValue::Mode(value)
    }
}

impl From<RepaymentMethod> for FieldValue {
    fn from(value: RepaymentMethod) -> Self {
        FieldValue::Method(value)
    }
}

fn mismatch(field: AccountField, value: FieldValue) -> PlannerError {
    PlannerError::Validation {
        field: field.as_str(),
        reason: format!("unsupported value {:?}", value),
    }
}
