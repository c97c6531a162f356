//! Mortgage account data structures

use serde::{Deserialize, Serialize};

use super::update::{AccountField, FieldValue};
use crate::amortization::monthly_payment;
use crate::error::{PlannerError, Result};
use crate::levers::{LeverKind, OptimizationLever};

/// Funding source of the loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoanType {
    /// Bank loan at a commercial rate
    Commercial,
    /// Housing provident fund loan
    ProvidentFund,
}

/// Whether the rate is locked or tracks the reference index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateType {
    Fixed,
    Floating,
}

/// Repayment schedule shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepaymentMethod {
    /// Level payment (annuity)
    EqualInstallment,
    /// Level principal, declining interest
    EqualPrincipal,
}

/// A loan participating in an optimization session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageAccount {
    /// Unique account identifier
    pub id: u32,

    /// Display name
    pub name: String,

    pub loan_type: LoanType,

    pub rate_type: RateType,

    pub repayment_method: RepaymentMethod,

    /// Outstanding principal
    pub principal: f64,

    /// Annual rate in percent (4.9 = 4.9%)
    pub annual_rate_percent: f64,

    /// Months left on the loan
    pub remaining_term_months: u32,

    /// Lever parameters configured for this account, at most one per kind
    #[serde(default)]
    pub levers: Vec<OptimizationLever>,
}

impl MortgageAccount {
    /// Create a validated equal-installment account with no levers configured
    pub fn new(
        id: u32,
        name: impl Into<String>,
        loan_type: LoanType,
        rate_type: RateType,
        principal: f64,
        annual_rate_percent: f64,
        remaining_term_months: u32,
    ) -> Result<Self> {
        let account = Self {
            id,
            name: name.into(),
            loan_type,
            rate_type,
            repayment_method: RepaymentMethod::EqualInstallment,
            principal,
            annual_rate_percent,
            remaining_term_months,
            levers: Vec::new(),
        };
        account.validate()?;
        Ok(account)
    }

    /// Builder-style lever configuration
    pub fn with_lever(mut self, lever: OptimizationLever) -> Result<Self> {
        self.set_lever(lever)?;
        Ok(self)
    }

    /// Set (or replace) the parameters for one lever kind
    pub fn set_lever(&mut self, lever: OptimizationLever) -> Result<()> {
        if lever.kind().is_household() {
            return Err(PlannerError::validation(
                "lever",
                format!("{} is configured on the household, not an account", lever.kind()),
            ));
        }
        lever.validate()?;
        self.check_lever_fits(&lever)?;

        match self.levers.iter_mut().find(|l| l.kind() == lever.kind()) {
            Some(existing) => *existing = lever,
            None => self.levers.push(lever),
        }
        Ok(())
    }

    /// Parameters configured for a lever kind
    pub fn lever(&self, kind: LeverKind) -> Option<&OptimizationLever> {
        self.levers.iter().find(|l| l.kind() == kind)
    }

    /// Whether a lever can apply to this loan at all
    pub fn is_eligible(&self, kind: LeverKind) -> bool {
        match kind {
            LeverKind::CommercialToFundConversion => self.loan_type == LoanType::Commercial,
            LeverKind::FixedToFloatingConversion => self.rate_type == RateType::Fixed,
            LeverKind::PaymentMethodChange => match self.lever(kind) {
                Some(OptimizationLever::PaymentMethodChange { new_method }) => *new_method != self.repayment_method,
                _ => false,
            },
            LeverKind::Prepayment | LeverKind::Deferment => true,
            LeverKind::BudgetAdjustment => false,
        }
    }

    /// Remaining term as a float for the annuity formulas
    pub fn term_months(&self) -> f64 {
        self.remaining_term_months as f64
    }

    /// Level payment on the current terms
    pub fn monthly_payment(&self) -> f64 {
        monthly_payment(self.principal, self.annual_rate_percent, self.term_months())
    }

    /// Apply a single field update; the account is left untouched on error
    pub fn update(&mut self, field: AccountField, value: FieldValue) -> Result<()> {
        let mut updated = self.clone();
        updated.apply(field, value)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check the core loan terms
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(PlannerError::validation(
                "principal",
                format!("must be positive, got {}", self.principal),
            ));
        }
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0.0 {
            return Err(PlannerError::validation(
                "annual_rate_percent",
                format!("must be non-negative, got {}", self.annual_rate_percent),
            ));
        }
        if self.remaining_term_months == 0 {
            return Err(PlannerError::validation("remaining_term_months", "must be positive"));
        }
        for (i, lever) in self.levers.iter().enumerate() {
            lever.validate()?;
            self.check_lever_fits(lever)?;
            if lever.kind().is_household() || self.levers[..i].iter().any(|l| l.kind() == lever.kind()) {
                return Err(PlannerError::validation(
                    "levers",
                    format!("duplicate or household lever {} on account {}", lever.kind(), self.id),
                ));
            }
        }
        Ok(())
    }

    /// Lever limits that depend on the loan's own terms
    fn check_lever_fits(&self, lever: &OptimizationLever) -> Result<()> {
        match *lever {
            OptimizationLever::CommercialToFundConversion { convert_amount, .. } if convert_amount > self.principal => {
                Err(PlannerError::validation(
                    "convert_amount",
                    format!("{} exceeds the outstanding principal {}", convert_amount, self.principal),
                ))
            }
            _ => Ok(()),
        }
    }

    fn apply(&mut self, field: AccountField, value: FieldValue) -> Result<()> {
        match field {
            AccountField::Principal => self.principal = value.number(field)?,
            AccountField::AnnualRatePercent => self.annual_rate_percent = value.number(field)?,
            AccountField::RemainingTermMonths => self.remaining_term_months = value.whole_number(field)?,
            AccountField::RepaymentMethod => self.repayment_method = value.method(field)?,
            _ => {
                let kind = field.lever_kind().ok_or_else(|| PlannerError::UnknownField(field.to_string()))?;
                let mut lever = self
                    .lever(kind)
                    .cloned()
                    .unwrap_or_else(|| OptimizationLever::default_for(kind));
                apply_lever_field(&mut lever, field, value)?;
                self.set_lever(lever)?;
            }
        }
        Ok(())
    }
}

fn apply_lever_field(lever: &mut OptimizationLever, field: AccountField, value: FieldValue) -> Result<()> {
    match (lever, field) {
        (OptimizationLever::CommercialToFundConversion { convert_amount, .. }, AccountField::ConvertAmount) => {
            *convert_amount = value.number(field)?
        }
        (OptimizationLever::CommercialToFundConversion { fund_rate_percent, .. }, AccountField::FundRatePercent) => {
            *fund_rate_percent = value.number(field)?
        }
        (OptimizationLever::CommercialToFundConversion { fee_rate_percent, .. }, AccountField::FeeRatePercent) => {
            *fee_rate_percent = value.number(field)?
        }
        (
            OptimizationLever::FixedToFloatingConversion { lpr_basis_point_delta },
            AccountField::LprBasisPointDelta,
        ) => *lpr_basis_point_delta = value.number(field)?,
        (OptimizationLever::PaymentMethodChange { new_method }, AccountField::NewMethod) => {
            *new_method = value.method(field)?
        }
        (OptimizationLever::Prepayment { amount, .. }, AccountField::PrepaymentAmount) => {
            *amount = value.number(field)?
        }
        (OptimizationLever::Prepayment { mode, .. }, AccountField::PrepaymentMode) => *mode = value.mode(field)?,
        (OptimizationLever::Deferment { months }, AccountField::DefermentMonths) => {
            *months = value.whole_number(field)?
        }
        (_, field) => return Err(PlannerError::UnknownField(field.to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levers::PrepaymentMode;

    fn test_account() -> MortgageAccount {
        MortgageAccount::new(7, "Primary", LoanType::Commercial, RateType::Fixed, 1_000_000.0, 4.2, 240).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_terms() {
        assert!(MortgageAccount::new(1, "x", LoanType::Commercial, RateType::Fixed, 0.0, 4.0, 120).is_err());
        assert!(MortgageAccount::new(1, "x", LoanType::Commercial, RateType::Fixed, 1.0, -0.1, 120).is_err());
        assert!(MortgageAccount::new(1, "x", LoanType::Commercial, RateType::Fixed, 1.0, 4.0, 0).is_err());
    }

    #[test]
    fn test_set_lever_replaces_same_kind() {
        let mut account = test_account();
        account
            .set_lever(OptimizationLever::Deferment { months: 3 })
            .unwrap();
        account
            .set_lever(OptimizationLever::Deferment { months: 6 })
            .unwrap();
        assert_eq!(account.levers.len(), 1);
        assert_eq!(account.lever(LeverKind::Deferment), Some(&OptimizationLever::Deferment { months: 6 }));
    }

    #[test]
    fn test_household_lever_rejected_on_account() {
        let err = test_account()
            .with_lever(OptimizationLever::default_for(LeverKind::BudgetAdjustment))
            .unwrap_err();
        assert!(matches!(err, PlannerError::Validation { field: "lever", .. }));
    }

    #[test]
    fn test_eligibility() {
        let account = test_account();
        assert!(account.is_eligible(LeverKind::CommercialToFundConversion));
        assert!(account.is_eligible(LeverKind::FixedToFloatingConversion));
        assert!(!account.is_eligible(LeverKind::PaymentMethodChange));
        assert!(!account.is_eligible(LeverKind::BudgetAdjustment));

        let fund =
            MortgageAccount::new(8, "Fund", LoanType::ProvidentFund, RateType::Floating, 500_000.0, 3.1, 240).unwrap();
        assert!(!fund.is_eligible(LeverKind::CommercialToFundConversion));
        assert!(!fund.is_eligible(LeverKind::FixedToFloatingConversion));
    }

    #[test]
    fn test_update_lever_field_creates_defaults() {
        let mut account = test_account();
        account
            .update(AccountField::PrepaymentAmount, FieldValue::Number(100_000.0))
            .unwrap();
        assert_eq!(
            account.lever(LeverKind::Prepayment),
            Some(&OptimizationLever::Prepayment {
                amount: 100_000.0,
                mode: PrepaymentMode::ReduceTerm,
            })
        );

        account
            .update(AccountField::PrepaymentMode, FieldValue::Mode(PrepaymentMode::ReducePayment))
            .unwrap();
        assert!(matches!(
            account.lever(LeverKind::Prepayment),
            Some(OptimizationLever::Prepayment { mode: PrepaymentMode::ReducePayment, .. })
        ));
    }

    #[test]
    fn test_failed_update_leaves_account_untouched() {
        let mut account = test_account();
        let before = account.clone();

        assert!(account.update(AccountField::Principal, FieldValue::Number(-5.0)).is_err());
        assert!(account.update(AccountField::Principal, FieldValue::Mode(PrepaymentMode::ReduceTerm)).is_err());
        assert!(account.update(AccountField::ConvertAmount, FieldValue::Number(f64::NAN)).is_err());
        assert_eq!(account, before);
    }

    #[test]
    fn test_conversion_larger_than_principal_rejected() {
        let mut account = test_account();
        let oversized = OptimizationLever::CommercialToFundConversion {
            convert_amount: 1_500_000.0,
            fund_rate_percent: 3.25,
            fee_rate_percent: 1.0,
        };
        assert!(matches!(
            account.set_lever(oversized),
            Err(PlannerError::Validation { field: "convert_amount", .. })
        ));
        assert!(account.lever(LeverKind::CommercialToFundConversion).is_none());

        account
            .update(AccountField::ConvertAmount, FieldValue::Number(800_000.0))
            .unwrap();
        let before = account.clone();
        assert!(account.update(AccountField::ConvertAmount, FieldValue::Number(1_000_001.0)).is_err());
        assert!(account.update(AccountField::Principal, FieldValue::Number(500_000.0)).is_err());
        assert_eq!(account, before);
    }

    #[test]
    fn test_update_term_requires_whole_months() {
        let mut account = test_account();
        assert!(account.update(AccountField::RemainingTermMonths, FieldValue::Number(120.5)).is_err());
        account
            .update(AccountField::RemainingTermMonths, FieldValue::Number(120.0))
            .unwrap();
        assert_eq!(account.remaining_term_months, 120);
    }
}
