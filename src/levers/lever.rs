//! Optimization levers and their parameters

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::account::RepaymentMethod;
use crate::error::{PlannerError, Result};

/// The six mutually exclusive optimization mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeverKind {
    /// Move part of a commercial loan to a provident-fund loan
    CommercialToFundConversion,
    /// Reprice a fixed-rate loan against the reference index
    FixedToFloatingConversion,
    /// Switch between equal-installment and equal-principal repayment
    PaymentMethodChange,
    /// Lump-sum early repayment
    Prepayment,
    /// Pause payments for a number of months
    Deferment,
    /// Household income/expense change (not tied to an account)
    BudgetAdjustment,
}

impl LeverKind {
    /// Default session order
    pub const ALL: [LeverKind; 6] = [
        LeverKind::CommercialToFundConversion,
        LeverKind::FixedToFloatingConversion,
        LeverKind::PaymentMethodChange,
        LeverKind::Prepayment,
        LeverKind::Deferment,
        LeverKind::BudgetAdjustment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeverKind::CommercialToFundConversion => "commercial-to-fund-conversion",
            LeverKind::FixedToFloatingConversion => "fixed-to-floating-conversion",
            LeverKind::PaymentMethodChange => "payment-method-change",
            LeverKind::Prepayment => "prepayment",
            LeverKind::Deferment => "deferment",
            LeverKind::BudgetAdjustment => "budget-adjustment",
        }
    }

    /// Whether the lever is configured per household rather than per account
    pub fn is_household(&self) -> bool {
        matches!(self, LeverKind::BudgetAdjustment)
    }
}

impl fmt::Display for LeverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a prepayment is applied to the remaining loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrepaymentMode {
    /// Keep the payment, shorten the term
    ReduceTerm,
    /// Keep the term, lower the payment
    ReducePayment,
}

/// A lever together with only the parameters it needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OptimizationLever {
    CommercialToFundConversion {
        convert_amount: f64,
        fund_rate_percent: f64,
        fee_rate_percent: f64,
    },
    FixedToFloatingConversion {
        /// Spread over the reference index, in basis points (may be negative)
        lpr_basis_point_delta: f64,
    },
    PaymentMethodChange {
        new_method: RepaymentMethod,
    },
    Prepayment {
        amount: f64,
        mode: PrepaymentMode,
    },
    Deferment {
        months: u32,
    },
    BudgetAdjustment {
        /// Monthly income increase
        income_increase: f64,
        /// Monthly expense reduction
        expense_reduction: f64,
    },
}

/// Provident-fund rate (annual percent) for five-plus-year loans
pub const DEFAULT_FUND_RATE_PERCENT: f64 = 3.1;

impl OptimizationLever {
    pub fn kind(&self) -> LeverKind {
        match self {
            OptimizationLever::CommercialToFundConversion { .. } => LeverKind::CommercialToFundConversion,
            OptimizationLever::FixedToFloatingConversion { .. } => LeverKind::FixedToFloatingConversion,
            OptimizationLever::PaymentMethodChange { .. } => LeverKind::PaymentMethodChange,
            OptimizationLever::Prepayment { .. } => LeverKind::Prepayment,
            OptimizationLever::Deferment { .. } => LeverKind::Deferment,
            OptimizationLever::BudgetAdjustment { .. } => LeverKind::BudgetAdjustment,
        }
    }

    /// Neutral parameters for a lever kind (no effect until edited)
    pub fn default_for(kind: LeverKind) -> Self {
        match kind {
            LeverKind::CommercialToFundConversion => OptimizationLever::CommercialToFundConversion {
                convert_amount: 0.0,
                fund_rate_percent: DEFAULT_FUND_RATE_PERCENT,
                fee_rate_percent: 0.0,
            },
            LeverKind::FixedToFloatingConversion => OptimizationLever::FixedToFloatingConversion {
                lpr_basis_point_delta: 0.0,
            },
            LeverKind::PaymentMethodChange => OptimizationLever::PaymentMethodChange {
                new_method: RepaymentMethod::EqualPrincipal,
            },
            LeverKind::Prepayment => OptimizationLever::Prepayment {
                amount: 0.0,
                mode: PrepaymentMode::ReduceTerm,
            },
            LeverKind::Deferment => OptimizationLever::Deferment { months: 0 },
            LeverKind::BudgetAdjustment => OptimizationLever::BudgetAdjustment {
                income_increase: 0.0,
                expense_reduction: 0.0,
            },
        }
    }

    /// Reject malformed parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            OptimizationLever::CommercialToFundConversion {
                convert_amount,
                fund_rate_percent,
                fee_rate_percent,
            } => {
                non_negative("convert_amount", convert_amount)?;
                non_negative("fund_rate_percent", fund_rate_percent)?;
                non_negative("fee_rate_percent", fee_rate_percent)?;
                if fee_rate_percent > 100.0 {
                    return Err(PlannerError::validation(
                        "fee_rate_percent",
                        format!("must not exceed 100, got {}", fee_rate_percent),
                    ));
                }
                Ok(())
            }
            OptimizationLever::FixedToFloatingConversion { lpr_basis_point_delta } => {
                if !lpr_basis_point_delta.is_finite() {
                    return Err(PlannerError::validation(
                        "lpr_basis_point_delta",
                        "must be a finite number",
                    ));
                }
                Ok(())
            }
            OptimizationLever::PaymentMethodChange { .. } | OptimizationLever::Deferment { .. } => Ok(()),
            OptimizationLever::Prepayment { amount, .. } => non_negative("prepayment_amount", amount),
            OptimizationLever::BudgetAdjustment {
                income_increase,
                expense_reduction,
            } => {
                non_negative("income_increase", income_increase)?;
                non_negative("expense_reduction", expense_reduction)
            }
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlannerError::validation(
            field,
            format!("must be a non-negative number, got {}", value),
        ));
    }
    Ok(())
}
