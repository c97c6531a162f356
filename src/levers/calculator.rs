//! Per-lever savings calculator
//!
//! Each lever is evaluated against the account's current terms in isolation:
//! effects from several levers add up, they do not compound.

use log::debug;

use super::{AccountEffect, EffectSummary, LeverEffect, LeverKind, OptimizationLever, PrepaymentMode};
use crate::account::{MortgageAccount, RepaymentMethod};
use crate::amortization::{
    equal_principal_first_payment, equal_principal_total_interest, monthly_payment,
    remaining_term_for_fixed_payment, total_interest,
};
use crate::assumptions::Assumptions;

/// Computes lever effects from read-only account snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct LeverEffectCalculator {
    assumptions: Assumptions,
}

impl LeverEffectCalculator {
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Effect of `kind` summed over every eligible account
    ///
    /// Accounts without parameters for the lever, or not eligible for it,
    /// are skipped. `household` supplies the budget-adjustment parameters.
    pub fn summarize(
        &self,
        kind: LeverKind,
        accounts: &[MortgageAccount],
        household: Option<&OptimizationLever>,
    ) -> EffectSummary {
        if kind.is_household() {
            let effect = household
                .filter(|lever| lever.kind() == kind)
                .map(|lever| self.household_effect(lever));
            return EffectSummary::from_parts(kind, Vec::new(), effect);
        }

        let breakdown = accounts
            .iter()
            .filter(|account| account.is_eligible(kind))
            .filter_map(|account| {
                account.lever(kind).map(|lever| AccountEffect {
                    account_id: account.id,
                    effect: self.account_effect(account, lever),
                })
            })
            .collect();

        let summary = EffectSummary::from_parts(kind, breakdown, None);
        debug!(
            "lever {}: interest_saved={:.2} monthly_delta={:.2} term_delta={:.1} annual={:.2}",
            kind, summary.interest_saved, summary.monthly_delta, summary.term_delta_months, summary.annual_improvement
        );
        summary
    }

    /// Effect of one lever on one account
    pub fn account_effect(&self, account: &MortgageAccount, lever: &OptimizationLever) -> LeverEffect {
        let effect = match *lever {
            OptimizationLever::CommercialToFundConversion {
                convert_amount,
                fund_rate_percent,
                fee_rate_percent,
            } => self.conversion_effect(account, convert_amount, fund_rate_percent, fee_rate_percent),
            OptimizationLever::FixedToFloatingConversion { lpr_basis_point_delta } => {
                self.floating_effect(account, lpr_basis_point_delta)
            }
            OptimizationLever::PaymentMethodChange { new_method } => self.payment_method_effect(account, new_method),
            OptimizationLever::Prepayment { amount, mode } => self.prepayment_effect(account, amount, mode),
            OptimizationLever::Deferment { months } => self.deferment_effect(account, months),
            OptimizationLever::BudgetAdjustment { .. } => self.household_effect(lever),
        };
        effect.clamped()
    }

    /// Effect of a household-level lever
    pub fn household_effect(&self, lever: &OptimizationLever) -> LeverEffect {
        match *lever {
            OptimizationLever::BudgetAdjustment {
                income_increase,
                expense_reduction,
            } => {
                let monthly = income_increase + expense_reduction;
                LeverEffect {
                    interest_saved: 0.0,
                    monthly_delta: monthly,
                    term_delta_months: 0.0,
                    annual_improvement: monthly * self.assumptions.heuristics.budget_months_per_year,
                }
                .clamped()
            }
            _ => LeverEffect::none(),
        }
    }

    /// Split the principal into a fund-rate portion and a remainder at the old
    /// rate, then compare payment streams over the same term
    ///
    /// The fee is charged on the full requested amount; accounts reject a
    /// conversion larger than the principal.
    fn conversion_effect(
        &self,
        account: &MortgageAccount,
        convert_amount: f64,
        fund_rate_percent: f64,
        fee_rate_percent: f64,
    ) -> LeverEffect {
        let converted = convert_amount.min(account.principal);
        if converted <= 0.0 {
            return LeverEffect::none();
        }

        let term = account.term_months();
        let old_payment = account.monthly_payment();
        let new_payment = monthly_payment(converted, fund_rate_percent, term)
            + monthly_payment(account.principal - converted, account.annual_rate_percent, term);

        let monthly_saved = old_payment - new_payment;
        let interest_saved = monthly_saved * term - convert_amount * fee_rate_percent / 100.0;

        LeverEffect {
            interest_saved,
            monthly_delta: monthly_saved,
            term_delta_months: 0.0,
            annual_improvement: annualize(interest_saved, term),
        }
    }

    /// Reprice at the reference index plus spread for the remaining term
    fn floating_effect(&self, account: &MortgageAccount, lpr_basis_point_delta: f64) -> LeverEffect {
        let new_rate = (self.assumptions.reference_index_rate_percent + lpr_basis_point_delta / 100.0).max(0.0);
        let term = account.term_months();
        let old_payment = account.monthly_payment();
        let new_payment = monthly_payment(account.principal, new_rate, term);

        let monthly_saved = old_payment - new_payment;
        let interest_saved = monthly_saved * term;

        LeverEffect {
            interest_saved,
            monthly_delta: monthly_saved,
            term_delta_months: 0.0,
            annual_improvement: annualize(interest_saved, term),
        }
    }

    fn prepayment_effect(&self, account: &MortgageAccount, amount: f64, mode: PrepaymentMode) -> LeverEffect {
        if amount <= 0.0 {
            return LeverEffect::none();
        }

        let term = account.term_months();
        let old_payment = account.monthly_payment();

        // Full payoff
        if amount >= account.principal {
            return LeverEffect {
                interest_saved: amount,
                monthly_delta: old_payment,
                term_delta_months: term,
                annual_improvement: annualize(amount, term),
            };
        }

        let reduced_principal = account.principal - amount;
        match mode {
            PrepaymentMode::ReduceTerm => {
                let new_term =
                    remaining_term_for_fixed_payment(reduced_principal, account.annual_rate_percent, old_payment);
                let term_delta = (term - new_term).max(0.0);
                let interest_saved = old_payment * term_delta - amount;
                LeverEffect {
                    interest_saved,
                    monthly_delta: 0.0,
                    term_delta_months: term_delta,
                    annual_improvement: annualize(interest_saved, term),
                }
            }
            PrepaymentMode::ReducePayment => {
                let new_payment = monthly_payment(reduced_principal, account.annual_rate_percent, term);
                let monthly_delta = old_payment - new_payment;
                let interest_saved = monthly_delta * term - amount;
                LeverEffect {
                    interest_saved,
                    monthly_delta,
                    term_delta_months: 0.0,
                    annual_improvement: annualize(interest_saved, term),
                }
            }
        }
    }

    /// Approximation: compares lifetime interest of the two repayment methods
    /// and caps the annual improvement at a share of the annual payment
    fn payment_method_effect(&self, account: &MortgageAccount, new_method: RepaymentMethod) -> LeverEffect {
        if new_method == account.repayment_method {
            return LeverEffect::none();
        }

        let term = account.term_months();
        let payment = account.monthly_payment();
        let cap = self.assumptions.heuristics.payment_method_cap_ratio * payment * 12.0;

        match new_method {
            RepaymentMethod::EqualPrincipal => {
                let interest_saved = total_interest(account.principal, account.annual_rate_percent, term)
                    - equal_principal_total_interest(account.principal, account.annual_rate_percent, term);
                LeverEffect {
                    interest_saved,
                    monthly_delta: 0.0,
                    term_delta_months: 0.0,
                    annual_improvement: annualize(interest_saved, term).min(cap),
                }
            }
            RepaymentMethod::EqualInstallment => {
                let first_payment =
                    equal_principal_first_payment(account.principal, account.annual_rate_percent, term);
                let relief = first_payment - payment;
                LeverEffect {
                    interest_saved: 0.0,
                    monthly_delta: relief,
                    term_delta_months: 0.0,
                    annual_improvement: (relief * 12.0).min(cap),
                }
            }
        }
    }

    /// Approximation: the paused payments count as relief within one year;
    /// the interest cost of deferring is reported as no saving
    fn deferment_effect(&self, account: &MortgageAccount, months: u32) -> LeverEffect {
        let heuristics = &self.assumptions.heuristics;
        let credited = months.min(heuristics.deferment_max_months).min(12);
        if credited == 0 {
            return LeverEffect::none();
        }

        let payment = account.monthly_payment();
        LeverEffect {
            interest_saved: 0.0,
            monthly_delta: payment,
            term_delta_months: 0.0,
            annual_improvement: payment * credited as f64 * heuristics.deferment_relief_ratio,
        }
    }
}

/// Spread a lifetime saving evenly over the remaining years
fn annualize(saving: f64, term_months: f64) -> f64 {
    if term_months <= 0.0 {
        return 0.0;
    }
    saving * 12.0 / term_months
}
