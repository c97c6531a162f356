//! Level-payment (annuity) loan formulas
//!
//! All rates are annual percentages (4.9 means 4.9%) converted to a monthly
//! periodic rate `r = rate / 100 / 12`. A rate at or below `ZERO_RATE_EPSILON`
//! is treated as interest-free and falls back to straight-line division.

use log::debug;
use serde::{Deserialize, Serialize};

/// Periodic rates below this are treated as zero
pub const ZERO_RATE_EPSILON: f64 = 1e-12;

/// Convert an annual percentage rate to the monthly periodic rate
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

/// Level monthly payment that fully amortizes `principal` over `term_months`
///
/// payment = P·r·(1+r)^n / ((1+r)^n − 1), or P/n when r≈0.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, term_months: f64) -> f64 {
    if principal <= 0.0 || term_months <= 0.0 {
        return 0.0;
    }

    let r = monthly_rate(annual_rate_percent);
    if r.abs() < ZERO_RATE_EPSILON {
        debug!("zero-rate annuity, using linear payment for {:.2} over {} months", principal, term_months);
        return principal / term_months;
    }

    let growth_minus_one = (term_months * r.ln_1p()).exp_m1();
    principal * r * (growth_minus_one + 1.0) / growth_minus_one
}

/// Number of months needed to retire `remaining_principal` at a fixed `payment`
///
/// n = ln(1 + P·r / (payment − P·r)) / ln(1+r), equivalently
/// −ln(1 − P·r/payment) / ln(1+r). Returns `f64::INFINITY` when the payment
/// does not cover the first month's interest.
pub fn remaining_term_for_fixed_payment(
    remaining_principal: f64,
    annual_rate_percent: f64,
    payment: f64,
) -> f64 {
    if remaining_principal <= 0.0 {
        return 0.0;
    }
    if payment <= 0.0 {
        return f64::INFINITY;
    }

    let r = monthly_rate(annual_rate_percent);
    if r.abs() < ZERO_RATE_EPSILON {
        return remaining_principal / payment;
    }

    let interest_share = remaining_principal * r / payment;
    if interest_share >= 1.0 {
        return f64::INFINITY;
    }

    -(-interest_share).ln_1p() / r.ln_1p()
}

/// Total interest paid over the life of a level-payment loan
pub fn total_interest(principal: f64, annual_rate_percent: f64, term_months: f64) -> f64 {
    let payment = monthly_payment(principal, annual_rate_percent, term_months);
    (payment * term_months - principal).max(0.0)
}

/// Total interest under equal-principal repayment: P·r·(n+1)/2
pub fn equal_principal_total_interest(principal: f64, annual_rate_percent: f64, term_months: f64) -> f64 {
    if principal <= 0.0 || term_months <= 0.0 {
        return 0.0;
    }
    principal * monthly_rate(annual_rate_percent) * (term_months + 1.0) / 2.0
}

/// First (largest) payment under equal-principal repayment: P/n + P·r
pub fn equal_principal_first_payment(principal: f64, annual_rate_percent: f64, term_months: f64) -> f64 {
    if principal <= 0.0 || term_months <= 0.0 {
        return 0.0;
    }
    principal / term_months + principal * monthly_rate(annual_rate_percent)
}

/// One month of a level-payment amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Month number (1-indexed)
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    /// Balance after this month's payment
    pub remaining_balance: f64,
}

/// Month-by-month schedule for a level-payment loan
///
/// The final row absorbs accumulated rounding so the balance ends at zero.
pub fn amortization_schedule(principal: f64, annual_rate_percent: f64, term_months: u32) -> Vec<ScheduleRow> {
    if principal <= 0.0 || term_months == 0 {
        return Vec::new();
    }

    let r = monthly_rate(annual_rate_percent);
    let payment = monthly_payment(principal, annual_rate_percent, term_months as f64);
    let mut balance = principal;
    let mut rows = Vec::with_capacity(term_months as usize);

    for month in 1..=term_months {
        let interest = balance * r;
        let mut principal_part = payment - interest;
        let mut row_payment = payment;

        if month == term_months {
            principal_part = balance;
            row_payment = balance + interest;
        }

        balance = (balance - principal_part).max(0.0);
        rows.push(ScheduleRow {
            month,
            payment: row_payment,
            interest,
            principal: principal_part,
            remaining_balance: balance,
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    #[test]
    fn test_reference_mortgage_payment() {
        // 2,000,000 at 4.9% over 25 years
        let payment = monthly_payment(2_000_000.0, 4.9, 300.0);
        assert_relative_eq!(payment, 11_575.57, epsilon = 0.01);
        assert!((payment - 11_606.0).abs() / 11_606.0 < 0.005, "payment was {}", payment);
    }

    #[test]
    fn test_zero_rate_falls_back_to_linear() {
        let payment = monthly_payment(120_000.0, 0.0, 120.0);
        assert_abs_diff_eq!(payment, 1_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(remaining_term_for_fixed_payment(120_000.0, 0.0, 1_000.0), 120.0, epsilon = 1e-9);
    }

    #[test]
    fn test_term_recovery() {
        let payment = monthly_payment(500_000.0, 3.25, 240.0);
        let term = remaining_term_for_fixed_payment(500_000.0, 3.25, payment);
        assert_relative_eq!(term, 240.0, epsilon = 1e-6);
    }

    #[test]
    fn test_payment_below_interest_never_amortizes() {
        // Monthly interest on 1,000,000 at 6% is 5,000
        let term = remaining_term_for_fixed_payment(1_000_000.0, 6.0, 4_000.0);
        assert!(term.is_infinite());
    }

    #[test]
    fn test_monotonic_in_principal_and_rate() {
        let base = monthly_payment(1_000_000.0, 4.0, 360.0);
        assert!(monthly_payment(1_100_000.0, 4.0, 360.0) > base);
        assert!(monthly_payment(1_000_000.0, 4.5, 360.0) > base);
    }

    #[test]
    fn test_equal_principal_cheaper_than_annuity() {
        let annuity = total_interest(1_000_000.0, 4.9, 360.0);
        let equal_principal = equal_principal_total_interest(1_000_000.0, 4.9, 360.0);
        assert!(equal_principal < annuity);
        assert!(equal_principal_first_payment(1_000_000.0, 4.9, 360.0) > monthly_payment(1_000_000.0, 4.9, 360.0));
    }

    #[test]
    fn test_schedule_ends_at_zero() {
        let rows = amortization_schedule(300_000.0, 4.1, 180);
        assert_eq!(rows.len(), 180);
        assert_abs_diff_eq!(rows.last().unwrap().remaining_balance, 0.0, epsilon = 1e-6);

        let interest: f64 = rows.iter().map(|r| r.interest).sum();
        assert_relative_eq!(interest, total_interest(300_000.0, 4.1, 180.0), max_relative = 1e-6);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(monthly_payment(0.0, 4.0, 120.0), 0.0);
        assert_eq!(monthly_payment(100.0, 4.0, 0.0), 0.0);
        assert_eq!(remaining_term_for_fixed_payment(0.0, 4.0, 100.0), 0.0);
        assert!(amortization_schedule(100.0, 4.0, 0).is_empty());
    }

    proptest! {
        #[test]
        fn prop_payments_cover_principal(
            principal in 1.0f64..5_000_000.0,
            rate in 0.0f64..15.0,
            term in 1u32..480,
        ) {
            let payment = monthly_payment(principal, rate, term as f64);
            prop_assert!(payment * term as f64 >= principal * (1.0 - 1e-12));
        }

        #[test]
        fn prop_term_round_trips(
            principal in 1_000.0f64..5_000_000.0,
            rate in 0.1f64..15.0,
            term in 1u32..480,
        ) {
            let payment = monthly_payment(principal, rate, term as f64);
            let recovered = remaining_term_for_fixed_payment(principal, rate, payment);
            prop_assert!((recovered - term as f64).abs() < 1e-6 * term as f64 + 1e-6);
        }
    }
}
