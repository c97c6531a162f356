//! Implied interest rate for a level-payment loan
//!
//! Solves `monthly_payment(P, rate, n) = payment` for the annual rate using
//! Newton-Raphson, falling back to bisection when the derivative vanishes or
//! the iteration fails to converge.

use super::annuity::monthly_payment;

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 200;

/// Upper bound of the search range (annual percent)
const MAX_RATE_PERCENT: f64 = 100.0;

/// Annual rate (percent) at which `payment` amortizes `principal` over `term_months`
///
/// # Returns
/// * `Some(0.0)` when the payment is exactly straight-line (`P / n`)
/// * `None` when the payment is below straight-line (negative rate) or the
///   inputs are not positive
pub fn implied_annual_rate(principal: f64, payment: f64, term_months: f64) -> Option<f64> {
    if principal <= 0.0 || payment <= 0.0 || term_months <= 0.0 {
        return None;
    }

    let linear = principal / term_months;
    if (payment - linear).abs() < TOLERANCE * linear.max(1.0) {
        return Some(0.0);
    }
    if payment < linear {
        return None;
    }

    // Initial guess: payment is mostly interest when it is large relative to P
    let mut rate = (payment / principal * 12.0 * 100.0).min(MAX_RATE_PERCENT / 2.0);

    for _ in 0..MAX_ITERATIONS {
        let residual = monthly_payment(principal, rate, term_months) - payment;
        let slope = payment_derivative(principal, rate, term_months);

        if slope.abs() < 1e-20 {
            return implied_rate_bisection(principal, payment, term_months);
        }

        let next = (rate - residual / slope).clamp(0.0, MAX_RATE_PERCENT);

        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }

        rate = next;
    }

    implied_rate_bisection(principal, payment, term_months)
}

/// Central-difference derivative of the payment with respect to the annual rate
fn payment_derivative(principal: f64, rate: f64, term_months: f64) -> f64 {
    let h = 1e-6;
    let low = (rate - h).max(0.0);
    let high = rate + h;
    (monthly_payment(principal, high, term_months) - monthly_payment(principal, low, term_months)) / (high - low)
}

/// Fallback solver using bisection over [0, MAX_RATE_PERCENT]
fn implied_rate_bisection(principal: f64, payment: f64, term_months: f64) -> Option<f64> {
    let mut low = 0.0_f64;
    let mut high = MAX_RATE_PERCENT;

    if monthly_payment(principal, high, term_months) < payment {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let residual = monthly_payment(principal, mid, term_months) - payment;

        if residual.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if residual > 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }

    Some((low + high) / 2.0)
}
