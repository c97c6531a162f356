//! Annuity mathematics for level-payment loans

mod annuity;
mod rate;

pub use annuity::{
    amortization_schedule, equal_principal_first_payment, equal_principal_total_interest,
    monthly_payment, monthly_rate, remaining_term_for_fixed_payment, total_interest,
    ScheduleRow, ZERO_RATE_EPSILON,
};
pub use rate::implied_annual_rate;
