//! Debt-optimization levers and the calculator that prices them

mod calculator;
mod effect;
mod lever;

pub use calculator::LeverEffectCalculator;
pub use effect::{AccountEffect, EffectSummary, LeverEffect};
pub use lever::{LeverKind, OptimizationLever, PrepaymentMode, DEFAULT_FUND_RATE_PERCENT};
