//! Loan Planner - mortgage optimization and projection engine for personal finance dashboards
//!
//! This library provides:
//! - Annuity and equal-principal amortization math
//! - Per-lever savings estimates across a household's mortgage accounts
//! - A preview/confirm/reject session over an ordered lever sequence
//! - Keyframe interpolation and multi-decade baseline/optimized curves
//! - Chart-ready pairing of projection series

pub mod account;
pub mod amortization;
pub mod assumptions;
pub mod chart;
pub mod error;
pub mod interpolation;
pub mod levers;
pub mod planner;
pub mod projection;
pub mod session;

// Re-export commonly used types
pub use account::{AccountField, FieldValue, LoanType, MortgageAccount, RateType, RepaymentMethod};
pub use assumptions::Assumptions;
pub use chart::{ChartSeries, ChartSeriesAdapter};
pub use error::{PlannerError, Result};
pub use interpolation::{get_keyframe_value, InterpolationMode, KeyframeSeries};
pub use levers::{EffectSummary, LeverEffectCalculator, LeverKind, OptimizationLever, PrepaymentMode};
pub use planner::Planner;
pub use projection::{Projection, ProjectionCurveBuilder, ProjectionPoint, ProjectionUnit};
pub use session::{OptimizationSession, OptimizationStep, StepStatus, TransitionOutcome};
