//! Lever-by-lever optimization session

mod machine;
mod step;

pub use machine::{OptimizationSession, SessionParts};
pub use step::{AccountSnapshot, IgnoreReason, OptimizationStep, StepSnapshot, StepStatus, TransitionOutcome};
