//! Multi-decade baseline and optimized curves

mod builder;
mod phase;

pub use builder::{Projection, ProjectionCurveBuilder, ProjectionPoint, ProjectionUnit};
pub use phase::BaselinePhaseModel;
