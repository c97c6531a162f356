//! Host-facing facade over one planning flow
//!
//! Wraps an [`OptimizationSession`] and a [`ProjectionCurveBuilder`] so the
//! presentation layer can drive the whole flow through a single value.

use crate::account::{AccountField, FieldValue, MortgageAccount};
use crate::assumptions::Assumptions;
use crate::chart::{ChartSeries, ChartSeriesAdapter};
use crate::error::Result;
use crate::interpolation::{InterpolationMode, KeyframeSeries};
use crate::levers::{EffectSummary, LeverKind};
use crate::projection::{Projection, ProjectionCurveBuilder, ProjectionUnit};
use crate::session::{OptimizationSession, SessionParts, TransitionOutcome};

/// Planning flow for one household
///
/// # Example
/// ```ignore
/// let mut planner = Planner::new(accounts, Assumptions::default_planning())?;
/// let summary = planner.preview_step(LeverKind::Prepayment)?;
/// planner.confirm_step(LeverKind::Prepayment);
/// let projection = planner.get_projection(30, 65, ProjectionUnit::Age)?;
/// ```
#[derive(Debug, Clone)]
pub struct Planner {
    session: OptimizationSession,
    curve: ProjectionCurveBuilder,
}

impl Planner {
    pub fn new(accounts: Vec<MortgageAccount>, assumptions: Assumptions) -> Result<Self> {
        Ok(Self::from_session(OptimizationSession::new(accounts, assumptions)?))
    }

    /// Resume from state the host persisted
    pub fn from_parts(parts: SessionParts) -> Result<Self> {
        Ok(Self::from_session(OptimizationSession::from_parts(parts)?))
    }

    /// Baseline curve follows the session's phase model
    pub fn from_session(session: OptimizationSession) -> Self {
        let curve = ProjectionCurveBuilder::new(session.assumptions().baseline.clone());
        Self { session, curve }
    }

    /// Replace the baseline with host-supplied anchors
    pub fn with_baseline_series(mut self, series: KeyframeSeries, mode: InterpolationMode) -> Self {
        self.curve = ProjectionCurveBuilder::with_series(series, mode);
        self
    }

    pub fn session(&self) -> &OptimizationSession {
        &self.session
    }

    pub fn into_parts(self) -> SessionParts {
        self.session.into_parts()
    }

    /// Update one account field by its host-facing name
    ///
    /// Unknown field names are an error; unknown account ids are ignored
    /// and reported as `Ok(false)`.
    pub fn update_account(&mut self, id: u32, field: &str, value: impl Into<FieldValue>) -> Result<bool> {
        let field: AccountField = field.parse()?;
        self.session.update_account(id, field, value.into())
    }

    pub fn set_budget_adjustment(&mut self, income_increase: f64, expense_reduction: f64) -> Result<()> {
        self.session.set_budget_adjustment(income_increase, expense_reduction)
    }

    pub fn preview_step(&mut self, lever: LeverKind) -> Result<EffectSummary> {
        self.session.preview(lever)
    }

    pub fn confirm_step(&mut self, lever: LeverKind) -> TransitionOutcome {
        self.session.confirm(lever)
    }

    pub fn reject_step(&mut self, lever: LeverKind) -> TransitionOutcome {
        self.session.reject(lever)
    }

    /// Baseline and optimized values for every unit of the domain
    pub fn get_projection(&self, domain_start: i32, domain_end: i32, unit: ProjectionUnit) -> Result<Projection> {
        self.curve.projection(
            domain_start,
            domain_end,
            unit,
            self.session.cumulative_annual_improvement(),
        )
    }

    /// Projection shaped for a chart widget
    pub fn chart(&self, domain_start: i32, domain_end: i32, unit: ProjectionUnit) -> Result<ChartSeries> {
        let projection = self.get_projection(domain_start, domain_end, unit)?;
        Ok(ChartSeriesAdapter::from_projection(&projection))
    }

    pub fn get_keyframe_value(series: &KeyframeSeries, x: f64, mode: InterpolationMode) -> f64 {
        crate::interpolation::get_keyframe_value(series, x, mode)
    }
}
