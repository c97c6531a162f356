//! Parametric "current state" curve
//!
//! The baseline runs through four phases measured from the start of the
//! domain: a pre-event trend, an event drawdown, a recovery climb and a
//! stabilization trend. Each phase is a straight line, so a unit's value
//! depends only on its offset from the domain start. A bounded two-wave sine
//! term keyed on the unit index is layered on top.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::interpolation::{Keyframe, KeyframeSeries};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaselinePhaseModel {
    /// Curve value at the first unit of the domain
    pub start_value: f64,

    /// Growth per unit before the event
    pub trend_per_unit: f64,

    /// Units from the domain start to the start of the event
    pub event_offset: f64,

    /// Length of the event phase in units
    pub event_duration: f64,

    /// Share of the curve value lost across the event (0 to 1)
    pub event_drawdown: f64,

    /// Length of the recovery phase in units
    pub recovery_duration: f64,

    /// Growth per unit while recovering
    pub recovery_slope: f64,

    /// Growth per unit after recovery
    pub stabilization_trend_per_unit: f64,

    /// Peak size of the oscillatory term
    pub oscillation_amplitude: f64,

    /// Period of the oscillatory term in units
    pub oscillation_period: f64,
}

impl Default for BaselinePhaseModel {
    fn default() -> Self {
        Self {
            start_value: 200_000.0,
            trend_per_unit: 15_000.0,
            event_offset: 10.0,
            event_duration: 3.0,
            event_drawdown: 0.25,
            recovery_duration: 5.0,
            recovery_slope: 20_000.0,
            stabilization_trend_per_unit: 12_000.0,
            oscillation_amplitude: 4_000.0,
            oscillation_period: 7.0,
        }
    }
}

impl BaselinePhaseModel {
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("start_value", self.start_value),
            ("trend_per_unit", self.trend_per_unit),
            ("recovery_slope", self.recovery_slope),
            ("stabilization_trend_per_unit", self.stabilization_trend_per_unit),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(PlannerError::validation(field, format!("must be finite, got {}", value)));
            }
        }

        if !self.event_offset.is_finite() || self.event_offset < 0.0 {
            return Err(PlannerError::validation(
                "event_offset",
                format!("must be non-negative, got {}", self.event_offset),
            ));
        }

        let durations = [
            ("event_duration", self.event_duration),
            ("recovery_duration", self.recovery_duration),
            ("oscillation_period", self.oscillation_period),
        ];
        for (field, value) in durations {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlannerError::validation(field, format!("must be positive, got {}", value)));
            }
        }

        if !(0.0..=1.0).contains(&self.event_drawdown) {
            return Err(PlannerError::validation(
                "event_drawdown",
                format!("must be between 0 and 1, got {}", self.event_drawdown),
            ));
        }

        if !self.oscillation_amplitude.is_finite() || self.oscillation_amplitude < 0.0 {
            return Err(PlannerError::validation(
                "oscillation_amplitude",
                format!("must be non-negative, got {}", self.oscillation_amplitude),
            ));
        }

        Ok(())
    }

    /// Phase boundaries as anchors, starting at `domain_start`
    fn phase_anchors(&self, domain_start: f64) -> Vec<Keyframe> {
        let event_start = domain_start + self.event_offset;
        let event_end = event_start + self.event_duration;
        let recovery_end = event_end + self.recovery_duration;

        let at_event_start = self.start_value + self.trend_per_unit * self.event_offset;
        let at_event_end = at_event_start * (1.0 - self.event_drawdown);
        let at_recovery_end = at_event_end + self.recovery_slope * self.recovery_duration;

        let mut anchors = vec![Keyframe::new(domain_start, self.start_value)];
        if event_start > domain_start {
            anchors.push(Keyframe::new(event_start, at_event_start));
        }
        anchors.push(Keyframe::new(event_end, at_event_end));
        anchors.push(Keyframe::new(recovery_end, at_recovery_end));
        anchors
    }

    /// Trend value at `x` given the phase anchors
    ///
    /// Straight lines between anchors; past recovery the stabilization trend
    /// continues without bound.
    fn trend_at(&self, anchors: &KeyframeSeries, x: f64) -> f64 {
        let (_, recovery_end) = anchors.domain();
        if x > recovery_end {
            anchors.linear(recovery_end) + self.stabilization_trend_per_unit * (x - recovery_end)
        } else {
            anchors.linear(x)
        }
    }

    /// Anchors the model derives, clipped to `[domain_start, domain_end]`
    ///
    /// Endpoints that fall inside a phase take that phase's trend value, so
    /// linear interpolation over the result reproduces the trend exactly.
    pub fn keyframes(&self, domain_start: f64, domain_end: f64) -> Result<KeyframeSeries> {
        self.validate()?;
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_end < domain_start {
            return Err(PlannerError::validation(
                "domain",
                format!("invalid domain [{}, {}]", domain_start, domain_end),
            ));
        }

        let phases = KeyframeSeries::new(self.phase_anchors(domain_start))?;

        let mut clipped = vec![Keyframe::new(domain_start, self.start_value)];
        clipped.extend(
            phases
                .keyframes()
                .iter()
                .filter(|k| k.x > domain_start && k.x < domain_end)
                .copied(),
        );
        if domain_end > domain_start {
            clipped.push(Keyframe::new(domain_end, self.trend_at(&phases, domain_end)));
        }

        KeyframeSeries::new(clipped)
    }

    /// Oscillatory term at a unit offset from the domain start
    ///
    /// Two half-amplitude waves, so the magnitude never exceeds the
    /// configured amplitude. Zero at the domain start.
    pub fn oscillation(&self, index: f64) -> f64 {
        let phase = TAU * index / self.oscillation_period;
        self.oscillation_amplitude * 0.5 * (phase.sin() + (0.5 * phase).sin())
    }
}
