//! Dense baseline/optimized curve generation

use serde::{Deserialize, Serialize};

use super::BaselinePhaseModel;
use crate::error::{PlannerError, Result};
use crate::interpolation::{InterpolationMode, KeyframeSeries};

/// Axis label for projection units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectionUnit {
    #[default]
    Age,
    Year,
}

/// One unit of a projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub unit: i32,
    pub baseline_value: f64,
    pub optimized_value: f64,
}

/// A labelled projection, ordered by unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub unit: ProjectionUnit,
    pub points: Vec<ProjectionPoint>,
}

#[derive(Debug, Clone)]
enum CurveSource {
    Phase(BaselinePhaseModel),
    Series {
        series: KeyframeSeries,
        mode: InterpolationMode,
    },
}

/// Builds a value for every integer unit of a domain
///
/// The optimized curve is the baseline shifted by a uniform annual
/// improvement.
#[derive(Debug, Clone)]
pub struct ProjectionCurveBuilder {
    source: CurveSource,
}

impl ProjectionCurveBuilder {
    /// Baseline from the parametric phase model
    pub fn new(model: BaselinePhaseModel) -> Self {
        Self {
            source: CurveSource::Phase(model),
        }
    }

    /// Baseline from host-supplied anchors
    pub fn with_series(series: KeyframeSeries, mode: InterpolationMode) -> Self {
        Self {
            source: CurveSource::Series { series, mode },
        }
    }

    /// Baseline and optimized values for every unit in `[domain_start, domain_end]`
    pub fn build(&self, domain_start: i32, domain_end: i32, annual_improvement: f64) -> Result<Vec<ProjectionPoint>> {
        if !annual_improvement.is_finite() {
            return Err(PlannerError::validation(
                "annual_improvement",
                format!("must be finite, got {}", annual_improvement),
            ));
        }
        if domain_end < domain_start {
            return Ok(Vec::new());
        }

        let baseline: Vec<(i32, f64)> = match &self.source {
            CurveSource::Phase(model) => {
                let series = model.keyframes(domain_start as f64, domain_end as f64)?;
                (domain_start..=domain_end)
                    .map(|unit| {
                        let index = (unit - domain_start) as f64;
                        (unit, series.linear(unit as f64) + model.oscillation(index))
                    })
                    .collect()
            }
            CurveSource::Series { series, mode } => (domain_start..=domain_end)
                .map(|unit| (unit, series.value_at(unit as f64, *mode)))
                .collect(),
        };

        log::debug!(
            "Projected {} units [{}, {}] with offset {:.2}",
            baseline.len(),
            domain_start,
            domain_end,
            annual_improvement
        );

        Ok(baseline
            .into_iter()
            .map(|(unit, baseline_value)| ProjectionPoint {
                unit,
                baseline_value,
                optimized_value: baseline_value + annual_improvement,
            })
            .collect())
    }

    /// Same as [`build`](Self::build) with the unit label attached
    pub fn projection(
        &self,
        domain_start: i32,
        domain_end: i32,
        unit: ProjectionUnit,
        annual_improvement: f64,
    ) -> Result<Projection> {
        Ok(Projection {
            unit,
            points: self.build(domain_start, domain_end, annual_improvement)?,
        })
    }
}

impl Default for ProjectionCurveBuilder {
    fn default() -> Self {
        Self::new(BaselinePhaseModel::default())
    }
}
