//! Presentation shaping for projection curves
//!
//! Pairs baseline and optimized values by unit. Nothing here computes a
//! value; it only joins, orders and exposes what the projection produced.

use serde::{Deserialize, Serialize};

use crate::projection::{Projection, ProjectionPoint, ProjectionUnit};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub unit: i32,
    pub baseline: f64,
    pub optimized: f64,
}

/// Paired series ready for a chart widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub unit: ProjectionUnit,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// `(unit, baseline)` coordinates
    pub fn baseline(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.unit as f64, p.baseline)).collect()
    }

    /// `(unit, optimized)` coordinates
    pub fn optimized(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.unit as f64, p.optimized)).collect()
    }

    /// Smallest and largest value across both series, for axis bounds
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .flat_map(|p| [p.baseline, p.optimized])
            .fold(None, |bounds, v| match bounds {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub struct ChartSeriesAdapter;

impl ChartSeriesAdapter {
    /// Join two `(unit, value)` series on unit; units missing from either side are dropped
    pub fn pair(unit: ProjectionUnit, baseline: &[(i32, f64)], optimized: &[(i32, f64)]) -> ChartSeries {
        let mut points: Vec<ChartPoint> = baseline
            .iter()
            .filter_map(|&(key, base)| {
                optimized
                    .iter()
                    .find(|(other, _)| *other == key)
                    .map(|&(_, opt)| ChartPoint {
                        unit: key,
                        baseline: base,
                        optimized: opt,
                    })
            })
            .collect();
        points.sort_by_key(|p| p.unit);
        points.dedup_by_key(|p| p.unit);

        ChartSeries { unit, points }
    }

    pub fn from_points(unit: ProjectionUnit, points: &[ProjectionPoint]) -> ChartSeries {
        let mut points: Vec<ChartPoint> = points
            .iter()
            .map(|p| ChartPoint {
                unit: p.unit,
                baseline: p.baseline_value,
                optimized: p.optimized_value,
            })
            .collect();
        points.sort_by_key(|p| p.unit);

        ChartSeries { unit, points }
    }

    pub fn from_projection(projection: &Projection) -> ChartSeries {
        Self::from_points(projection.unit, &projection.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_joins_on_unit() {
        let baseline = [(32, 3.0), (30, 1.0), (31, 2.0)];
        let optimized = [(31, 12.0), (30, 11.0), (40, 99.0)];
        let series = ChartSeriesAdapter::pair(ProjectionUnit::Age, &baseline, &optimized);

        assert_eq!(
            series.points,
            vec![
                ChartPoint { unit: 30, baseline: 1.0, optimized: 11.0 },
                ChartPoint { unit: 31, baseline: 2.0, optimized: 12.0 },
            ]
        );
    }

    #[test]
    fn test_from_projection_preserves_values() {
        let projection = Projection {
            unit: ProjectionUnit::Year,
            points: vec![
                ProjectionPoint { unit: 2027, baseline_value: 5.0, optimized_value: 7.0 },
                ProjectionPoint { unit: 2026, baseline_value: 4.0, optimized_value: 6.0 },
            ],
        };
        let series = ChartSeriesAdapter::from_projection(&projection);

        assert_eq!(series.unit, ProjectionUnit::Year);
        assert_eq!(series.baseline(), vec![(2026.0, 4.0), (2027.0, 5.0)]);
        assert_eq!(series.optimized(), vec![(2026.0, 6.0), (2027.0, 7.0)]);
        assert_eq!(series.bounds(), Some((4.0, 7.0)));
    }

    #[test]
    fn test_empty_series_has_no_bounds() {
        let series = ChartSeriesAdapter::pair(ProjectionUnit::Age, &[], &[(1, 1.0)]);
        assert!(series.is_empty());
        assert_eq!(series.bounds(), None);
    }
}
