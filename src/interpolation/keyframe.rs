//! Keyframe series with smoothstep and linear interpolation
//!
//! Queries outside the keyframe range return the nearest boundary value
//! (flat extrapolation). A validated series answers every query, so lookups
//! never fail.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// A known (x, value) anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub x: f64,
    pub value: f64,
}

impl Keyframe {
    pub fn new(x: f64, value: f64) -> Self {
        Self { x, value }
    }
}

/// Easing applied between two anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterpolationMode {
    /// Cubic smoothstep: zero slope at every anchor, no overshoot
    #[default]
    Smooth,
    /// Straight line between anchors
    Linear,
}

/// Smoothstep ease `t²(3 − 2t)` on [0, 1]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Ordered anchors with strictly increasing x
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct KeyframeSeries {
    keyframes: Vec<Keyframe>,
}

impl KeyframeSeries {
    /// Validate and wrap a set of anchors
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self> {
        if keyframes.is_empty() {
            return Err(PlannerError::EmptySeries);
        }

        for (index, keyframe) in keyframes.iter().enumerate() {
            if !keyframe.x.is_finite() || !keyframe.value.is_finite() {
                return Err(PlannerError::validation(
                    "keyframe",
                    format!("keyframe {} is not finite ({}, {})", index, keyframe.x, keyframe.value),
                ));
            }
            if index > 0 && keyframe.x <= keyframes[index - 1].x {
                return Err(PlannerError::UnorderedKeyframes {
                    index,
                    previous: keyframes[index - 1].x,
                    current: keyframe.x,
                });
            }
        }

        Ok(Self { keyframes })
    }

    /// Build from `(x, value)` pairs
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        Self::new(pairs.iter().map(|&(x, value)| Keyframe::new(x, value)).collect())
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// First and last anchor x
    pub fn domain(&self) -> (f64, f64) {
        (self.first().x, self.last().x)
    }

    fn first(&self) -> &Keyframe {
        &self.keyframes[0]
    }

    fn last(&self) -> &Keyframe {
        &self.keyframes[self.keyframes.len() - 1]
    }

    /// Value at `x` using the given easing
    pub fn value_at(&self, x: f64, mode: InterpolationMode) -> f64 {
        let first = self.first();
        let last = self.last();

        if x.is_nan() || x <= first.x {
            return first.value;
        }
        if x >= last.x {
            return last.value;
        }

        // x lies strictly inside the range: find the bracketing pair
        let upper = self.keyframes.partition_point(|k| k.x <= x);
        let a = &self.keyframes[upper - 1];
        if a.x == x {
            return a.value;
        }
        let b = &self.keyframes[upper];

        let t = (x - a.x) / (b.x - a.x);
        let eased = match mode {
            InterpolationMode::Smooth => smoothstep(t),
            InterpolationMode::Linear => t,
        };
        a.value + (b.value - a.value) * eased
    }

    pub fn smooth(&self, x: f64) -> f64 {
        self.value_at(x, InterpolationMode::Smooth)
    }

    pub fn linear(&self, x: f64) -> f64 {
        self.value_at(x, InterpolationMode::Linear)
    }
}

impl TryFrom<Vec<Keyframe>> for KeyframeSeries {
    type Error = PlannerError;

    fn try_from(keyframes: Vec<Keyframe>) -> Result<Self> {
        Self::new(keyframes)
    }
}

impl From<KeyframeSeries> for Vec<Keyframe> {
    fn from(series: KeyframeSeries) -> Self {
        series.keyframes
    }
}

/// Look up a series value; the host-facing form of [`KeyframeSeries::value_at`]
pub fn get_keyframe_value(series: &KeyframeSeries, x: f64, mode: InterpolationMode) -> f64 {
    series.value_at(x, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn career_series() -> KeyframeSeries {
        KeyframeSeries::from_pairs(&[(30.0, 100.0), (40.0, 300.0), (50.0, 200.0)]).unwrap()
    }

    #[test]
    fn test_exact_anchor_values() {
        let series = career_series();
        assert_eq!(series.smooth(30.0), 100.0);
        assert_eq!(series.smooth(40.0), 300.0);
        assert_eq!(series.linear(50.0), 200.0);
    }

    #[test]
    fn test_smooth_between_descending_anchors() {
        let value = career_series().smooth(45.0);
        assert!(value > 200.0 && value < 300.0, "smooth(45) = {}", value);
    }

    #[test]
    fn test_linear_midpoint_is_mean() {
        assert_abs_diff_eq!(career_series().linear(35.0), 200.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_extrapolation() {
        let series = career_series();
        assert_eq!(series.smooth(10.0), 100.0);
        assert_eq!(series.linear(99.0), 200.0);
        assert_eq!(series.smooth(f64::NAN), 100.0);
    }

    #[test]
    fn test_single_keyframe_is_constant() {
        let series = KeyframeSeries::from_pairs(&[(5.0, 42.0)]).unwrap();
        assert_eq!(series.smooth(0.0), 42.0);
        assert_eq!(series.smooth(5.0), 42.0);
        assert_eq!(series.linear(9.0), 42.0);
    }

    #[test]
    fn test_unordered_keyframes_rejected() {
        let err = KeyframeSeries::from_pairs(&[(1.0, 0.0), (3.0, 1.0), (3.0, 2.0)]).unwrap_err();
        assert_eq!(
            err,
            PlannerError::UnorderedKeyframes {
                index: 2,
                previous: 3.0,
                current: 3.0
            }
        );
        assert_eq!(KeyframeSeries::new(Vec::new()).unwrap_err(), PlannerError::EmptySeries);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: KeyframeSeries = serde_json::from_str(r#"[{"x":0,"value":1},{"x":1,"value":2}]"#).unwrap();
        assert_eq!(ok.domain(), (0.0, 1.0));
        assert!(serde_json::from_str::<KeyframeSeries>(r#"[{"x":1,"value":1},{"x":0,"value":2}]"#).is_err());
    }

    proptest! {
        #[test]
        fn prop_anchors_are_exact(values in prop::collection::vec(-1e6f64..1e6, 1..12)) {
            let pairs: Vec<(f64, f64)> = values.iter().enumerate().map(|(i, v)| (i as f64 * 2.5, *v)).collect();
            let series = KeyframeSeries::from_pairs(&pairs).unwrap();
            for (x, v) in pairs {
                prop_assert_eq!(series.smooth(x), v);
                prop_assert_eq!(series.linear(x), v);
            }
        }

        #[test]
        fn prop_smooth_monotone_without_overshoot(
            va in -1e5f64..1e5,
            rise in 0.0f64..1e5,
            xs in prop::collection::vec(0.0f64..10.0, 2..40),
        ) {
            let vb = va + rise;
            let series = KeyframeSeries::from_pairs(&[(0.0, va), (10.0, vb)]).unwrap();
            let mut sorted = xs.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let values: Vec<f64> = sorted.iter().map(|&x| series.smooth(x)).collect();
            for pair in values.windows(2) {
                prop_assert!(pair[1] >= pair[0]);
            }
            for v in values {
                prop_assert!(v >= va && v <= vb);
            }
        }
    }
}
