//! Interpolation over sparse anchor points

mod keyframe;

pub use keyframe::{get_keyframe_value, smoothstep, InterpolationMode, Keyframe, KeyframeSeries};
