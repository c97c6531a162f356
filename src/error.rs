//! Error types for the planning engine
//!
//! Degenerate arithmetic (zero-rate annuities) and negative savings are not
//! errors: they fall back to usable estimates or clamp to zero.

use thiserror::Error;

use crate::levers::LeverKind;

/// Errors raised by account updates, series construction and session calls
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    /// A numeric or categorical input failed validation
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// Keyframe x values are not strictly increasing
    #[error("keyframe {index} has x={current} which does not follow x={previous}")]
    UnorderedKeyframes {
        index: usize,
        previous: f64,
        current: f64,
    },

    /// A keyframe series needs at least one anchor
    #[error("keyframe series is empty")]
    EmptySeries,

    /// A lever was addressed while another lever is current
    #[error("lever {requested} is not current (current: {current:?})")]
    OutOfSequence {
        requested: LeverKind,
        current: Option<LeverKind>,
    },

    /// Every lever in the sequence already has a terminal step
    #[error("optimization session has no remaining levers")]
    SessionComplete,

    /// Field name the account model does not recognize
    #[error("unknown account field: {0}")]
    UnknownField(String),

    /// CSV or JSON input could not be decoded
    #[error("parse error: {0}")]
    Parse(String),
}

impl PlannerError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        PlannerError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for PlannerError {
    fn from(err: csv::Error) -> Self {
        PlannerError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Parse(err.to_string())
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, PlannerError>;
