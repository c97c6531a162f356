//! JSON-based assumption loader
//!
//! The host owns the storage; this module only decodes what it is handed.

use std::io::Read;

use super::Assumptions;
use crate::error::Result;

/// Loan prime rate (annual percent) used when no override is configured
pub const DEFAULT_REFERENCE_INDEX_RATE_PERCENT: f64 = 3.95;

/// Load assumptions from any reader holding a JSON document
pub fn load_assumptions_from_reader<R: Read>(reader: R) -> Result<Assumptions> {
    let assumptions: Assumptions = serde_json::from_reader(reader)?;
    assumptions.validate()?;
    Ok(assumptions)
}
