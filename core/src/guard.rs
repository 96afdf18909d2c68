//! Pre-run checks
//!
//! Every check here runs before the first host mutation, so a failure
//! leaves the scene untouched.

use crate::config::{PivotAnchor, TransformConfig};
use crate::error::RunError;
use crate::host::ItemId;

/// Fail with [`RunError::EmptySelection`] when nothing is selected
pub fn validate_selection(items: &[ItemId]) -> Result<(), RunError> {
    if items.is_empty() {
        return Err(RunError::EmptySelection);
    }
    Ok(())
}

/// Resolve the configured pivot name, failing with [`RunError::InvalidPivot`]
/// unless it is exactly one of the seven anchor names
pub fn validate_pivot(name: &str) -> Result<PivotAnchor, RunError> {
    PivotAnchor::from_name(name).ok_or_else(|| RunError::InvalidPivot(name.to_string()))
}

/// Range validation, surfaced as a run error
pub fn validate_config(config: &TransformConfig) -> Result<(), RunError> {
    config.validate()?;
    Ok(())
}
