//! Error type shared by the range model, the selection set and configuration.

use crate::core::time::{ParseTimeError, TimeValue};

/// Error type for range operations
///
/// Only directly supplied caller arguments produce errors. Corrective cascades
/// inside the range model always settle on a valid state and never fail.
#[derive(Debug, thiserror::Error)]
pub enum RangeError {
    /// Window is inverted, empty, or falls outside the bounds it must live in
    #[error("invalid range [{start}, {end}]: must be non-empty and inside [{lower}, {upper}]")]
    InvalidRange {
        start: TimeValue,
        end: TimeValue,
        lower: TimeValue,
        upper: TimeValue,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] ParseTimeError),
    #[error("Config error: {0}")]
    Config(String),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RangeError {
    pub(crate) fn invalid(
        start: TimeValue,
        end: TimeValue,
        lower: TimeValue,
        upper: TimeValue,
    ) -> Self {
        RangeError::InvalidRange {
            start,
            end,
            lower,
            upper,
        }
    }
}

/// Check that `[start, end]` is non-empty and lies inside `[lower, upper]`.
pub(crate) fn validate_window(
    start: TimeValue,
    end: TimeValue,
    lower: TimeValue,
    upper: TimeValue,
) -> Result<(), RangeError> {
    if start >= end || start < lower || end > upper {
        return Err(RangeError::invalid(start, end, lower, upper));
    }
    Ok(())
}
