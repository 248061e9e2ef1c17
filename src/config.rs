//! Engine configuration.
//!
//! Minimum visible range, frame rate and tick clutter thresholds. Loaded from
//! TOML by the host; every field falls back to its default when omitted.

use serde::{Deserialize, Serialize};

use crate::core::error::RangeError;
use crate::core::time::TimeValue;

/// Range engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Narrowest visible window allowed while the outer range is wide enough
    pub minimum_visible_range: TimeValue,
    pub frames_per_second: u32,
    /// Minimum pixel gap between minor ticks
    pub minor_tick_threshold: f64,
    /// Minimum pixel gap between major ticks
    pub major_tick_threshold: f64,
    /// Rendered width of a tick, subtracted from each gap
    pub tick_thickness: f64,
    pub default_start: TimeValue,
    pub default_end: TimeValue,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            minimum_visible_range: TimeValue::ONE,
            frames_per_second: 30,
            minor_tick_threshold: 8.0,
            major_tick_threshold: 60.0,
            tick_thickness: 1.0,
            default_start: TimeValue::ZERO,
            default_end: TimeValue::from_secs(10),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(text: &str) -> Result<Self, RangeError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RangeError> {
        if !self.minimum_visible_range.is_positive() {
            return Err(RangeError::Config(format!(
                "minimum_visible_range must be positive, got {}",
                self.minimum_visible_range
            )));
        }
        if self.frames_per_second == 0 {
            return Err(RangeError::Config("frames_per_second must be at least 1".into()));
        }
        let thresholds = [
            ("minor_tick_threshold", self.minor_tick_threshold),
            ("major_tick_threshold", self.major_tick_threshold),
            ("tick_thickness", self.tick_thickness),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(RangeError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.default_start > self.default_end {
            return Err(RangeError::Config(format!(
                "default_start {} is after default_end {}",
                self.default_start, self.default_end
            )));
        }
        Ok(())
    }
}
