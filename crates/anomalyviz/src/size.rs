// Anomaly to marker size mapping

use crate::config::ConfigError;

/// Linear size ramp over a clamped temperature range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeScale {
    pub min_size: f32,
    pub max_size: f32,
    pub min_expected: f32,
    pub max_expected: f32,
}

impl Default for SizeScale {
    fn default() -> Self {
        Self {
            min_size: 0.018,
            max_size: 0.05,
            min_expected: 0.0,
            max_expected: 2.0,
        }
    }
}

impl SizeScale {
    pub fn new(
        min_size: f32,
        max_size: f32,
        min_expected: f32,
        max_expected: f32,
    ) -> Result<Self, ConfigError> {
        if !(min_size <= max_size) {
            return Err(ConfigError::Invalid(format!(
                "marker min_size {min_size} exceeds max_size {max_size}"
            )));
        }
        if !(min_expected < max_expected) {
            return Err(ConfigError::Invalid(format!(
                "expected temperature range [{min_expected}, {max_expected}] is empty"
            )));
        }
        Ok(Self {
            min_size,
            max_size,
            min_expected,
            max_expected,
        })
    }

    /// Marker radius in globe-radius units.
    ///
    /// Temperatures are clamped to the expected range first. NaN (no data)
    /// maps to the minimum size so missing countries stay small but visible.
    pub fn size_for(&self, temperature: f32) -> f32 {
        let clamped = if temperature.is_nan() {
            self.min_expected
        } else {
            temperature.clamp(self.min_expected, self.max_expected)
        };

        let fraction = (clamped - self.min_expected) / (self.max_expected - self.min_expected);
        if fraction >= 1.0 {
            return self.max_size;
        }
        (self.min_size + (self.max_size - self.min_size) * fraction).min(self.max_size)
    }
}
