// Anomaly to color mapping (engine-agnostic)

use crate::config::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Color used when a country has no reading for the selected year.
/// Sits outside the green..black ramp so it never reads as a temperature.
pub const NO_DATA_COLOR: Vec3 = Vec3::ONE;

/// 0°C green, 0.5°C red, 1°C dark red, 2°C black
pub const DEFAULT_STOPS: [ColorStop; 4] = [
    ColorStop::new(0.0, [0, 128, 0]),
    ColorStop::new(0.5, [255, 0, 0]),
    ColorStop::new(1.0, [139, 0, 0]),
    ColorStop::new(2.0, [0, 0, 0]),
];

/// A fixed (temperature, color) anchor. Channels are stored in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub temperature: f32,
    pub rgb: [u8; 3],
}

impl ColorStop {
    pub const fn new(temperature: f32, rgb: [u8; 3]) -> Self {
        Self { temperature, rgb }
    }

    fn channels(&self) -> Vec3 {
        Vec3::new(self.rgb[0] as f32, self.rgb[1] as f32, self.rgb[2] as f32)
    }

    /// Stop color in normalized 0..1 space
    pub fn color(&self) -> Vec3 {
        self.channels() / 255.0
    }
}

/// Piecewise-linear color ramp over ordered stops.
///
/// Inputs between two stops interpolate linearly in RGB. Inputs outside the
/// first/last stop keep extrapolating along the nearest segment; nothing is
/// clamped, so anomalies beyond the last stop may leave the 0..1 gamut.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<ColorStop>,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            stops: DEFAULT_STOPS.to_vec(),
        }
    }
}

impl ColorScale {
    pub fn new(stops: Vec<ColorStop>) -> Result<Self, ConfigError> {
        if stops.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "color scale needs at least two stops, got {}",
                stops.len()
            )));
        }
        if let Some(stop) = stops.iter().find(|stop| !stop.temperature.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "color stop temperature {} is not a finite number",
                stop.temperature
            )));
        }
        if stops
            .windows(2)
            .any(|pair| !(pair[0].temperature < pair[1].temperature))
        {
            return Err(ConfigError::Invalid(
                "color stops must be strictly ascending by temperature".to_string(),
            ));
        }
        Ok(Self { stops })
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Map an anomaly in °C to a normalized RGB color.
    ///
    /// NaN means "no data" and yields [`NO_DATA_COLOR`].
    pub fn color_for(&self, temperature: f32) -> Vec3 {
        if temperature.is_nan() {
            return NO_DATA_COLOR;
        }

        // first segment whose upper stop is not below the input; anything past
        // the last stop stays on the last segment
        let last_segment = self.stops.len() - 2;
        let segment = self
            .stops
            .windows(2)
            .position(|pair| temperature <= pair[1].temperature)
            .unwrap_or(last_segment);

        let from = &self.stops[segment];
        let to = &self.stops[segment + 1];
        let factor = (temperature - from.temperature) / (to.temperature - from.temperature);

        interpolate(from.channels(), to.channels(), factor) / 255.0
    }
}

fn interpolate(start: Vec3, end: Vec3, factor: f32) -> Vec3 {
    start + (end - start) * factor
}
