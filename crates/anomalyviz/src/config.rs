use crate::animator::MarkerStyle;
use crate::color::{ColorScale, ColorStop, DEFAULT_STOPS};
use crate::lod::{LodController, LodThresholds, DEFAULT_UPDATE_FREQUENCY};
use crate::playback::{
    PlaybackController, DEFAULT_DATA_LAG_YEARS, DEFAULT_MIN_YEAR, DEFAULT_TICK_INTERVAL,
};
use crate::size::SizeScale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_PATH: &str = "anomalyviz_config.toml";

static CONFIG: OnceLock<Mutex<VizConfig>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Get a copy of the current configuration, loading it on first use.
/// Falls back to defaults when the file is absent or broken.
pub fn get_config() -> VizConfig {
    let config_mutex = CONFIG.get_or_init(|| Mutex::new(load_or_default(CONFIG_PATH)));
    match config_mutex.lock() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Re-read the config file. On error the previous configuration stays.
pub fn reload_config() -> Result<(), ConfigError> {
    let new_config = VizConfig::load_from_file(CONFIG_PATH)?;
    let config_mutex = CONFIG.get_or_init(|| Mutex::new(new_config.clone()));
    match config_mutex.lock() {
        Ok(mut config) => *config = new_config,
        Err(poisoned) => *poisoned.into_inner() = new_config,
    }
    Ok(())
}

fn load_or_default(path: &str) -> VizConfig {
    if !Path::new(path).exists() {
        log::warn!("{path} not found, using default visualization settings");
        return VizConfig::default();
    }
    match VizConfig::load_from_file(path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}; using default visualization settings");
            VizConfig::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizConfig {
    pub markers: MarkerConfig,
    pub colors: ColorConfig,
    pub animation: AnimationConfig,
    pub lod: LodConfig,
    pub playback: PlaybackConfig,
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub min_size: f32,
    pub max_size: f32,
    pub min_expected_temperature: f32,
    pub max_expected_temperature: f32,
    /// Label distance from the globe center, in globe radii
    pub label_offset: f32,
    pub label_scale: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    pub stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub transition_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LodConfig {
    /// Visibility is re-evaluated once every this many frames
    pub update_frequency: u32,
    pub sphere_min_zoom: f32,
    pub label_min_zoom: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub min_year: i32,
    pub data_lag_years: i32,
    /// Overrides the clock-derived last year when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_year: Option<i32>,
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub initial_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub auto_rotate_speed: f32,
    pub distance: f32,
}

impl Default for VizConfig {
    fn default() -> Self {
        let sizes = SizeScale::default();
        let thresholds = LodThresholds::default();
        Self {
            markers: MarkerConfig {
                min_size: sizes.min_size,
                max_size: sizes.max_size,
                min_expected_temperature: sizes.min_expected,
                max_expected_temperature: sizes.max_expected,
                label_offset: 1.12,
                label_scale: 0.02,
                opacity: 0.75,
            },
            colors: ColorConfig {
                stops: DEFAULT_STOPS.to_vec(),
            },
            animation: AnimationConfig {
                transition_ms: 1000,
            },
            lod: LodConfig {
                update_frequency: DEFAULT_UPDATE_FREQUENCY,
                sphere_min_zoom: thresholds.sphere_min_zoom,
                label_min_zoom: thresholds.label_min_zoom,
            },
            playback: PlaybackConfig {
                min_year: DEFAULT_MIN_YEAR,
                data_lag_years: DEFAULT_DATA_LAG_YEARS,
                max_year: None,
                tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            },
            camera: CameraConfig {
                initial_zoom: 350.0,
                min_zoom: 30.0,
                max_zoom: 1200.0,
                rotate_speed: 0.3,
                zoom_speed: 0.2,
                auto_rotate_speed: -0.2,
                distance: 5.0,
            },
        }
    }
}

impl VizConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: VizConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.size_scale()?;
        self.color_scale()?;
        self.lod_thresholds()?;
        if self.playback.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "playback tick interval must be positive".to_string(),
            ));
        }
        if self.lod.update_frequency == 0 {
            return Err(ConfigError::Invalid(
                "lod update frequency must be at least one frame".to_string(),
            ));
        }
        if !(self.camera.min_zoom > 0.0 && self.camera.min_zoom <= self.camera.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "camera zoom range [{}, {}] is invalid",
                self.camera.min_zoom, self.camera.max_zoom
            )));
        }
        Ok(())
    }

    pub fn size_scale(&self) -> Result<SizeScale, ConfigError> {
        SizeScale::new(
            self.markers.min_size,
            self.markers.max_size,
            self.markers.min_expected_temperature,
            self.markers.max_expected_temperature,
        )
    }

    pub fn color_scale(&self) -> Result<ColorScale, ConfigError> {
        ColorScale::new(self.colors.stops.clone())
    }

    pub fn lod_thresholds(&self) -> Result<LodThresholds, ConfigError> {
        LodThresholds::new(self.lod.sphere_min_zoom, self.lod.label_min_zoom)
    }

    pub fn marker_style(&self) -> Result<MarkerStyle, ConfigError> {
        Ok(MarkerStyle {
            colors: self.color_scale()?,
            sizes: self.size_scale()?,
            transition: Duration::from_millis(self.animation.transition_ms),
        })
    }

    pub fn lod_controller(&self) -> Result<LodController, ConfigError> {
        Ok(LodController::new(
            self.lod.update_frequency,
            self.lod_thresholds()?,
        ))
    }

    /// Playback session bounded by the configured years, or by the clock
    /// when no explicit last year is set.
    pub fn playback_controller(&self, now: DateTime<Utc>) -> PlaybackController {
        let interval = Duration::from_millis(self.playback.tick_interval_ms);
        match self.playback.max_year {
            Some(max_year) => PlaybackController::new(self.playback.min_year, max_year, interval),
            None => PlaybackController::from_clock(
                self.playback.min_year,
                self.playback.data_lag_years,
                now,
                interval,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults_are_valid() {
        assert!(VizConfig::default().validate().is_ok());
    }

    #[test]
    fn toml_round_trip() {
        let config = VizConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: VizConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped: VizConfig =
            toml::from_str(include_str!("../../../anomalyviz_config.toml")).unwrap();
        assert_eq!(shipped, VizConfig::default());
    }

    #[test]
    fn optional_max_year_may_be_omitted() {
        let mut config = VizConfig::default();
        config.playback.max_year = Some(2020);
        let text = toml::to_string_pretty(&config)
            .unwrap()
            .replace("max_year = 2020\n", "");
        let parsed: VizConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.playback.max_year, None);
    }

    #[test]
    fn inverted_lod_thresholds_are_rejected() {
        let mut config = VizConfig::default();
        config.lod.label_min_zoom = 50.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn nan_color_stop_is_rejected() {
        let mut config = VizConfig::default();
        config.colors.stops[1].temperature = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let mut config = VizConfig::default();
        config.playback.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_max_year_wins_over_clock() {
        let mut config = VizConfig::default();
        config.playback.max_year = Some(2010);
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        let playback = config.playback_controller(epoch);
        assert_eq!(playback.state().max_year, 2010);
        assert_eq!(playback.tick_interval(), Duration::from_millis(1500));
    }

    #[test]
    fn marker_style_uses_configured_transition() {
        let mut config = VizConfig::default();
        config.animation.transition_ms = 250;
        let style = config.marker_style().unwrap();
        assert_eq!(style.transition, Duration::from_millis(250));
        assert_eq!(style.sizes, SizeScale::default());
    }
}
