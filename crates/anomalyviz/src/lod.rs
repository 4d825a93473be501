// Zoom-based visibility for marker spheres and labels

use crate::config::ConfigError;
use glam::Vec3;

pub const DEFAULT_UPDATE_FREQUENCY: u32 = 25;

/// Zoom levels (pixels per globe unit) below which parts of a marker hide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodThresholds {
    pub sphere_min_zoom: f32,
    pub label_min_zoom: f32,
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self {
            sphere_min_zoom: 100.0,
            label_min_zoom: 300.0,
        }
    }
}

impl LodThresholds {
    /// Labels must drop out before spheres when zooming out.
    pub fn new(sphere_min_zoom: f32, label_min_zoom: f32) -> Result<Self, ConfigError> {
        if !(label_min_zoom > sphere_min_zoom) {
            return Err(ConfigError::Invalid(format!(
                "label zoom threshold {label_min_zoom} must exceed sphere threshold {sphere_min_zoom}"
            )));
        }
        Ok(Self {
            sphere_min_zoom,
            label_min_zoom,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LodDecision {
    pub sphere_visible: bool,
    pub label_visible: bool,
}

/// Re-evaluates visibility every `update_frequency` rendered frames.
///
/// Holds no per-frame state; the caller owns the frame counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodController {
    update_frequency: u32,
    thresholds: LodThresholds,
}

impl Default for LodController {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_FREQUENCY, LodThresholds::default())
    }
}

impl LodController {
    pub fn new(update_frequency: u32, thresholds: LodThresholds) -> Self {
        Self {
            update_frequency: update_frequency.max(1),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> LodThresholds {
        self.thresholds
    }

    pub fn should_update(&self, frame: u64) -> bool {
        frame % u64::from(self.update_frequency) == 0
    }

    pub fn decide(&self, zoom: f32) -> LodDecision {
        LodDecision {
            sphere_visible: zoom >= self.thresholds.sphere_min_zoom,
            label_visible: zoom >= self.thresholds.label_min_zoom,
        }
    }

    /// `Some` on throttled frames, `None` in between.
    pub fn evaluate(&self, frame: u64, zoom: f32) -> Option<LodDecision> {
        self.should_update(frame).then(|| self.decide(zoom))
    }
}

/// Whether a point on the globe surface is on the hemisphere facing the
/// camera. Labels on the far side are hidden.
pub fn faces_camera(surface_normal: Vec3, camera_position: Vec3) -> bool {
    surface_normal.dot(camera_position - surface_normal) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(50.0, false, false)]
    #[case(100.0, true, false)]
    #[case(299.0, true, false)]
    #[case(300.0, true, true)]
    #[case(1200.0, true, true)]
    fn thresholds_gate_independently(
        #[case] zoom: f32,
        #[case] sphere_visible: bool,
        #[case] label_visible: bool,
    ) {
        let controller = LodController::default();
        assert_eq!(
            controller.decide(zoom),
            LodDecision {
                sphere_visible,
                label_visible,
            }
        );
    }

    #[test]
    fn evaluates_every_nth_frame() {
        let controller = LodController::default();
        let evaluated: Vec<u64> = (0..100)
            .filter(|frame| controller.evaluate(*frame, 350.0).is_some())
            .collect();

        assert_eq!(evaluated, vec![0, 25, 50, 75]);
    }

    #[test]
    fn zero_frequency_means_every_frame() {
        let controller = LodController::new(0, LodThresholds::default());
        assert!((0..10).all(|frame| controller.should_update(frame)));
    }

    #[test]
    fn label_threshold_must_exceed_sphere_threshold() {
        assert!(LodThresholds::new(300.0, 100.0).is_err());
        assert!(LodThresholds::new(100.0, 100.0).is_err());
        assert!(LodThresholds::new(100.0, 300.0).is_ok());
    }

    #[rstest]
    #[case(Vec3::X, Vec3::new(5.0, 0.0, 0.0), true)]
    #[case(Vec3::NEG_X, Vec3::new(5.0, 0.0, 0.0), false)]
    #[case(Vec3::Y, Vec3::new(3.0, 3.0, 3.0), true)]
    fn hemisphere_check(#[case] normal: Vec3, #[case] camera: Vec3, #[case] expected: bool) {
        assert_eq!(faces_camera(normal, camera), expected);
    }
}
