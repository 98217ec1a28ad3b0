use std::f32::consts::PI;

use crate::params::AnimationParams;

/// Fold a continuous azimuth (radians) into a [0, 1] ping-pong value.
///
/// Facing azimuth 0 gives 1, a quarter turn gives 0, a half turn 1 again.
pub fn fold_azimuth(azimuth: f32) -> f32 {
    let turns = (azimuth / PI).rem_euclid(1.0);
    ((turns - 0.5).abs() * 2.0).clamp(0.0, 1.0)
}

/// Drives `progress` from the camera azimuth once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressDriver {
    pub enabled: bool,
    last: Option<f32>,
}

impl Default for ProgressDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressDriver {
    pub fn new() -> Self {
        Self {
            enabled: true,
            last: None,
        }
    }

    /// Write the folded azimuth into `params`.
    ///
    /// Returns the progress written, or `None` when the driver is disabled
    /// or the azimuth is not finite; `params` is left alone in that case.
    pub fn apply(&mut self, azimuth: f32, params: &mut AnimationParams) -> Option<f32> {
        if !self.enabled || !azimuth.is_finite() {
            return None;
        }

        let progress = fold_azimuth(azimuth);
        params.progress = progress;
        if self.last != Some(progress) {
            log::trace!("progress {:.4} from azimuth {:.4}", progress, azimuth);
        }
        self.last = Some(progress);
        Some(progress)
    }

    /// Last progress value written
    pub fn last(&self) -> Option<f32> {
        self.last
    }
}
