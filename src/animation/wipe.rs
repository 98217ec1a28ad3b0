use glam::Vec4;
use serde::{Deserialize, Serialize};

use super::lanes::{CpuLanes, Lanes};
use super::transform::staggered_progress;

/// Width of the blend band in wipe-sample units
pub const WIPE_THRESHOLD: f32 = 1.0;

/// Colors and stagger strength of the surface wipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WipeStyle {
    pub color_a: [f32; 4],
    pub color_b: [f32; 4],
    pub force: f32,
}

impl Default for WipeStyle {
    fn default() -> Self {
        Self {
            color_a: [1.0, 0.3, 0.3, 1.0],
            color_b: [1.0, 233.0 / 255.0, 174.0 / 255.0, 0.5],
            force: 0.5,
        }
    }
}

/// Blend factor between `color_a` (0) and `color_b` (1).
pub fn wipe_mix_factor<L: Lanes>(
    l: &L,
    sample: &L::Scalar,
    phase: &L::Scalar,
    progress: &L::Scalar,
    force: &L::Scalar,
) -> L::Scalar {
    let local = staggered_progress(l, progress, force, phase);
    let threshold = l.scalar(WIPE_THRESHOLD);

    let band = l.add(&l.scalar(1.0), &l.mul(&l.scalar(2.0), &threshold));
    let r = l.sub(&l.mul(&local, &band), &threshold);
    l.clamp(
        &l.div(&l.sub(sample, &r), &threshold),
        &l.scalar(0.0),
        &l.scalar(1.0),
    )
}

/// `a * (1 - t) + b * t`, exact at both ends
#[inline]
pub fn mix(a: Vec4, b: Vec4, t: f32) -> Vec4 {
    a * (1.0 - t) + b * t
}

/// Wipe color for one surface sample, evaluated on the CPU
pub fn wipe_color(
    sample: f32,
    height_phase: f32,
    progress: f32,
    color_a: Vec4,
    color_b: Vec4,
    force: f32,
) -> Vec4 {
    let t = wipe_mix_factor(&CpuLanes, &sample, &height_phase, &progress, &force);
    mix(color_a, color_b, t)
}
