use std::f32::consts::PI;

use glam::Vec3;

use super::lanes::{CpuLanes, Lanes};
use crate::params::AnimationParams;

/// Per-vertex inputs of the shatter transform
pub struct VertexInputs<L: Lanes> {
    pub position: L::Vector,
    pub center: L::Vector,
    pub random: L::Scalar,
    pub centroid: L::Vector,
}

/// Frame parameters, lifted into a backend
pub struct ParamInputs<L: Lanes> {
    pub progress: L::Scalar,
    pub polar: L::Scalar,
    pub size: L::Scalar,
    pub scale: L::Scalar,
    pub local_delay: L::Scalar,
    pub self_twist: L::Scalar,
    pub global_twist: L::Scalar,
}

impl ParamInputs<CpuLanes> {
    pub fn from_params(params: &AnimationParams) -> Self {
        Self {
            progress: params.progress,
            polar: params.polar,
            size: params.size,
            scale: params.scale,
            local_delay: params.local_delay,
            self_twist: params.self_twist,
            global_twist: params.global_twist,
        }
    }
}

/// Normalized vertical coordinate; `polar` picks the direction of the sweep.
pub fn height_phase<L: Lanes>(
    l: &L,
    y: &L::Scalar,
    polar: &L::Scalar,
    size: &L::Scalar,
) -> L::Scalar {
    let numerator = l.add(&l.mul(polar, y), size);
    let denominator = l.mul(&l.scalar(2.0), size);
    l.div(&numerator, &denominator)
}

/// Progress delayed by `delay * phase`, rescaled back onto [0, 1].
///
/// `delay` must be below 1.
pub fn staggered_progress<L: Lanes>(
    l: &L,
    progress: &L::Scalar,
    delay: &L::Scalar,
    phase: &L::Scalar,
) -> L::Scalar {
    let numerator = l.sub(progress, &l.mul(delay, phase));
    let denominator = l.sub(&l.scalar(1.0), delay);
    l.clamp(
        &l.div(&numerator, &denominator),
        &l.scalar(0.0),
        &l.scalar(1.0),
    )
}

/// `random * local * PI * sin(local) * twist`
pub fn twist_angle<L: Lanes>(
    l: &L,
    random: &L::Scalar,
    local: &L::Scalar,
    twist: &L::Scalar,
) -> L::Scalar {
    let a = l.mul(random, local);
    let a = l.mul(&a, &l.scalar(PI));
    let a = l.mul(&a, &l.sin(local));
    l.mul(&a, twist)
}

/// Rotate `v` about `axis` by the transpose of the right-handed axis-angle
/// rotation, i.e. clockwise when looking down the axis.
///
/// A zero axis leaves `v` unchanged.
pub fn rotate<L: Lanes>(l: &L, v: &L::Vector, axis: &L::Vector, angle: &L::Scalar) -> L::Vector {
    let k = l.normalize_or_zero(axis);
    let s = l.sin(angle);
    let one_minus_c = l.sub(&l.scalar(1.0), &l.cos(angle));

    let k_x_v = l.cross(&k, v);
    let k_x_k_x_v = l.cross(&k, &k_x_v);

    let r = l.vsub(v, &l.vscale(&k_x_v, &s));
    l.vadd(&r, &l.vscale(&k_x_k_x_v, &one_minus_c))
}

/// Animated position of one vertex.
pub fn shatter_position<L: Lanes>(l: &L, v: &VertexInputs<L>, p: &ParamInputs<L>) -> L::Vector {
    let one = l.scalar(1.0);

    let phase = height_phase(l, &l.y(&v.position), &p.polar, &p.size);
    let local = staggered_progress(l, &p.progress, &p.local_delay, &phase);

    // offset frame: triangle center scaled past itself by the random factor
    let offset = l.vscale(&v.center, &v.random);
    let q = l.vsub(&v.position, &offset);

    // self spin about the mesh centroid direction
    let self_angle = twist_angle(l, &v.random, &local, &p.self_twist);
    let q = rotate(l, &q, &v.centroid, &self_angle);

    let shrink = l.mul(&l.mul(&local, &l.sub(&one, &p.scale)), &l.sign(&v.random));
    let q = l.vscale(&q, &l.sub(&one, &shrink));
    let q = l.vadd(&q, &offset);

    let global_angle = twist_angle(l, &v.random, &local, &p.global_twist);
    let spun = rotate(l, &l.vadd(&q, &v.center), &l.vector(Vec3::Y), &global_angle);
    l.vsub(&spun, &v.center)
}

/// Animated position of one vertex, evaluated on the CPU
#[inline]
pub fn transform(
    position: Vec3,
    center: Vec3,
    random: f32,
    centroid: Vec3,
    params: &AnimationParams,
) -> Vec3 {
    shatter_position(
        &CpuLanes,
        &VertexInputs {
            position,
            center,
            random,
            centroid,
        },
        &ParamInputs::from_params(params),
    )
}

/// Per-vertex progress after the vertical stagger
pub fn local_progress(position_y: f32, params: &AnimationParams) -> f32 {
    let phase = height_phase(&CpuLanes, &position_y, &params.polar, &params.size);
    staggered_progress(&CpuLanes, &params.progress, &params.local_delay, &phase)
}
