//! Per-triangle shatter math.
//!
//! Everything here is written once against [`Lanes`] and instantiated for the
//! CPU ([`CpuLanes`]) or for WGSL emission (`shading::WgslLanes`).

pub mod lanes;
pub mod transform;
pub mod wipe;

pub use lanes::{CpuLanes, Lanes};
pub use transform::{
    height_phase, local_progress, rotate, shatter_position, staggered_progress, transform,
    twist_angle, ParamInputs, VertexInputs,
};
pub use wipe::{mix, wipe_color, wipe_mix_factor, WipeStyle, WIPE_THRESHOLD};
