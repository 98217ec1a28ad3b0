mod builder;
mod material;
mod wgsl;

pub use builder::{HookPoint, ShaderBuilder};
pub use material::{static_surface, Deform, ShatterMaterial, DEPTH_WGSL, SURFACE_WGSL, WIPE_UV_REPEAT};
pub use wgsl::{float_literal, vec3_literal, WgslExpr, WgslLanes};
