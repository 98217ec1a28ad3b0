use crate::animation::{height_phase, shatter_position, wipe_mix_factor, ParamInputs, VertexInputs};
use crate::error::ShatterResult;

use super::builder::{HookPoint, ShaderBuilder};
use super::wgsl::{float_literal, WgslLanes};

pub const SURFACE_WGSL: &str = include_str!("../shaders/surface.wgsl");
pub const DEPTH_WGSL: &str = include_str!("../shaders/depth.wgsl");

/// Horizontal repeat of the wipe texture across the UV range
pub const WIPE_UV_REPEAT: f32 = 10.0;

/// Where animated positions come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deform {
    /// Generated WGSL evaluates the transform per vertex
    Gpu,
    /// Positions are evaluated on the CPU and streamed in a second vertex buffer
    Cpu,
}

const SHATTER_UNIFORMS: &str = "\
struct ShatterParams {
    progress: f32,
    polar: f32,
    size: f32,
    scale: f32,
    local_delay: f32,
    self_twist: f32,
    global_twist: f32,
    _pad: f32,
};

@group(1) @binding(0) var<uniform> shatter: ShatterParams;";

const WIPE_BINDINGS: &str = "\
struct WipeParams {
    color_a: vec4<f32>,
    color_b: vec4<f32>,
    force: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(1) @binding(1) var<uniform> wipe: WipeParams;
@group(1) @binding(2) var wipe_texture: texture_2d<f32>;
@group(1) @binding(3) var wipe_sampler: sampler;";

/// Surface program without any hooks, for static geometry such as the floor
pub fn static_surface() -> ShatterResult<String> {
    ShaderBuilder::new(SURFACE_WGSL).build()
}

/// The shatter material: base surface program plus generated hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShatterMaterial {
    pub deform: Deform,
    /// Apply the color wipe; off when no wipe texture is available
    pub wipe: bool,
}

impl ShatterMaterial {
    pub fn new(deform: Deform, wipe: bool) -> Self {
        Self { deform, wipe }
    }

    /// Compose the full WGSL module for this material
    pub fn compose(&self) -> ShatterResult<String> {
        let mut builder = self.with_vertex_hooks(SURFACE_WGSL);
        if self.wipe {
            builder = builder
                .hook(HookPoint::FragmentPrologue, WIPE_BINDINGS)
                .hook(HookPoint::FragmentColor, fragment_color());
        }

        let source = builder.build()?;
        log::debug!(
            "composed shatter material ({:?}, wipe: {}), {} lines",
            self.deform,
            self.wipe,
            source.lines().count()
        );
        Ok(source)
    }

    /// Depth-only program for the shadow pass, displaced like the surface
    pub fn compose_depth(&self) -> ShatterResult<String> {
        self.with_vertex_hooks(DEPTH_WGSL).build()
    }

    fn with_vertex_hooks(&self, base: &'static str) -> ShaderBuilder {
        ShaderBuilder::new(base)
            .hook(HookPoint::VertexPrologue, SHATTER_UNIFORMS)
            .hook(HookPoint::VertexAttributes, self.vertex_attributes())
            .hook(HookPoint::VertexPosition, self.vertex_position())
    }

    fn vertex_attributes(&self) -> &'static str {
        match self.deform {
            Deform::Gpu => {
                "@location(3) center: vec3<f32>,\n@location(4) random: f32,\n@location(5) centroid: vec3<f32>,"
            }
            Deform::Cpu => "@location(6) animated: vec3<f32>,",
        }
    }

    fn vertex_position(&self) -> String {
        match self.deform {
            Deform::Gpu => vertex_position_gpu(),
            Deform::Cpu => "transformed = in.animated;".to_string(),
        }
    }
}

fn vertex_position_gpu() -> String {
    let l = WgslLanes::new("shatter_v");
    let vertex = VertexInputs::<WgslLanes> {
        position: l.input("in.position"),
        center: l.input("in.center"),
        random: l.input("in.random"),
        centroid: l.input("in.centroid"),
    };
    let params = ParamInputs::<WgslLanes> {
        progress: l.input("shatter.progress"),
        polar: l.input("shatter.polar"),
        size: l.input("shatter.size"),
        scale: l.input("shatter.scale"),
        local_delay: l.input("shatter.local_delay"),
        self_twist: l.input("shatter.self_twist"),
        global_twist: l.input("shatter.global_twist"),
    };

    let out = shatter_position(&l, &vertex, &params);
    let mut lines = l.finish();
    lines.push(format!("transformed = {};", out));
    lines.join("\n")
}

fn fragment_color() -> String {
    let l = WgslLanes::new("shatter_f");
    let sample = l.bind(format!(
        "textureSample(wipe_texture, wipe_sampler, vec2<f32>(in.uv.x * {}, in.uv.y)).r",
        float_literal(WIPE_UV_REPEAT)
    ));
    let phase = height_phase(
        &l,
        &l.input("in.local_position.y"),
        &l.input("shatter.polar"),
        &l.input("shatter.size"),
    );
    let factor = wipe_mix_factor(
        &l,
        &sample,
        &phase,
        &l.input("shatter.progress"),
        &l.input("wipe.force"),
    );

    let mut lines = l.finish();
    lines.push(format!(
        "diffuse = diffuse * mix(wipe.color_a, wipe.color_b, {});",
        factor
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_material_declares_attributes_and_assigns_position() {
        let source = ShatterMaterial::new(Deform::Gpu, false).compose().unwrap();
        assert!(source.contains("@location(4) random: f32,"));
        assert!(source.contains("transformed = shatter_v"));
        assert!(!source.contains("wipe_texture"));
        assert!(!source.contains("//@hook"));
    }

    #[test]
    fn cpu_material_reads_streamed_positions() {
        let source = ShatterMaterial::new(Deform::Cpu, true).compose().unwrap();
        assert!(source.contains("transformed = in.animated;"));
        assert!(!source.contains("in.centroid"));
        assert!(source.contains("textureSample(wipe_texture"));
    }

    #[test]
    fn depth_program_shares_the_vertex_hook() {
        let surface = ShatterMaterial::new(Deform::Gpu, true).compose().unwrap();
        let depth = ShatterMaterial::new(Deform::Gpu, true).compose_depth().unwrap();

        let body = vertex_position_gpu();
        assert!(surface.contains(body.lines().last().unwrap()));
        assert!(depth.contains(body.lines().last().unwrap()));
        assert!(depth.contains("light.view_proj"));
        assert!(!depth.contains("wipe"));
        assert!(!depth.contains("@fragment"));
    }

    #[test]
    fn static_surface_has_no_shatter_bindings() {
        let source = static_surface().unwrap();
        assert!(!source.contains("ShatterParams"));
        assert!(!source.contains("//@hook"));
        assert!(source.contains("shadow_visibility"));
    }
}
