use glam::{Mat4, Vec3};

use crate::animation::WipeStyle;
use crate::mesh::TriangleSoup;
use crate::params::AnimationParams;
use crate::shading::Deform;

/// Camera uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _pad: f32,
}

/// Per-mesh surface and lighting data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub light_position: [f32; 3],
    pub roughness: f32,
    pub light_color: [f32; 3],
    pub metalness: f32,
    pub ambient: [f32; 3],
    pub fog_density: f32,
    pub fog_color: [f32; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4, base_color: u32, roughness: f32, light_position: Vec3) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            base_color: hex_color(base_color),
            light_position: light_position.to_array(),
            roughness,
            light_color: [1.0, 1.0, 1.0],
            metalness: 0.0,
            ambient: rgb(hex_color(AMBIENT_COLOR)),
            fog_density: FOG_DENSITY,
            fog_color: hex_color(FOG_COLOR),
        }
    }
}

pub const AMBIENT_COLOR: u32 = 0x222326;
pub const FOG_COLOR: u32 = 0x111111;
pub const FOG_DENSITY: f32 = 0.01;

/// Light-space projection and filtering inputs for the shadow lookup
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniform {
    pub view_proj: [[f32; 4]; 4],
    pub bias: f32,
    /// Size of one shadow map texel in UV units
    pub texel: f32,
    /// 0 disables shadowing, 1 applies it fully
    pub strength: f32,
    pub _pad: f32,
}

/// Animation parameters as laid out in the `ShatterParams` WGSL struct
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShatterUniform {
    pub progress: f32,
    pub polar: f32,
    pub size: f32,
    pub scale: f32,
    pub local_delay: f32,
    pub self_twist: f32,
    pub global_twist: f32,
    pub _pad: f32,
}

impl From<&AnimationParams> for ShatterUniform {
    fn from(p: &AnimationParams) -> Self {
        Self {
            progress: p.progress,
            polar: p.polar,
            size: p.size,
            scale: p.scale,
            local_delay: p.local_delay,
            self_twist: p.self_twist,
            global_twist: p.global_twist,
            _pad: 0.0,
        }
    }
}

/// Wipe colors as laid out in the `WipeParams` WGSL struct
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WipeUniform {
    pub color_a: [f32; 4],
    pub color_b: [f32; 4],
    pub force: f32,
    pub _pad: [f32; 3],
}

impl From<&WipeStyle> for WipeUniform {
    fn from(style: &WipeStyle) -> Self {
        Self {
            color_a: style.color_a,
            color_b: style.color_b,
            force: style.force,
            _pad: [0.0; 3],
        }
    }
}

/// Static per-vertex data: geometry plus the derived shatter attributes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShatterVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub center: [f32; 3],
    pub random: f32,
    pub centroid: [f32; 3],
}

impl ShatterVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
        4 => Float32,
        5 => Float32x3,
    ];

    /// Geometry that is drawn but never shatters
    pub fn unanimated(soup: &TriangleSoup) -> Vec<ShatterVertex> {
        soup.positions()
            .iter()
            .zip(soup.normals())
            .zip(soup.uvs())
            .map(|((p, n), uv)| ShatterVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: *uv,
                center: [0.0; 3],
                random: 0.0,
                centroid: [0.0; 3],
            })
            .collect()
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShatterVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Animated positions streamed from the CPU path
pub const ANIMATED_POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![6 => Float32x3];

pub fn animated_position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ANIMATED_POSITION_ATTRIBUTES,
    }
}

/// Vertex buffers a mesh pipeline binds, in slot order
pub fn mesh_buffer_layouts(deform: Deform) -> Vec<wgpu::VertexBufferLayout<'static>> {
    match deform {
        Deform::Gpu => vec![ShatterVertex::layout()],
        Deform::Cpu => vec![ShatterVertex::layout(), animated_position_layout()],
    }
}

/// Axis-Aligned Bounding Box
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn from_points(points: &[Vec3]) -> Option<AABB> {
        let first = *points.first()?;
        Some(points.iter().fold(AABB { min: first, max: first }, |b, p| AABB {
            min: b.min.min(*p),
            max: b.max.max(*p),
        }))
    }
}

/// `0xRRGGBB` to RGBA channels in 0..1, alpha 1
pub fn hex_color(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}

fn rgb(c: [f32; 4]) -> [f32; 3] {
    [c[0], c[1], c[2]]
}
