//! Shadow map rendered from the point light.
//!
//! The light is treated as a spot aimed at `LIGHT_TARGET`: one perspective
//! depth map per frame, drawn with the depth program of the active material
//! so the shadow follows the shattered triangles.

use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_4;

use crate::shading::Deform;
use crate::types::{mesh_buffer_layouts, ShadowUniform};

pub const SHADOW_MAP_SIZE: u32 = 4096;
pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Full cone angle of the light frustum
pub const SHADOW_FOV: f32 = FRAC_PI_4;
pub const SHADOW_NEAR: f32 = 0.5;
pub const SHADOW_FAR: f32 = 200.0;
/// Subtracted from the receiver depth before comparison
pub const SHADOW_BIAS: f32 = 0.0001;

/// Projection from world space into the light's clip space
pub fn light_view_proj(light: Vec3, target: Vec3) -> Mat4 {
    let forward = (target - light).normalize_or_zero();
    // look_at degenerates when looking straight along the up vector
    let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let proj = Mat4::perspective_rh(SHADOW_FOV, 1.0, SHADOW_NEAR, SHADOW_FAR);
    proj * Mat4::look_at_rh(light, target, up)
}

impl ShadowUniform {
    pub fn new(light: Vec3, target: Vec3, enabled: bool) -> Self {
        Self {
            view_proj: light_view_proj(light, target).to_cols_array_2d(),
            bias: SHADOW_BIAS,
            texel: 1.0 / SHADOW_MAP_SIZE as f32,
            strength: if enabled { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }
}

/// Shadow map texture, its uniform and the depth pipeline that fills it
pub struct ShadowPass {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub uniform: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,
    light_bind_group: wgpu::BindGroup,
}

impl ShadowPass {
    /// `material_layout` is the group 1 layout of the surface pipeline; the
    /// depth program reads the shatter parameters from it.
    pub fn new(
        device: &wgpu::Device,
        depth_source: String,
        model_buffer: &wgpu::Buffer,
        material_layout: &wgpu::BindGroupLayout,
        deform: Deform,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: SHADOW_MAP_SIZE,
                height: SHADOW_MAP_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Uniform"),
            size: std::mem::size_of::<ShadowUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_light_layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_light_bind_group"),
            layout: &light_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: model_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Depth Shader"),
            source: wgpu::ShaderSource::Wgsl(depth_source.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&light_layout, material_layout],
            push_constant_ranges: &[],
        });
        let buffers = mesh_buffer_layouts(deform);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::debug!(
            "Shadow map {}x{} ({:?} deform)",
            SHADOW_MAP_SIZE,
            SHADOW_MAP_SIZE,
            deform
        );

        Self {
            view,
            sampler,
            uniform,
            pipeline,
            light_bind_group,
        }
    }

    /// Clear the map and draw the casters from the light.
    /// `vertices` holds the static buffers and, in CPU mode, the animated ones.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        material_bind_group: &wgpu::BindGroup,
        vertices: &[&wgpu::Buffer],
        vertex_count: u32,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        if vertex_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.light_bind_group, &[]);
        pass.set_bind_group(1, material_bind_group, &[]);
        for (slot, buffer) in vertices.iter().enumerate() {
            pass.set_vertex_buffer(slot as u32, buffer.slice(..));
        }
        pass.draw(0..vertex_count, 0..1);
    }
}
