use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::animated_mesh::AnimatedMesh;
use crate::animation::WipeStyle;
use crate::camera::OrbitCamera;
use crate::loaders::TextureData;
use crate::params::{AnimationParams, PARAM_SPECS, ParamKind};
use crate::scene::{
    floor_mesh, Scene, DEFAULT_LIGHT_POSITION, FLOOR_COLOR, FLOOR_ROUGHNESS, LIGHT_TARGET,
    MESH_COLOR, MESH_ROUGHNESS,
};
use crate::shading::{static_surface, Deform, ShatterMaterial};
use crate::shadow::ShadowPass;
use crate::types::{
    mesh_buffer_layouts, CameraUniform, ModelUniform, ShadowUniform, ShatterUniform, ShatterVertex,
    WipeUniform,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
// background shows as 0x111111 once the sRGB surface encodes it
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0056,
    g: 0.0056,
    b: 0.0056,
    a: 1.0,
};

/// Values shown in the parameter panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelState {
    pub params: AnimationParams,
    pub wireframe: bool,
    pub follow_camera: bool,
}

/// Per-frame inputs to `Renderer::render`
pub struct FrameInput<'a> {
    pub camera: &'a OrbitCamera,
    pub params: &'a AnimationParams,
    pub panel: PanelState,
    pub light_position: Vec3,
    pub fps: f32,
    pub show_ui: bool,
}

/// Startup choices that shape the pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub deform: Deform,
    pub shadows: bool,
    pub floor: bool,
}

/// Static ground plane with its own model uniform
struct Floor {
    vertices: wgpu::Buffer,
    vertex_count: u32,
    model_buffer: wgpu::Buffer,
    model_uniform: ModelUniform,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

struct MeshBuffers {
    vertices: wgpu::Buffer,
    /// Present in CPU deform mode
    animated: Option<wgpu::Buffer>,
    vertex_count: u32,
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    pending_resize: Option<winit::dpi::PhysicalSize<u32>>,
    depth_view: wgpu::TextureView,

    fill_pipeline: wgpu::RenderPipeline,
    line_pipeline: Option<wgpu::RenderPipeline>,

    camera_buffer: wgpu::Buffer,
    model_buffer: wgpu::Buffer,
    shatter_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    material_bind_group: wgpu::BindGroup,

    mesh: Option<MeshBuffers>,
    model_uniform: ModelUniform,
    floor: Option<Floor>,
    shadow: ShadowPass,
    shadows: bool,
    upload_scratch: Vec<[f32; 3]>,

    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        scene: &Scene,
        options: RenderOptions,
        wipe: &WipeStyle,
    ) -> Result<Self> {
        let size = window.inner_size();
        let deform = options.deform;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size)?;
        surface.configure(&device, &surface_config);
        let depth_view = Self::create_depth_view(&device, size);

        let material = ShatterMaterial::new(deform, scene.has_wipe());
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shatter Shader"),
            source: wgpu::ShaderSource::Wgsl(material.compose()?.into()),
        });

        let model_uniform =
            ModelUniform::new(scene.model, MESH_COLOR, MESH_ROUGHNESS, DEFAULT_LIGHT_POSITION);
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let model_buffer = Self::create_model_buffer(&device, "Model Buffer", &model_uniform);
        let shatter_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shatter Params Buffer"),
            contents: bytemuck::cast_slice(&[ShatterUniform::from(&AnimationParams::default())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let wipe_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wipe Buffer"),
            contents: bytemuck::cast_slice(&[WipeUniform::from(wipe)]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let white = TextureData::white();
        let wipe_texture = scene.wipe_texture.as_ref().unwrap_or(&white);
        let (material_layout, material_bind_group) = Self::create_material_bindings(
            &device,
            &queue,
            &shatter_buffer,
            &wipe_buffer,
            wipe_texture,
        );

        let shadow = ShadowPass::new(
            &device,
            material.compose_depth()?,
            &model_buffer,
            &material_layout,
            deform,
        );

        let scene_layout = Self::create_scene_layout(&device);
        let scene_bind_group = Self::create_scene_bind_group(
            &device,
            &scene_layout,
            &camera_buffer,
            &model_buffer,
            &shadow,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shatter Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let mesh_layouts = mesh_buffer_layouts(deform);
        let fill_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            &mesh_layouts,
            wgpu::PolygonMode::Fill,
        );
        let line_pipeline = device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
            .then(|| {
                Self::create_pipeline(
                    &device,
                    &pipeline_layout,
                    &shader,
                    surface_config.format,
                    &mesh_layouts,
                    wgpu::PolygonMode::Line,
                )
            });

        let floor = if options.floor {
            Some(Self::create_floor(
                &device,
                &scene_layout,
                &camera_buffer,
                &shadow,
                surface_config.format,
            )?)
        } else {
            None
        };

        let mesh = scene.mesh.as_ref().map(|m| Self::create_mesh_buffers(&device, m, deform));

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                ..Default::default()
            },
        );

        log::info!(
            "Renderer initialized: {}x{}, {:?} deform, wipe {}, shadows {}, floor {}, wireframe {}",
            size.width,
            size.height,
            deform,
            if scene.has_wipe() { "on" } else { "off" },
            if options.shadows { "on" } else { "off" },
            if floor.is_some() { "on" } else { "off" },
            if line_pipeline.is_some() { "available" } else { "unsupported" }
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            size,
            pending_resize: None,
            depth_view,
            fill_pipeline,
            line_pipeline,
            camera_buffer,
            model_buffer,
            shatter_buffer,
            scene_bind_group,
            material_bind_group,
            mesh,
            model_uniform,
            floor,
            shadow,
            shadows: options.shadows,
            upload_scratch: Vec::new(),
            egui_renderer,
            egui_state,
            egui_ctx,
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        let required_features = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no formats")?;

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    fn create_depth_view(
        device: &wgpu::Device,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_model_buffer(
        device: &wgpu::Device,
        label: &str,
        uniform: &ModelUniform,
    ) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[*uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    /// Group 0: camera, model, shadow uniform, shadow map, comparison sampler
    fn create_scene_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let uniform = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform(0),
                uniform(1),
                uniform(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
            label: Some("scene_bind_group_layout"),
        })
    }

    fn create_scene_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        model_buffer: &wgpu::Buffer,
        shadow: &ShadowPass,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: model_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: shadow.uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&shadow.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&shadow.sampler),
                },
            ],
            label: Some("scene_bind_group"),
        })
    }

    fn create_floor(
        device: &wgpu::Device,
        scene_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        shadow: &ShadowPass,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Floor> {
        let soup = floor_mesh()?;
        let vertices = ShatterVertex::unanimated(&soup);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Floor Vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let model_uniform =
            ModelUniform::new(Mat4::IDENTITY, FLOOR_COLOR, FLOOR_ROUGHNESS, DEFAULT_LIGHT_POSITION);
        let model_buffer = Self::create_model_buffer(device, "Floor Model Buffer", &model_uniform);
        let bind_group =
            Self::create_scene_bind_group(device, scene_layout, camera_buffer, &model_buffer, shadow);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Floor Shader"),
            source: wgpu::ShaderSource::Wgsl(static_surface()?.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Floor Pipeline Layout"),
            bind_group_layouts: &[scene_layout],
            push_constant_ranges: &[],
        });
        let pipeline = Self::create_pipeline(
            device,
            &layout,
            &shader,
            surface_format,
            &[ShatterVertex::layout()],
            wgpu::PolygonMode::Fill,
        );

        Ok(Floor {
            vertices: vertex_buffer,
            vertex_count: vertices.len() as u32,
            model_buffer,
            model_uniform,
            bind_group,
            pipeline,
        })
    }

    fn create_material_bindings(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shatter_buffer: &wgpu::Buffer,
        wipe_buffer: &wgpu::Buffer,
        texture: &TextureData,
    ) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
        let extent = wgpu::Extent3d {
            width: texture.width,
            height: texture.height,
            depth_or_array_layers: 1,
        };
        let wipe_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Wipe Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // samples are data, not color
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &wipe_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &texture.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * texture.width),
                rows_per_image: Some(texture.height),
            },
            extent,
        );
        let wipe_view = wipe_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("material_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: shatter_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wipe_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&wipe_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("material_bind_group"),
        });

        (layout, bind_group)
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        buffers: &[wgpu::VertexBufferLayout],
        polygon_mode: wgpu::PolygonMode,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(match polygon_mode {
                wgpu::PolygonMode::Fill => "Fill Pipeline",
                _ => "Line Pipeline",
            }),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // triangles are seen from both sides once they come apart
                cull_mode: None,
                polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_mesh_buffers(device: &wgpu::Device, mesh: &AnimatedMesh, deform: Deform) -> MeshBuffers {
        let vertices = mesh.vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shatter Vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let animated = (deform == Deform::Cpu).then(|| {
            let positions: Vec<[f32; 3]> = mesh.mesh().positions().iter().map(|p| p.to_array()).collect();
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Animated Positions"),
                contents: bytemuck::cast_slice(&positions),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
        });

        MeshBuffers {
            vertices: vertex_buffer,
            animated,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    /// Record a resize; applied by `apply_pending_resize` at the next frame
    pub fn request_resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.pending_resize = Some(size);
    }

    /// Apply the last recorded resize. Returns the new size when one was applied.
    pub fn apply_pending_resize(&mut self) -> Option<winit::dpi::PhysicalSize<u32>> {
        let size = self.pending_resize.take()?;
        if size.width == 0 || size.height == 0 {
            return None;
        }
        self.size = size;
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = Self::create_depth_view(&self.device, size);
        log::debug!("Resized to {}x{}", size.width, size.height);
        Some(size)
    }

    /// Stream CPU-evaluated positions into the animated vertex buffer
    pub fn upload_positions(&mut self, positions: &[Vec3]) {
        let Some(buffer) = self.mesh.as_ref().and_then(|m| m.animated.as_ref()) else {
            return;
        };
        self.upload_scratch.clear();
        self.upload_scratch.extend(positions.iter().map(|p| p.to_array()));
        self.queue
            .write_buffer(buffer, 0, bytemuck::cast_slice(&self.upload_scratch));
    }

    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Draw one frame. Returns the panel values when the user changed them.
    pub fn render(
        &mut self,
        window: &Window,
        frame: &FrameInput,
    ) -> std::result::Result<Option<PanelState>, wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[frame.camera.to_uniform()]),
        );
        self.queue.write_buffer(
            &self.shatter_buffer,
            0,
            bytemuck::cast_slice(&[ShatterUniform::from(frame.params)]),
        );
        self.model_uniform.light_position = frame.light_position.to_array();
        self.queue.write_buffer(
            &self.model_buffer,
            0,
            bytemuck::cast_slice(&[self.model_uniform]),
        );
        if let Some(floor) = &mut self.floor {
            floor.model_uniform.light_position = frame.light_position.to_array();
            self.queue.write_buffer(
                &floor.model_buffer,
                0,
                bytemuck::cast_slice(&[floor.model_uniform]),
            );
        }
        self.queue.write_buffer(
            &self.shadow.uniform,
            0,
            bytemuck::cast_slice(&[ShadowUniform::new(
                frame.light_position,
                LIGHT_TARGET,
                self.shadows,
            )]),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        if self.shadows {
            match &self.mesh {
                Some(mesh) => {
                    let mut vertices = vec![&mesh.vertices];
                    vertices.extend(mesh.animated.as_ref());
                    self.shadow.encode(
                        &mut encoder,
                        &self.material_bind_group,
                        &vertices,
                        mesh.vertex_count,
                    );
                }
                None => self.shadow.encode(&mut encoder, &self.material_bind_group, &[], 0),
            }
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shatter Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(floor) = &self.floor {
                render_pass.set_pipeline(&floor.pipeline);
                render_pass.set_bind_group(0, &floor.bind_group, &[]);
                render_pass.set_vertex_buffer(0, floor.vertices.slice(..));
                render_pass.draw(0..floor.vertex_count, 0..1);
            }

            if let Some(mesh) = &self.mesh {
                let pipeline = match (&self.line_pipeline, frame.panel.wireframe) {
                    (Some(line), true) => line,
                    _ => &self.fill_pipeline,
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
                render_pass.set_bind_group(1, &self.material_bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                if let Some(animated) = &mesh.animated {
                    render_pass.set_vertex_buffer(1, animated.slice(..));
                }
                render_pass.draw(0..mesh.vertex_count, 0..1);
            }
        }

        let mut edited = None;
        if frame.show_ui {
            edited = self.render_panel(window, frame, &mut encoder, &view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(edited)
    }

    fn render_panel(
        &mut self,
        window: &Window,
        frame: &FrameInput,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> Option<PanelState> {
        let mut panel = frame.panel;
        let wireframe_available = self.line_pipeline.is_some();

        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("FPS")
                .title_bar(false)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0}", frame.fps))
                            .size(32.0)
                            .color(egui::Color32::from_rgb(74, 158, 255)),
                    );
                    ui.label(
                        egui::RichText::new("FPS")
                            .size(12.0)
                            .color(egui::Color32::GRAY),
                    );
                });

            egui::Window::new("Shatter")
                .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
                .resizable(false)
                .show(ctx, |ui| {
                    ui.add_enabled(
                        wireframe_available,
                        egui::Checkbox::new(&mut panel.wireframe, "wireframe"),
                    );
                    ui.checkbox(&mut panel.follow_camera, "progress follows camera");
                    ui.separator();

                    for spec in &PARAM_SPECS {
                        let driven = spec.kind == ParamKind::Progress && panel.follow_camera;
                        let value = panel.params.get_mut(spec.kind);
                        let mut slider =
                            egui::Slider::new(value, spec.min..=spec.clamp(spec.max)).text(spec.name);
                        if spec.step > 0.0 {
                            slider = slider.step_by(spec.step as f64);
                        }
                        ui.add_enabled(!driven, slider);
                    }
                });
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.size.width, self.size.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        panel.params = panel.params.clamped();
        (panel != frame.panel).then_some(panel)
    }
}
