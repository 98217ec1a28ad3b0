use anyhow::Result;
use clap::Parser;
use glam::{Vec2, Vec3};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use shatter::animated_mesh::AnimatedMesh;
use shatter::camera::OrbitCamera;
use shatter::cli::Cli;
use shatter::config::ShatterConfig;
use shatter::frame::FrameClock;
use shatter::params::AnimationParams;
use shatter::progress::ProgressDriver;
use shatter::renderer::{FrameInput, PanelState, RenderOptions, Renderer};
use shatter::scene::{Scene, DEFAULT_LIGHT_POSITION, LIGHT_OFFSET};
use shatter::shading::{Deform, ShatterMaterial};

// === Application ===

struct App {
    cli: Cli,
    config: ShatterConfig,
    deform: Deform,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    /// CPU path only: the mesh and its per-frame output
    cpu_mesh: Option<AnimatedMesh>,
    positions: Vec<Vec3>,

    camera: OrbitCamera,
    clock: FrameClock,
    driver: ProgressDriver,
    params: AnimationParams,
    wireframe: bool,
    /// Panel edits from the previous frame
    pending_panel: Option<PanelState>,

    dragging: bool,
    last_cursor: Option<Vec2>,
}

impl App {
    fn new(cli: Cli, config: ShatterConfig) -> Self {
        let deform = if cli.cpu_deform { Deform::Cpu } else { Deform::Gpu };
        let mut driver = ProgressDriver::new();
        driver.enabled = config.follow_camera;

        Self {
            deform,
            window: None,
            renderer: None,
            cpu_mesh: None,
            positions: Vec::new(),
            camera: OrbitCamera::default(),
            clock: FrameClock::new(),
            driver,
            params: config.params,
            wireframe: config.wireframe,
            pending_panel: None,
            dragging: false,
            last_cursor: None,
            cli,
            config,
        }
    }

    fn redraw(&mut self) {
        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };

        if let Some(size) = renderer.apply_pending_resize() {
            self.camera.set_aspect(size.width as f32, size.height as f32);
        }

        let frame = self.clock.tick();
        self.camera.update(frame.delta);

        if let Some(panel) = self.pending_panel.take() {
            self.params = panel.params;
            self.wireframe = panel.wireframe;
            self.driver.enabled = panel.follow_camera;
        }
        self.driver.apply(self.camera.azimuth(), &mut self.params);

        // one value set for the whole frame
        let params = self.params;

        if let Some(mesh) = &self.cpu_mesh {
            if let Err(e) = mesh.evaluate_into(&params, &mut self.positions) {
                log::error!("CPU evaluation failed: {}", e);
            } else {
                renderer.upload_positions(&self.positions);
            }
        }

        let light_position = if self.config.light_follows_camera {
            self.camera.position() + LIGHT_OFFSET
        } else {
            DEFAULT_LIGHT_POSITION
        };

        let input = FrameInput {
            camera: &self.camera,
            params: &params,
            panel: PanelState {
                params,
                wireframe: self.wireframe,
                follow_camera: self.driver.enabled,
            },
            light_position,
            fps: self.clock.fps(),
            show_ui: !self.cli.no_ui,
        };

        match renderer.render(window, &input) {
            Ok(edited) => self.pending_panel = edited,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.request_resize(renderer.size());
            }
            Err(e) => log::error!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Shatter")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let scene = Scene::load(
            self.cli.model.as_deref(),
            self.cli.builtin,
            self.cli.wipe.as_deref(),
            self.config.mesh_scale,
            self.config.seed,
        );

        let options = RenderOptions {
            deform: self.deform,
            shadows: self.config.shadows,
            floor: self.config.floor,
        };
        let renderer = match pollster::block_on(Renderer::new(
            window.clone(),
            &scene,
            options,
            &self.config.wipe,
        )) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        if self.deform == Deform::Cpu {
            self.cpu_mesh = scene.mesh;
            self.positions = vec![Vec3::ZERO; self.cpu_mesh.as_ref().map_or(0, |m| m.vertex_count())];
        }

        let size = window.inner_size();
        self.camera.set_aspect(size.width as f32, size.height as f32);
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if !self.cli.no_ui && renderer.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.request_resize(size);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state.is_pressed();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let cursor = Vec2::new(position.x as f32, position.y as f32);
                if let (true, Some(last)) = (self.dragging, self.last_cursor) {
                    self.camera.process_mouse_drag(cursor - last);
                }
                self.last_cursor = Some(cursor);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                self.camera.process_scroll(lines);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ShatterConfig::load(path)?,
        None => ShatterConfig::default(),
    }
    .apply_cli(&cli);

    if cli.print_shader {
        let deform = if cli.cpu_deform { Deform::Cpu } else { Deform::Gpu };
        let material = ShatterMaterial::new(deform, cli.wipe.is_some());
        println!("{}", material.compose()?);
        println!("// ---- shadow depth program ----");
        println!("{}", material.compose_depth()?);
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, config);

    log::info!("Shatter - drag to orbit, scroll to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
