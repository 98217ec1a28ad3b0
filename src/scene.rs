use glam::{Mat4, Vec3};
use std::path::Path;

use crate::animated_mesh::AnimatedMesh;
use crate::cli::BuiltinMesh;
use crate::error::ShatterResult;
use crate::loaders::{load_gltf_mesh, load_wipe_texture, TextureData};
use crate::mesh::TriangleSoup;

/// Offset of the point light from the camera when it follows
pub const LIGHT_OFFSET: Vec3 = Vec3::new(5.0, 15.0, 0.0);
pub const DEFAULT_LIGHT_POSITION: Vec3 = Vec3::new(50.0, 80.0, 50.0);
/// Point the light, and its shadow frustum, is aimed at
pub const LIGHT_TARGET: Vec3 = Vec3::ZERO;

pub const MESH_COLOR: u32 = 0xf7f1e1;
pub const MESH_ROUGHNESS: f32 = 0.15;

pub const FLOOR_SIZE: f32 = 1500.0;
pub const FLOOR_HEIGHT: f32 = -19.5;
pub const FLOOR_COLOR: u32 = 0x111111;
pub const FLOOR_ROUGHNESS: f32 = 1.0;

/// Everything the render loop draws
pub struct Scene {
    /// Absent when the mesh failed to load
    pub mesh: Option<AnimatedMesh>,
    /// Absent when no wipe texture was given or it failed to decode
    pub wipe_texture: Option<TextureData>,
    pub model: Mat4,
}

impl Scene {
    /// Load the mesh and wipe texture. Failures are logged and leave the
    /// corresponding slot empty.
    pub fn load(
        model: Option<&Path>,
        builtin: BuiltinMesh,
        wipe: Option<&Path>,
        mesh_scale: f32,
        seed: u64,
    ) -> Self {
        let (soup, transform) = match model {
            Some(path) => match load_gltf_mesh(path) {
                Ok(soup) => (Some(soup), Mat4::from_rotation_y(-std::f32::consts::FRAC_PI_2)),
                Err(e) => {
                    log::warn!("Mesh not loaded: {:#}", e);
                    (None, Mat4::IDENTITY)
                }
            },
            None => match builtin_mesh(builtin) {
                Ok(soup) => (Some(soup), Mat4::IDENTITY),
                Err(e) => {
                    log::warn!("Built-in mesh failed: {}", e);
                    (None, Mat4::IDENTITY)
                }
            },
        };

        let mesh = soup.and_then(|mut soup| {
            soup.scale(mesh_scale);
            match AnimatedMesh::new(soup, seed) {
                Ok(mesh) => {
                    log::info!(
                        "Mesh ready: {} triangles, seed {:#x}",
                        mesh.mesh().triangle_count(),
                        seed
                    );
                    if let Some(bounds) = mesh.bounds() {
                        log::debug!("Mesh bounds {:?} to {:?}", bounds.min, bounds.max);
                    }
                    Some(mesh)
                }
                Err(e) => {
                    log::warn!("Mesh rejected: {}", e);
                    None
                }
            }
        });

        let wipe_texture = wipe.and_then(|path| match load_wipe_texture(path) {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!("Wipe disabled: {:#}", e);
                None
            }
        });

        Self {
            mesh,
            wipe_texture,
            model: transform,
        }
    }

    pub fn has_wipe(&self) -> bool {
        self.wipe_texture.is_some()
    }
}

/// Shadow-receiving ground plane below the mesh
pub fn floor_mesh() -> ShatterResult<TriangleSoup> {
    let mut floor = TriangleSoup::plane(FLOOR_SIZE, 4)?;
    floor.translate(Vec3::new(0.0, FLOOR_HEIGHT, 0.0));
    Ok(floor)
}

/// Procedural stand-ins for a model file
pub fn builtin_mesh(kind: BuiltinMesh) -> ShatterResult<TriangleSoup> {
    match kind {
        BuiltinMesh::Column => TriangleSoup::column(40, 48, 6.0, 30.0),
        BuiltinMesh::Sphere => {
            let mut sphere = TriangleSoup::icosphere(4, 10.0)?;
            sphere.translate(Vec3::new(0.0, 10.0, 0.0));
            Ok(sphere)
        }
    }
}
