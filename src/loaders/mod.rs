pub mod gltf_triangles;
pub mod texture;

pub use gltf_triangles::{load_gltf_mesh, MergedGeometry};
pub use texture::{load_wipe_texture, TextureData};
