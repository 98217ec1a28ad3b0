pub mod animated_mesh;
pub mod animation;
pub mod attributes;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod loaders;
pub mod mesh;
pub mod params;
pub mod progress;
pub mod renderer;
pub mod scene;
pub mod shading;
pub mod shadow;
pub mod types;

pub use animated_mesh::AnimatedMesh;
pub use attributes::TriangleAttributes;
pub use error::{ShatterError, ShatterResult};
pub use mesh::TriangleSoup;
pub use params::AnimationParams;
pub use progress::ProgressDriver;
