// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Procedural mesh used when no model file is given
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinMesh {
    /// Subdivided column standing on the ground plane
    #[default]
    Column,
    /// Icosphere lifted to the camera target
    Sphere,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "shatter")]
#[command(about = "Per-triangle shatter/assemble mesh animation", long_about = None)]
pub struct Cli {
    /// glTF model to animate; a built-in mesh is used when absent
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Built-in mesh used when no model is given
    #[arg(long, value_enum, default_value_t = BuiltinMesh::Column)]
    pub builtin: BuiltinMesh,

    /// Wipe texture (red channel drives the color wipe)
    #[arg(long)]
    pub wipe: Option<PathBuf>,

    /// JSON config with initial parameters, colors and window size
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for the per-triangle random factors
    #[arg(long)]
    pub seed: Option<u64>,

    /// Uniform scale applied to the loaded mesh
    #[arg(long)]
    pub scale: Option<f32>,

    /// Evaluate the transform on the CPU and stream positions every frame
    #[arg(long = "cpu-deform", default_value = "false")]
    pub cpu_deform: bool,

    /// Skip the shadow pass; the floor is still drawn
    #[arg(long = "no-shadows", default_value = "false")]
    pub no_shadows: bool,

    /// Print the composed surface and shadow depth WGSL and exit
    #[arg(long = "print-shader", default_value = "false")]
    pub print_shader: bool,

    /// Disable UI elements
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}
