// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::scene::SceneKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneArg {
    Box,
    Sphere,
    Cylinder,
    BoxMaterial,
    Model,
}

impl From<SceneArg> for SceneKind {
    fn from(arg: SceneArg) -> Self {
        match arg {
            SceneArg::Box => SceneKind::Box,
            SceneArg::Sphere => SceneKind::Sphere,
            SceneArg::Cylinder => SceneKind::Cylinder,
            SceneArg::BoxMaterial => SceneKind::BoxMaterial,
            SceneArg::Model => SceneKind::Model,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "scene-viewer")]
#[command(about = "Interactive 3D scene viewer", long_about = None)]
pub struct Cli {
    /// Scene to mount at startup (switch live with keys 1-5)
    #[arg(long, value_enum, default_value = "box")]
    pub scene: SceneArg,

    /// JSON config file with asset paths
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable UI elements and console output
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}
