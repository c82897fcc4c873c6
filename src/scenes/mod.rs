use std::path::PathBuf;

use crate::config::{TexturePaths, ViewerConfig};
use crate::panel::{Axis, BindTarget, ParameterPanel};
use crate::scene::{Scene, SceneKind};

mod cylinder;
mod model;
mod sphere;
mod textured_box;

/// A constructed-but-not-yet-mounted scene: the scene graph, its populated
/// parameter panel, and the asset work the lifecycle manager should kick
/// off.
pub struct BuiltScene {
    pub scene: Scene,
    pub panel: ParameterPanel,
    pub texture_paths: Option<TexturePaths>,
    pub model_path: Option<PathBuf>,
}

/// Build the scene configuration for `kind` at the current viewport size.
pub fn build(kind: SceneKind, config: &ViewerConfig, width: u32, height: u32) -> BuiltScene {
    match kind {
        SceneKind::Box => textured_box::build(config, width, height, false),
        SceneKind::BoxMaterial => textured_box::build(config, width, height, true),
        SceneKind::Sphere => sphere::build(width, height),
        SceneKind::Cylinder => cylinder::build(width, height),
        SceneKind::Model => model::build(config, width, height),
    }
}

/// Register the recognized "Light Positions" group: one subgroup per light
/// with position axes, intensity and color. Ambient lights get intensity
/// and color only.
pub(crate) fn register_light_bindings(panel: &mut ParameterPanel, scene: &Scene) {
    let mut counts = std::collections::HashMap::new();
    for light in &scene.lights {
        *counts.entry(light.kind_name()).or_insert(0usize) += 1;
    }
    let mut seen = std::collections::HashMap::new();

    for (index, light) in scene.lights.iter().enumerate() {
        let kind = light.kind_name();
        let seen_count = seen.entry(kind).or_insert(0usize);
        *seen_count += 1;

        let mut title = format!("{} Light", capitalize(kind));
        if counts[kind] > 1 {
            title = format!("{} {}", title, seen_count);
        }
        let path = ["Light Positions", title.as_str()];

        if light.position().is_some() {
            for axis in [Axis::X, Axis::Y, Axis::Z] {
                panel.add_control(
                    &path,
                    BindTarget::LightPosition { light: index, axis },
                    -10.0..=10.0,
                    &format!("{} Position", axis.label()),
                );
            }
        }
        panel.add_control(
            &path,
            BindTarget::LightIntensity { light: index },
            0.0..=2.0,
            "Intensity",
        );
        panel.add_color_control(&path, BindTarget::LightColor { light: index }, "Color");
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
