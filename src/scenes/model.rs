use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::lighting::studio_rig;
use crate::panel::{BindTarget, ParameterPanel};
use crate::scene::Scene;

use super::{register_light_bindings, BuiltScene};

/// The studio-lit model scene. Geometry arrives asynchronously from the
/// model loader; until then the scene renders lights-only. Material
/// bindings are registered up front and resolve once the model object
/// exists.
pub fn build(config: &ViewerConfig, width: u32, height: u32) -> BuiltScene {
    let controls = OrbitControls::new(Vec3::new(3.0, 3.0, 5.0), Vec3::ZERO);
    let mut camera = PerspectiveCamera::new(width, height);
    camera.position = controls.position();

    let mut scene = Scene::new(camera, controls);
    scene.lights = studio_rig();

    let mut panel = ParameterPanel::new();
    panel.add_control(
        &["Material"],
        BindTarget::MaterialRoughness { object: 0 },
        0.0..=1.0,
        "Roughness",
    );
    panel.add_control(
        &["Material"],
        BindTarget::MaterialMetalness { object: 0 },
        0.0..=1.0,
        "Metalness",
    );
    register_light_bindings(&mut panel, &scene);

    BuiltScene {
        scene,
        panel,
        texture_paths: None,
        model_path: Some(config.model.clone()),
    }
}
