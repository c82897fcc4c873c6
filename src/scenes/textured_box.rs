use std::f32::consts::PI;

use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::geometry::box_mesh;
use crate::light::{LightTarget, WHITE};
use crate::lighting::primitive_rig;
use crate::material::Material;
use crate::panel::{Axis, BindTarget, ParameterPanel};
use crate::scene::{Scene, SceneObject};

use super::{register_light_bindings, BuiltScene};

/// The textured box under the four-light primitive rig. `full_controls`
/// additionally exposes mesh rotation and material tuning, the
/// box-material variant.
pub fn build(config: &ViewerConfig, width: u32, height: u32, full_controls: bool) -> BuiltScene {
    let controls = OrbitControls::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
    let mut camera = PerspectiveCamera::new(width, height);
    camera.position = controls.position();

    let mut scene = Scene::new(camera, controls);

    let mut cube = SceneObject::primitive(box_mesh(2.0, 2.0, 2.0), Material::standard(WHITE));
    cube.transform.position = Vec3::new(0.0, 1.0, 0.0);
    scene.objects.push(cube);

    let (lights, helpers) = primitive_rig(LightTarget::Object(0));
    scene.lights = lights;
    scene.helpers = helpers;

    let mut panel = ParameterPanel::new();
    if full_controls {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            panel.add_control(
                &["Mesh Rotation"],
                BindTarget::ObjectRotation { object: 0, axis },
                0.0..=PI * 2.0,
                &format!("Rotation {}", axis.label()),
            );
        }
        panel.add_control(
            &["Material"],
            BindTarget::MaterialMetalness { object: 0 },
            0.0..=1.0,
            "Metalness",
        );
        panel.add_control(
            &["Material"],
            BindTarget::MaterialRoughness { object: 0 },
            0.0..=1.0,
            "Roughness",
        );
    }
    register_light_bindings(&mut panel, &scene);

    BuiltScene {
        scene,
        panel,
        texture_paths: Some(config.texture.clone()),
        model_path: None,
    }
}
