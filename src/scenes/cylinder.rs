use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::geometry::cylinder_mesh;
use crate::light::RED;
use crate::material::Material;
use crate::panel::{BindTarget, ParameterPanel};
use crate::scene::{Scene, SceneObject};

use super::BuiltScene;

/// A red wireframe cylinder in the same family as the sphere scene.
pub fn build(width: u32, height: u32) -> BuiltScene {
    let controls = OrbitControls::new(Vec3::new(0.0, 0.0, 35.0), Vec3::ZERO);
    let mut camera = PerspectiveCamera::new(width, height);
    camera.position = controls.position();

    let mut scene = Scene::new(camera, controls);

    let mut cylinder =
        SceneObject::primitive(cylinder_mesh(10.0, 20.0, 32), Material::wireframe(RED));
    cylinder.spin = Some(0.5);
    scene.objects.push(cylinder);

    let mut panel = ParameterPanel::new();
    panel.add_color_control(
        &["Material"],
        BindTarget::MaterialColor { object: 0 },
        "Wireframe Color",
    );

    BuiltScene {
        scene,
        panel,
        texture_paths: None,
        model_path: None,
    }
}
