use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::geometry::sphere_mesh;
use crate::light::RED;
use crate::material::Material;
use crate::panel::{BindTarget, ParameterPanel};
use crate::scene::{Scene, SceneObject};

use super::BuiltScene;

/// A red wireframe sphere rotating continuously, viewed from a distance.
/// Wireframe bypasses lighting, so the scene carries no lights.
pub fn build(width: u32, height: u32) -> BuiltScene {
    let controls = OrbitControls::new(Vec3::new(0.0, 0.0, 35.0), Vec3::ZERO);
    let mut camera = PerspectiveCamera::new(width, height);
    camera.position = controls.position();

    let mut scene = Scene::new(camera, controls);

    let mut sphere = SceneObject::primitive(sphere_mesh(15.0, 32, 16), Material::wireframe(RED));
    sphere.transform.position = Vec3::new(0.0, 3.0, 0.0);
    sphere.spin = Some(0.5);
    scene.objects.push(sphere);

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
