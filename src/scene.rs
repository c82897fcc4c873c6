use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::geometry::MeshData;
use crate::light::{Light, LightTarget};
use crate::lighting::LightHelper;
use crate::material::Material;
use crate::math::Aabb;

/// The scene configurations a caller can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Box,
    Sphere,
    Cylinder,
    BoxMaterial,
    Model,
}

impl SceneKind {
    pub fn name(&self) -> &'static str {
        match self {
            SceneKind::Box => "box",
            SceneKind::Sphere => "sphere",
            SceneKind::Cylinder => "cylinder",
            SceneKind::BoxMaterial => "box-material",
            SceneKind::Model => "model",
        }
    }
}

/// Position/rotation/scale of a scene object. Rotation is XYZ Euler in
/// radians.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_euler(
                EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
            ),
            self.position,
        )
    }
}

/// One mesh of an externally loaded model, transforms already baked into
/// its vertices.
#[derive(Debug, Clone)]
pub struct ModelMesh {
    pub mesh: MeshData,
    pub material: Material,
}

/// Geometry payload of a scene object: either a built primitive with a
/// single material, or a loaded mesh tree with per-mesh materials.
#[derive(Debug, Clone)]
pub enum Geometry {
    Primitive { mesh: MeshData, material: Material },
    Model { meshes: Vec<ModelMesh> },
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub geometry: Geometry,
    pub transform: Transform,
    /// Continuous rotation rate in radians per second applied to all three
    /// axes, driven by elapsed time.
    pub spin: Option<f32>,
}

impl SceneObject {
    pub fn primitive(mesh: MeshData, material: Material) -> Self {
        Self {
            geometry: Geometry::Primitive { mesh, material },
            transform: Transform::default(),
            spin: None,
        }
    }

    pub fn model(meshes: Vec<ModelMesh>) -> Self {
        Self {
            geometry: Geometry::Model { meshes },
            transform: Transform::default(),
            spin: None,
        }
    }

    pub fn bounds(&self) -> Aabb {
        let local = match &self.geometry {
            Geometry::Primitive { mesh, .. } => mesh.bounds(),
            Geometry::Model { meshes } => meshes
                .iter()
                .map(|m| m.mesh.bounds())
                .reduce(|a, b| a.union(&b))
                .unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO)),
        };
        local.transformed(&self.transform.matrix())
    }

    /// The material of a primitive, or `None` for a model (which carries one
    /// per mesh).
    pub fn material(&self) -> Option<&Material> {
        match &self.geometry {
            Geometry::Primitive { material, .. } => Some(material),
            Geometry::Model { .. } => None,
        }
    }

    /// Visit every material of this object.
    pub fn for_each_material(&mut self, mut f: impl FnMut(&mut Material)) {
        match &mut self.geometry {
            Geometry::Primitive { material, .. } => f(material),
            Geometry::Model { meshes } => {
                for m in meshes {
                    f(&mut m.material);
                }
            }
        }
    }
}

/// A mounted viewing session: objects, lights, one camera, one set of orbit
/// controls. Owned exclusively by the lifecycle manager while mounted.
#[derive(Debug, Clone)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Vec<Light>,
    pub helpers: Vec<LightHelper>,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
}

impl Scene {
    pub fn new(camera: PerspectiveCamera, controls: OrbitControls) -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            helpers: Vec::new(),
            camera,
            controls,
        }
    }

    /// Per-frame state advance: orbit damping/auto-rotate writes the camera
    /// position, then elapsed-time animation updates object rotations.
    pub fn update(&mut self, delta: f32, elapsed: f32) {
        self.camera.position = self.controls.update(delta);

        for object in &mut self.objects {
            if let Some(rate) = object.spin {
                let angle = elapsed * rate;
                object.transform.rotation = Vec3::splat(angle);
            }
        }
    }

    /// Rebuild light helper geometry from the lights' current state. Runs
    /// once per frame so helpers track live edits.
    pub fn refresh_helpers(&mut self) {
        let targets: Vec<Vec3> = self
            .lights
            .iter()
            .map(|l| resolve_target(l.target(), &self.objects))
            .collect();

        for helper in &mut self.helpers {
            if let Some(light) = self.lights.get(helper.light) {
                helper.refresh(light, targets[helper.light]);
            }
        }
    }

    /// World position a light with the given target points at.
    pub fn resolve_light_target(&self, target: Option<LightTarget>) -> Vec3 {
        resolve_target(target, &self.objects)
    }
}

fn resolve_target(target: Option<LightTarget>, objects: &[SceneObject]) -> Vec3 {
    match target {
        Some(LightTarget::Object(index)) => objects
            .get(index)
            .map(|o| o.transform.position)
            .unwrap_or(Vec3::ZERO),
        Some(LightTarget::Origin) | None => Vec3::ZERO,
    }
}
