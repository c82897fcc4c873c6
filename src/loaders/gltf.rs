use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use glam::{Mat4, Vec3};
use log::debug;

use crate::error::LoadError;
use crate::geometry::{compute_normals, MeshData};
use crate::material::{Material, MODEL_METALNESS, MODEL_ROUGHNESS};
use crate::math::Aabb;
use crate::scene::ModelMesh;

/// Largest dimension of a normalized model, in world units.
pub const MODEL_TARGET_SIZE: f32 = 3.0;

/// An externally loaded mesh tree, flattened with node transforms baked
/// into vertex positions, plus its computed bounding box.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub meshes: Vec<ModelMesh>,
    pub bounds: Aabb,
}

impl LoadedModel {
    pub fn from_meshes(meshes: Vec<ModelMesh>) -> Self {
        let bounds = meshes
            .iter()
            .map(|m| m.mesh.bounds())
            .reduce(|a, b| a.union(&b))
            .unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO));
        Self { meshes, bounds }
    }

    /// Center the model at the origin and scale it so the largest bounding
    /// box dimension equals [`MODEL_TARGET_SIZE`]. Returns the
    /// pre-normalization center so the caller can recenter orbit targeting.
    pub fn normalize(&mut self) -> Vec3 {
        let center = self.bounds.center();
        let largest = self.bounds.largest_dimension();
        let scale = if largest > f32::EPSILON {
            MODEL_TARGET_SIZE / largest
        } else {
            1.0
        };

        for model_mesh in &mut self.meshes {
            for p in &mut model_mesh.mesh.positions {
                let v = (Vec3::from_array(*p) - center) * scale;
                *p = v.to_array();
            }
        }

        self.bounds = self
            .meshes
            .iter()
            .map(|m| m.mesh.bounds())
            .reduce(|a, b| a.union(&b))
            .unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO));

        center
    }

    /// Rebind every mesh to a consistent standard response, preserving each
    /// source material's base color.
    pub fn rebind_materials(&mut self) {
        for model_mesh in &mut self.meshes {
            let color = model_mesh.material.color();
            let mut material = Material::standard(color);
            material.set_metalness(MODEL_METALNESS);
            material.set_roughness(MODEL_ROUGHNESS);
            model_mesh.material = material;
        }
    }
}

/// Parse a glTF/GLB file into a flat mesh list.
pub fn load_model(path: &Path) -> Result<LoadedModel, LoadError> {
    let (document, buffers, _images) =
        gltf::import(path).map_err(|e| LoadError::AssetUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut meshes = Vec::new();
    for scene in document.scenes() {
        for node in scene.nodes() {
            collect_node(&node, &buffers, &Mat4::IDENTITY, &mut meshes);
        }
    }

    if meshes.is_empty() {
        return Err(LoadError::AssetUnavailable {
            path: path.to_path_buf(),
            reason: "no mesh geometry in file".to_string(),
        });
    }

    debug!("loaded model {:?}: {} meshes", path, meshes.len());
    Ok(LoadedModel::from_meshes(meshes))
}

fn collect_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: &Mat4,
    out: &mut Vec<ModelMesh>,
) {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global = *parent * local;

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if let Some(model_mesh) = read_primitive(&primitive, buffers, &global) {
                out.push(model_mesh);
            }
        }
    }

    for child in node.children() {
        collect_node(&child, buffers, &global, out);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
) -> Option<ModelMesh> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()?
        .map(|p| transform.transform_point3(Vec3::from_array(p)).to_array())
        .collect();
    if positions.is_empty() {
        return None;
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    // Normals rotate with the inverse-transpose; missing normals are
    // recomputed from the transformed triangles.
    let normal_matrix = transform.inverse().transpose();
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals
            .map(|n| {
                normal_matrix
                    .transform_vector3(Vec3::from_array(n))
                    .normalize_or_zero()
                    .to_array()
            })
            .collect(),
        None => compute_normals(&positions, &indices),
    };

    let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
        Some(coords) => coords.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };

    let base = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    Some(ModelMesh {
        mesh: MeshData {
            positions,
            normals,
            uvs,
            indices,
        },
        material: Material::standard([base[0], base[1], base[2]]),
    })
}

/// Asynchronous model load: fetch and parse on a worker thread, delivered
/// through a channel the owner polls once per frame.
///
/// There is no cancellation primitive; the disposal guard is the mount
/// generation recorded at spawn, checked by the consumer before any state is
/// touched. Dropping the loader closes the channel and late completions are
/// discarded by the worker's failed send.
pub struct ModelLoader {
    rx: Receiver<Result<LoadedModel, LoadError>>,
    generation: u64,
}

impl ModelLoader {
    pub fn spawn(path: PathBuf, generation: u64) -> Self {
        let (tx, rx) = channel();
        thread::spawn(move || {
            let _ = tx.send(load_model(&path));
        });
        Self { rx, generation }
    }

    /// The completed load, if it has arrived. Never blocks.
    pub fn poll(&self) -> Option<Result<LoadedModel, LoadError>> {
        self.rx.try_recv().ok()
    }

    /// Mount generation this load was spawned under.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::box_mesh;
    use std::time::Duration;

    fn offset_box(center: Vec3, size: f32) -> ModelMesh {
        let mut mesh = box_mesh(size, size, size);
        for p in &mut mesh.positions {
            let v = Vec3::from_array(*p) + center;
            *p = v.to_array();
        }
        ModelMesh {
            mesh,
            material: Material::standard([0.2, 0.4, 0.6]),
        }
    }

    #[test]
    fn normalize_centers_and_scales_to_target() {
        let mut model = LoadedModel::from_meshes(vec![
            offset_box(Vec3::new(10.0, 4.0, -2.0), 1.0),
            offset_box(Vec3::new(16.0, 6.0, 0.0), 1.0),
        ]);

        let reported = model.normalize();

        assert!((reported - Vec3::new(13.0, 5.0, -1.0)).length() < 1e-4);
        assert!(model.bounds.center().length() < 1e-4);
        assert!((model.bounds.largest_dimension() - MODEL_TARGET_SIZE).abs() < 1e-4);
    }

    #[test]
    fn normalize_of_degenerate_model_does_not_explode() {
        let mut mesh = box_mesh(1.0, 1.0, 1.0);
        for p in &mut mesh.positions {
            *p = [2.0, 2.0, 2.0];
        }
        let mut model = LoadedModel::from_meshes(vec![ModelMesh {
            mesh,
            material: Material::standard([1.0, 1.0, 1.0]),
        }]);

        model.normalize();
        for p in &model.meshes[0].mesh.positions {
            assert!(p.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn rebind_unifies_response_and_keeps_color() {
        let mut model = LoadedModel::from_meshes(vec![offset_box(Vec3::ZERO, 1.0)]);
        model.meshes[0].material.set_roughness(0.9);
        model.meshes[0].material.set_metalness(0.1);

        model.rebind_materials();

        let material = &model.meshes[0].material;
        assert_eq!(material.roughness(), Some(MODEL_ROUGHNESS));
        assert_eq!(material.metalness(), Some(MODEL_METALNESS));
        assert_eq!(material.color(), [0.2, 0.4, 0.6]);
        assert!(material.maps().unwrap().color.is_none());
    }

    #[test]
    fn load_model_reports_missing_asset() {
        let err = load_model(Path::new("no/such/model.glb")).unwrap_err();
        assert!(matches!(err, LoadError::AssetUnavailable { .. }));
    }

    #[test]
    fn loader_delivers_the_failure_without_blocking() {
        let loader = ModelLoader::spawn(PathBuf::from("no/such/model.glb"), 3);
        assert_eq!(loader.generation(), 3);

        let mut outcome = None;
        for _ in 0..200 {
            if let Some(result) = loader.poll() {
                outcome = Some(result);
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        assert!(matches!(
            outcome,
            Some(Err(LoadError::AssetUnavailable { .. }))
        ));
    }

    #[test]
    fn dropping_the_loader_mid_flight_is_safe() {
        let loader = ModelLoader::spawn(PathBuf::from("no/such/model.glb"), 1);
        drop(loader);
        thread::sleep(Duration::from_millis(20));
    }
}
