use std::collections::HashSet;
use std::f32::consts::PI;

use glam::Vec3;

use crate::math::Aabb;

/// CPU-side mesh: positions, normals, uvs and a triangle index list.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().map(|p| Vec3::from_array(*p)))
    }

    /// Unique edge list for line-topology drawing, two indices per edge.
    pub fn line_indices(&self) -> Vec<u32> {
        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        let mut lines = Vec::new();

        for tri in self.indices.chunks(3) {
            if tri.len() < 3 {
                continue;
            }
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = if a < b { (a, b) } else { (b, a) };
                if seen.insert(key) {
                    lines.push(a);
                    lines.push(b);
                }
            }
        }

        lines
    }
}

/// Area-weighted vertex normals for meshes that arrive without them.
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        let v0 = Vec3::from_array(positions[tri[0] as usize]);
        let v1 = Vec3::from_array(positions[tri[1] as usize]);
        let v2 = Vec3::from_array(positions[tri[2] as usize]);
        let face = (v1 - v0).cross(v2 - v0);

        for &i in tri {
            normals[i as usize] += face;
        }
    }

    normals
        .into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}

/// Axis-aligned box centered at the origin, four vertices per face.
pub fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let (hw, hh, hd) = (width * 0.5, height * 0.5, depth * 0.5);

    // (normal, four corners in CCW winding as seen from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-hw, -hh, hd],
                [hw, -hh, hd],
                [hw, hh, hd],
                [-hw, hh, hd],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [hw, -hh, -hd],
                [-hw, -hh, -hd],
                [-hw, hh, -hd],
                [hw, hh, -hd],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [hw, -hh, hd],
                [hw, -hh, -hd],
                [hw, hh, -hd],
                [hw, hh, hd],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-hw, -hh, -hd],
                [-hw, -hh, hd],
                [-hw, hh, hd],
                [-hw, hh, -hd],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-hw, hh, hd],
                [hw, hh, hd],
                [hw, hh, -hd],
                [-hw, hh, -hd],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-hw, -hh, -hd],
                [hw, -hh, -hd],
                [hw, -hh, hd],
                [-hw, -hh, hd],
            ],
        ),
    ];

    let mut mesh = MeshData::default();
    for (normal, corners) in faces {
        let base = mesh.positions.len() as u32;
        for (i, corner) in corners.into_iter().enumerate() {
            mesh.positions.push(corner);
            mesh.normals.push(normal);
            mesh.uvs.push(match i {
                0 => [0.0, 1.0],
                1 => [1.0, 1.0],
                2 => [1.0, 0.0],
                _ => [0.0, 0.0],
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    mesh
}

/// UV sphere centered at the origin.
pub fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);

    let mut mesh = MeshData::default();

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let phi = v * PI;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let theta = u * 2.0 * PI;

            let dir = Vec3::new(
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            );
            mesh.positions.push((dir * radius).to_array());
            mesh.normals.push(dir.normalize_or_zero().to_array());
            mesh.uvs.push([u, v]);
        }
    }

    let stride = w + 1;
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * stride + ix;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;

            // Skip the degenerate triangle that collapses at each pole.
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, c, b]);
            }
            if iy != h - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    mesh
}

/// Capped cylinder centered at the origin, axis along +Y.
pub fn cylinder_mesh(radius: f32, height: f32, radial_segments: u32) -> MeshData {
    let n = radial_segments.max(3);
    let hh = height * 0.5;

    let mut mesh = MeshData::default();

    // Side wall: two rings sharing vertical normals-free seam at u = 0/1.
    for iy in 0..=1u32 {
        let y = if iy == 0 { hh } else { -hh };
        for ix in 0..=n {
            let u = ix as f32 / n as f32;
            let theta = u * 2.0 * PI;
            let (sin, cos) = theta.sin_cos();

            mesh.positions.push([radius * sin, y, radius * cos]);
            mesh.normals.push([sin, 0.0, cos]);
            mesh.uvs.push([u, iy as f32]);
        }
    }

    let stride = n + 1;
    for ix in 0..n {
        let a = ix;
        let b = ix + 1;
        let c = ix + stride;
        let d = c + 1;
        mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
    }

    // Caps: fan around a center vertex.
    for (y, normal_y) in [(hh, 1.0f32), (-hh, -1.0f32)] {
        let center = mesh.positions.len() as u32;
        mesh.positions.push([0.0, y, 0.0]);
        mesh.normals.push([0.0, normal_y, 0.0]);
        mesh.uvs.push([0.5, 0.5]);

        let ring = mesh.positions.len() as u32;
        for ix in 0..=n {
            let theta = ix as f32 / n as f32 * 2.0 * PI;
            let (sin, cos) = theta.sin_cos();
            mesh.positions.push([radius * sin, y, radius * cos]);
            mesh.normals.push([0.0, normal_y, 0.0]);
            mesh.uvs.push([0.5 + 0.5 * sin, 0.5 + 0.5 * cos]);
        }

        for ix in 0..n {
            if normal_y > 0.0 {
                mesh.indices
                    .extend_from_slice(&[center, ring + ix + 1, ring + ix]);
            } else {
                mesh.indices
                    .extend_from_slice(&[center, ring + ix, ring + ix + 1]);
            }
        }
    }

    mesh
}
