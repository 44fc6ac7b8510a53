//! Procedural mesh data used when no model file is available.

use std::collections::HashMap;
use std::f32::consts::PI;

use glam::Vec3;

use super::mesh::{MeshData, MeshVertex};

/// UV sphere centered on the origin.
///
/// `segments` is clamped to at least 3 (longitude) and `rings` to at least 2
/// (latitude).
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    for iy in 0..=rings {
        let v = iy as f32 / rings as f32;
        let theta = v * PI;
        for ix in 0..=segments {
            let u = ix as f32 / segments as f32;
            let phi = u * PI * 2.0;
            let normal = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            vertices.push(MeshVertex {
                position: (normal * radius).to_array(),
                normal: normal.to_array(),
                uv: [u, v],
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
    for iy in 0..rings {
        for ix in 0..segments {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;
            // Pole rows collapse to a single triangle per quad.
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != rings - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData { vertices, indices }
}

/// Lumpy rock: a subdivided icosahedron with per-vertex radial noise.
///
/// Output depends only on the arguments, so every run produces the same rock.
pub fn rock(subdivisions: u32, roughness: f32, seed: u32) -> MeshData {
    let (mut positions, mut triangles) = icosahedron();
    for _ in 0..subdivisions {
        subdivide(&mut positions, &mut triangles);
    }

    let roughness = roughness.clamp(0.0, 0.9);
    let displaced: Vec<Vec3> = positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let n = hash01(i as u32 ^ seed.wrapping_mul(0x9E37_79B9));
            *p * (1.0 + roughness * (n - 0.5))
        })
        .collect();

    let mut normals = vec![Vec3::ZERO; displaced.len()];
    for t in &triangles {
        let [a, b, c] = t.map(|i| displaced[i as usize]);
        let face = (b - a).cross(c - a);
        for &i in t {
            normals[i as usize] += face;
        }
    }

    let vertices = displaced
        .iter()
        .zip(&normals)
        .zip(&positions)
        .map(|((p, n), dir)| MeshVertex {
            position: p.to_array(),
            normal: n.normalize_or_zero().to_array(),
            uv: [
                0.5 + dir.z.atan2(dir.x) / (2.0 * PI),
                0.5 - dir.y.clamp(-1.0, 1.0).asin() / PI,
            ],
        })
        .collect();

    MeshData {
        vertices,
        indices: triangles.into_iter().flatten().collect(),
    }
}

fn icosahedron() -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let positions = [
        [-1.0, t, 0.0], [1.0, t, 0.0], [-1.0, -t, 0.0], [1.0, -t, 0.0],
        [0.0, -1.0, t], [0.0, 1.0, t], [0.0, -1.0, -t], [0.0, 1.0, -t],
        [t, 0.0, -1.0], [t, 0.0, 1.0], [-t, 0.0, -1.0], [-t, 0.0, 1.0],
    ]
    .iter()
    .map(|p| Vec3::from_array(*p).normalize())
    .collect();

    let triangles = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    (positions, triangles)
}

/// Splits every triangle into four, sharing midpoints between neighbours.
fn subdivide(positions: &mut Vec<Vec3>, triangles: &mut Vec<[u32; 3]>) {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
        let key = (a.min(b), a.max(b));
        *midpoints.entry(key).or_insert_with(|| {
            let m = (positions[a as usize] + positions[b as usize]).normalize();
            positions.push(m);
            (positions.len() - 1) as u32
        })
    };

    let mut next = Vec::with_capacity(triangles.len() * 4);
    for &[a, b, c] in triangles.iter() {
        let ab = midpoint(a, b, positions);
        let bc = midpoint(b, c, positions);
        let ca = midpoint(c, a, positions);
        next.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
    }
    *triangles = next;
}

/// Integer hash mapped to [0, 1).
fn hash01(mut x: u32) -> f32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7FEB_352D);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846C_A68B);
    x ^= x >> 16;
    (x >> 8) as f32 / (1u32 << 24) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices_in_range(mesh: &MeshData) -> bool {
        let n = mesh.vertices.len() as u32;
        mesh.indices.iter().all(|&i| i < n)
    }

    #[test]
    fn sphere_counts() {
        let mesh = uv_sphere(1.0, 16, 8);
        assert_eq!(mesh.vertices.len(), 17 * 9);
        // Two pole rows contribute one triangle per quad, the rest two.
        assert_eq!(mesh.indices.len(), (16 * 8 * 2 - 16 * 2) * 3);
        assert!(indices_in_range(&mesh));
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = uv_sphere(2.5, 12, 6);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 2.5).abs() < 1e-4, "vertex at {len}");
        }
    }

    #[test]
    fn sphere_clamps_degenerate_resolution() {
        let mesh = uv_sphere(1.0, 0, 0);
        assert_eq!(mesh.vertices.len(), 4 * 3);
        assert!(!mesh.indices.is_empty());
    }

    #[test]
    fn rock_is_deterministic() {
        let a = rock(1, 0.4, 7);
        let b = rock(1, 0.4, 7);
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn rock_subdivision_counts() {
        let mesh = rock(1, 0.3, 1);
        // 12 + 30 shared edge midpoints.
        assert_eq!(mesh.vertices.len(), 42);
        assert_eq!(mesh.indices.len(), 80 * 3);
        assert!(indices_in_range(&mesh));
    }

    #[test]
    fn rock_radius_stays_within_roughness() {
        let mesh = rock(2, 0.4, 3);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((0.8 - 1e-4..=1.2 + 1e-4).contains(&len));
        }
    }

    #[test]
    fn hash_is_in_unit_interval() {
        for i in 0..1000 {
            let h = hash01(i);
            assert!((0.0..1.0).contains(&h));
        }
    }
}
