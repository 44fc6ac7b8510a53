//! Sub-meshes, models and the glTF loader.
//!
//! Loading is split in two: [`load_model_data`] produces CPU-side [`ModelData`]
//! (and never fails, falling back to procedural geometry), then
//! [`Model::upload`] turns it into GPU buffers.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, Result, ensure};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::geometry;
use super::texture::{ImageRgba, Texture};

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Per-vertex layout for buffer slot 0 (shader locations 0..=2).
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle list on the CPU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

// ── sources ───────────────────────────────────────────────────────────────

/// Geometry used when a model file is absent or unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedural {
    Sphere,
    Rock,
}

impl Procedural {
    fn build(self) -> MeshData {
        match self {
            Procedural::Sphere => geometry::uv_sphere(1.0, 48, 24),
            Procedural::Rock => geometry::rock(1, 0.45, 17),
        }
    }
}

/// Where a model comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSource {
    /// glTF/GLB file; `None` goes straight to the procedural fallback.
    pub path: Option<PathBuf>,

    /// Image used when the model carries no base-color texture.
    pub texture: Option<PathBuf>,

    pub fallback: Procedural,

    /// Color of the 1x1 texture used when no image is available.
    pub tint: [u8; 4],
}

impl ModelSource {
    pub fn procedural(fallback: Procedural, tint: [u8; 4]) -> Self {
        Self {
            path: None,
            texture: None,
            fallback,
            tint,
        }
    }

    /// Resolves relative `path`/`texture` against `dir`.
    pub fn resolved_in(mut self, dir: &Path) -> Self {
        self.path = self.path.map(|p| dir.join(p));
        self.texture = self.texture.map(|p| dir.join(p));
        self
    }
}

/// CPU-side model: one entry per sub-mesh plus the diffuse image.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    pub diffuse: ImageRgba,
}

/// Loads a model, falling back to procedural geometry and a solid texture.
///
/// Fallbacks are logged at `warn` when a configured file could not be used.
pub fn load_model_data(name: &str, source: &ModelSource) -> ModelData {
    let mut diffuse = None;

    let meshes = match source.path.as_deref() {
        Some(path) => match import_gltf(path) {
            Ok((meshes, image)) => {
                log::info!("model '{name}': {} sub-mesh(es) from {}", meshes.len(), path.display());
                diffuse = image;
                meshes
            }
            Err(e) => {
                log::warn!("model '{name}': {e:#}; using procedural {:?}", source.fallback);
                vec![source.fallback.build()]
            }
        },
        None => vec![source.fallback.build()],
    };

    if diffuse.is_none()
        && let Some(path) = source.texture.as_deref()
    {
        match ImageRgba::open(path) {
            Ok(img) => diffuse = Some(img),
            Err(e) => log::warn!("model '{name}': {e:#}; using solid tint"),
        }
    }

    ModelData {
        meshes,
        diffuse: diffuse.unwrap_or_else(|| ImageRgba::solid(source.tint)),
    }
}

fn import_gltf(path: &Path) -> Result<(Vec<MeshData>, Option<ImageRgba>)> {
    let (document, buffers, images) =
        gltf::import(path).with_context(|| format!("failed to import {}", path.display()))?;

    let mut meshes = Vec::new();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("skipping non-triangle primitive in {}", path.display());
                continue;
            }
            meshes.push(read_primitive(&primitive, &buffers)?);
        }
    }
    ensure!(!meshes.is_empty(), "{} contains no triangle meshes", path.display());

    let diffuse = document
        .materials()
        .filter_map(|m| m.pbr_metallic_roughness().base_color_texture())
        .filter_map(|info| images.get(info.texture().source().index()))
        .find_map(ImageRgba::from_gltf);

    Ok((meshes, diffuse))
}

fn read_primitive(primitive: &gltf::Primitive<'_>, buffers: &[gltf::buffer::Data]) -> Result<MeshData> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| b.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .context("primitive has no positions")?
        .collect();
    let mut normals = reader.read_normals().map(|n| n.collect::<Vec<_>>()).unwrap_or_default();
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect())
        .unwrap_or_default();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(i) => i.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    ensure!(
        indices.iter().all(|&i| (i as usize) < positions.len()),
        "primitive index out of range"
    );

    if normals.len() != positions.len() {
        normals = face_normals(&positions, &indices);
    }

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, p)| MeshVertex {
            position: *p,
            normal: normals[i],
            uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect();

    Ok(MeshData { vertices, indices })
}

/// Area-weighted vertex normals for meshes that ship without them.
fn face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    use glam::Vec3;

    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(positions[i as usize]));
        let n = (b - a).cross(c - a);
        for &i in tri {
            acc[i as usize] += n;
        }
    }
    acc.into_iter().map(|n| n.normalize_or_zero().to_array()).collect()
}

// ── GPU ───────────────────────────────────────────────────────────────────

/// Identifies one sub-mesh for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u32);

impl MeshId {
    pub fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Anything that exposes sub-meshes by id and index count.
///
/// The instance binder works against this so draw planning stays GPU-free.
pub trait MeshSet {
    fn mesh_keys(&self) -> Vec<(MeshId, u32)>;
}

pub struct Mesh {
    pub id: MeshId,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl Mesh {
    pub fn upload(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            id: MeshId::next(),
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

/// Sub-meshes sharing one diffuse texture.
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub diffuse: Texture,
}

impl Model {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, name: &str, data: &ModelData) -> Self {
        let meshes = data
            .meshes
            .iter()
            .enumerate()
            .map(|(i, m)| Mesh::upload(device, &format!("{name} mesh {i}"), m))
            .collect();
        let diffuse = Texture::upload(device, queue, &format!("{name} diffuse"), &data.diffuse);

        Self {
            name: name.to_string(),
            meshes,
            diffuse,
        }
    }

    /// Loads from `source` and uploads in one step.
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, name: &str, source: &ModelSource) -> Self {
        Self::upload(device, queue, name, &load_model_data(name, source))
    }
}

impl MeshSet for Model {
    fn mesh_keys(&self) -> Vec<(MeshId, u32)> {
        self.meshes.iter().map(|m| (m.id, m.index_count)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_struct() {
        let layout = MeshVertex::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 1, 2]);
    }

    #[test]
    fn mesh_ids_are_unique() {
        let a = MeshId::next();
        let b = MeshId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn no_path_uses_procedural_and_tint() {
        let source = ModelSource::procedural(Procedural::Rock, [9, 8, 7, 255]);
        let data = load_model_data("rock", &source);
        assert_eq!(data.meshes.len(), 1);
        assert_eq!(data.meshes[0], geometry::rock(1, 0.45, 17));
        assert_eq!(data.diffuse, ImageRgba::solid([9, 8, 7, 255]));
    }

    #[test]
    fn missing_file_falls_back() {
        let source = ModelSource {
            path: Some(PathBuf::from("/nonexistent/planet.glb")),
            texture: Some(PathBuf::from("/nonexistent/planet.png")),
            fallback: Procedural::Sphere,
            tint: [1, 2, 3, 255],
        };
        let data = load_model_data("planet", &source);
        assert_eq!(data.meshes.len(), 1);
        assert!(!data.meshes[0].indices.is_empty());
        assert_eq!(data.diffuse, ImageRgba::solid([1, 2, 3, 255]));
    }

    #[test]
    fn resolved_in_joins_relative_paths() {
        let source = ModelSource {
            path: Some(PathBuf::from("rock.glb")),
            texture: None,
            fallback: Procedural::Rock,
            tint: [0; 4],
        }
        .resolved_in(Path::new("/assets"));
        assert_eq!(source.path, Some(PathBuf::from("/assets/rock.glb")));
        assert_eq!(source.texture, None);
    }

    #[test]
    fn face_normals_point_out_of_triangle() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = face_normals(&positions, &[0, 1, 2]);
        for n in normals {
            assert_eq!(n, [0.0, 0.0, 1.0]);
        }
    }
}
