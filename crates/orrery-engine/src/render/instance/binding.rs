use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use crate::render::mesh::{MeshId, MeshSet, Model};

use super::{INSTANCE_BUFFER_SLOT, InstanceBuffer, InstanceSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingError {
    /// The mesh is bound to an older buffer generation, or was never bound.
    StaleBinding {
        mesh: MeshId,
        bound: Option<u64>,
        current: u64,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleBinding { mesh, bound: Some(bound), current } => write!(
                f,
                "mesh {mesh:?} bound to instance generation {bound}, buffer is at {current}"
            ),
            Self::StaleBinding { mesh, bound: None, current } => write!(
                f,
                "mesh {mesh:?} never bound to instance buffer (generation {current})"
            ),
        }
    }
}

impl std::error::Error for BindingError {}

/// One instanced indexed draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancedDraw {
    pub mesh: MeshId,
    pub index_count: u32,
    pub instances: Range<u32>,
}

/// Tracks which instance-buffer generation each sub-mesh is bound to.
#[derive(Debug, Default)]
pub struct InstanceBinding {
    bound: HashMap<MeshId, u64>,
}

impl InstanceBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds every sub-mesh of `model` to the current generation of `buffer`.
    ///
    /// Calling it again without a reallocation in between is a no-op.
    pub fn bind(&mut self, model: &impl MeshSet, buffer: &impl InstanceSource) {
        let generation = buffer.generation();
        for (mesh, _) in model.mesh_keys() {
            self.bound.insert(mesh, generation);
        }
    }

    pub fn is_current(&self, mesh: MeshId, buffer: &impl InstanceSource) -> bool {
        self.bound.get(&mesh) == Some(&buffer.generation())
    }

    /// Plans one draw per sub-mesh covering every instance.
    ///
    /// An empty buffer yields no draws.
    pub fn draws(
        &self,
        model: &impl MeshSet,
        buffer: &impl InstanceSource,
    ) -> Result<Vec<InstancedDraw>, BindingError> {
        let count = buffer.count();
        if count == 0 {
            return Ok(Vec::new());
        }

        model
            .mesh_keys()
            .into_iter()
            .map(|(mesh, index_count)| {
                if !self.is_current(mesh, buffer) {
                    return Err(BindingError::StaleBinding {
                        mesh,
                        bound: self.bound.get(&mesh).copied(),
                        current: buffer.generation(),
                    });
                }
                Ok(InstancedDraw {
                    mesh,
                    index_count,
                    instances: 0..count,
                })
            })
            .collect()
    }

    /// Records the planned draws for `model` into `pass`.
    ///
    /// Expects the pipeline and bind groups to be set already. Returns the
    /// number of draw calls issued.
    pub fn record(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        model: &Model,
        buffer: &InstanceBuffer,
    ) -> Result<usize, BindingError> {
        let draws = self.draws(model, buffer)?;
        let Some(instances) = buffer.slice() else {
            return Ok(0);
        };

        pass.set_vertex_buffer(INSTANCE_BUFFER_SLOT, instances);
        let mut issued = 0;
        for draw in &draws {
            let Some(mesh) = model.meshes.iter().find(|m| m.id == draw.mesh) else {
                continue;
            };
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..draw.index_count, 0, draw.instances.clone());
            issued += 1;
        }
        Ok(issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::instance::InstanceStaging;
    use glam::Mat4;

    struct FakeModel(Vec<(MeshId, u32)>);

    impl FakeModel {
        fn with_meshes(n: usize) -> Self {
            Self((0..n).map(|i| (MeshId::next(), 36 * (i as u32 + 1))).collect())
        }
    }

    impl MeshSet for FakeModel {
        fn mesh_keys(&self) -> Vec<(MeshId, u32)> {
            self.0.clone()
        }
    }

    fn staged(n: u32) -> InstanceStaging {
        let mut s = InstanceStaging::new();
        s.stage(n, u64::MAX, |out| out.resize(n as usize, Mat4::IDENTITY)).unwrap();
        s
    }

    #[test]
    fn one_sub_mesh_gives_one_draw_of_all_instances() {
        let rock = FakeModel::with_meshes(1);
        let buffer = staged(3000);
        let mut binding = InstanceBinding::new();
        binding.bind(&rock, &buffer);

        let draws = binding.draws(&rock, &buffer).unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].instances, 0..3000);
        assert_eq!(draws[0].index_count, 36);
        assert_eq!(draws[0].mesh, rock.0[0].0);
    }

    #[test]
    fn draw_per_sub_mesh() {
        let rock = FakeModel::with_meshes(3);
        let buffer = staged(3000);
        let mut binding = InstanceBinding::new();
        binding.bind(&rock, &buffer);

        let draws = binding.draws(&rock, &buffer).unwrap();
        assert_eq!(draws.len(), 3);
        assert!(draws.iter().all(|d| d.instances == (0..3000)));
    }

    #[test]
    fn unbound_mesh_is_stale() {
        let rock = FakeModel::with_meshes(1);
        let buffer = staged(10);
        let binding = InstanceBinding::new();

        let err = binding.draws(&rock, &buffer).unwrap_err();
        assert_eq!(
            err,
            BindingError::StaleBinding { mesh: rock.0[0].0, bound: None, current: 1 }
        );
    }

    #[test]
    fn reallocation_requires_rebind() {
        let rock = FakeModel::with_meshes(2);
        let mut buffer = staged(10);
        let mut binding = InstanceBinding::new();
        binding.bind(&rock, &buffer);

        buffer.stage(20, u64::MAX, |out| out.resize(20, Mat4::IDENTITY)).unwrap();
        assert!(matches!(
            binding.draws(&rock, &buffer),
            Err(BindingError::StaleBinding { bound: Some(1), current: 2, .. })
        ));

        binding.bind(&rock, &buffer);
        assert_eq!(binding.draws(&rock, &buffer).unwrap().len(), 2);
    }

    #[test]
    fn in_place_update_keeps_binding() {
        let rock = FakeModel::with_meshes(1);
        let mut buffer = staged(10);
        let mut binding = InstanceBinding::new();
        binding.bind(&rock, &buffer);

        buffer.stage(10, u64::MAX, |out| out.resize(10, Mat4::ZERO)).unwrap();
        assert!(binding.is_current(rock.0[0].0, &buffer));
        assert!(binding.draws(&rock, &buffer).is_ok());
    }

    #[test]
    fn rebinding_is_harmless() {
        let rock = FakeModel::with_meshes(1);
        let buffer = staged(5);
        let mut binding = InstanceBinding::new();
        binding.bind(&rock, &buffer);
        binding.bind(&rock, &buffer);
        assert_eq!(binding.draws(&rock, &buffer).unwrap().len(), 1);
    }

    #[test]
    fn empty_buffer_skips_draws() {
        let rock = FakeModel::with_meshes(1);
        let buffer = staged(0);
        let binding = InstanceBinding::new();
        assert_eq!(binding.draws(&rock, &buffer), Ok(Vec::new()));
    }
}
