//! Per-instance transform streams.
//!
//! [`InstanceBuffer`] owns the GPU copy of a field's transforms and
//! [`InstanceBinding`] attaches it to every sub-mesh of a model as four `vec4`
//! attributes stepped per instance.

mod binding;
mod buffer;

pub use binding::{BindingError, InstanceBinding, InstancedDraw};
pub use buffer::{InstanceBuffer, InstanceBufferError, InstanceStaging, StageOutcome, TRANSFORM_SIZE};

/// First shader location of the transform columns (0..=2 are the mesh's).
pub const INSTANCE_ATTRIBUTE_BASE: u32 = 3;

/// Vertex buffer slot the instance buffer is bound to.
pub const INSTANCE_BUFFER_SLOT: u32 = 1;

const INSTANCE_ATTRS: [wgpu::VertexAttribute; 4] =
    wgpu::vertex_attr_array![3 => Float32x4, 4 => Float32x4, 5 => Float32x4, 6 => Float32x4];

/// Layout of one `Mat4` per instance: four column vectors at locations 3..=6.
pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: TRANSFORM_SIZE,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &INSTANCE_ATTRS,
    }
}

/// Count and allocation generation of an instance stream.
pub trait InstanceSource {
    fn count(&self) -> u32;
    fn generation(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_steps_per_instance() {
        let layout = instance_layout();
        assert_eq!(layout.array_stride, 64);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
    }

    #[test]
    fn columns_are_consecutive_from_base() {
        let layout = instance_layout();
        for (i, attr) in layout.attributes.iter().enumerate() {
            assert_eq!(attr.shader_location, INSTANCE_ATTRIBUTE_BASE + i as u32);
            assert_eq!(attr.offset, 16 * i as u64);
            assert_eq!(attr.format, wgpu::VertexFormat::Float32x4);
        }
        assert_eq!(layout.attributes.len(), 4);
    }
}
