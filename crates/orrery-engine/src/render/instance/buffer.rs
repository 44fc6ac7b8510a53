use std::fmt;

use glam::Mat4;

use super::InstanceSource;

/// Bytes per instance transform.
pub const TRANSFORM_SIZE: u64 = std::mem::size_of::<Mat4>() as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceBufferError {
    /// The requested count would exceed the device's buffer size limit.
    TooLarge { requested: u64, max: u64 },
    /// The generator wrote a different number of transforms than requested.
    CountMismatch { expected: u32, produced: usize },
}

impl fmt::Display for InstanceBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { requested, max } => write!(
                f,
                "instance buffer of {requested} bytes exceeds device limit of {max} bytes"
            ),
            Self::CountMismatch { expected, produced } => write!(
                f,
                "expected {expected} instance transforms, generator produced {produced}"
            ),
        }
    }
}

impl std::error::Error for InstanceBufferError {}

/// What a staging pass did to the backing allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Count is zero; no allocation is kept.
    Empty,
    /// Same count as before; contents overwritten in place.
    InPlace,
    /// Count changed; a new allocation replaces the old one.
    Reallocated,
}

/// CPU half of an instance buffer: the reusable transform vector plus the
/// allocation bookkeeping.
#[derive(Debug, Default)]
pub struct InstanceStaging {
    transforms: Vec<Mat4>,
    committed: u32,
    generation: u64,
}

impl InstanceStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks `count` against `max_bytes`, then clears the staging vector and
    /// lets `fill` write exactly `count` transforms.
    ///
    /// `fill` is not called when the size check fails. On error the previously
    /// committed count and generation are kept.
    pub fn stage<F>(&mut self, count: u32, max_bytes: u64, fill: F) -> Result<StageOutcome, InstanceBufferError>
    where
        F: FnOnce(&mut Vec<Mat4>),
    {
        let requested = count as u64 * TRANSFORM_SIZE;
        if requested > max_bytes {
            return Err(InstanceBufferError::TooLarge { requested, max: max_bytes });
        }

        self.transforms.clear();
        fill(&mut self.transforms);
        let produced = self.transforms.len();
        if produced != count as usize {
            self.transforms.clear();
            return Err(InstanceBufferError::CountMismatch { expected: count, produced });
        }

        let outcome = if count == 0 {
            StageOutcome::Empty
        } else if count == self.committed {
            StageOutcome::InPlace
        } else {
            StageOutcome::Reallocated
        };

        if count != self.committed {
            self.generation += 1;
        }
        self.committed = count;
        Ok(outcome)
    }

    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transforms)
    }

    /// Byte length of the committed allocation (`count · 64`).
    pub fn byte_len(&self) -> u64 {
        self.committed as u64 * TRANSFORM_SIZE
    }
}

impl InstanceSource for InstanceStaging {
    fn count(&self) -> u32 {
        self.committed
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

/// GPU instance buffer holding one `Mat4` per instance.
///
/// The buffer is sized exactly to the instance count. It is rewritten in place
/// while the count is stable and reallocated (new generation) when it changes.
pub struct InstanceBuffer {
    label: String,
    staging: InstanceStaging,
    buffer: Option<wgpu::Buffer>,
}

impl InstanceBuffer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            staging: InstanceStaging::new(),
            buffer: None,
        }
    }

    /// Regenerates `count` transforms through `fill` and queues the upload.
    ///
    /// The upload is ordered before any draw in the next queue submission.
    pub fn update<F>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        count: u32,
        fill: F,
    ) -> Result<StageOutcome, InstanceBufferError>
    where
        F: FnOnce(&mut Vec<Mat4>),
    {
        let outcome = self.staging.stage(count, device.limits().max_buffer_size, fill)?;

        if outcome == StageOutcome::Empty {
            self.buffer = None;
            return Ok(outcome);
        }

        if outcome == StageOutcome::Reallocated || self.buffer.is_none() {
            log::debug!(
                "{}: allocating {} instances ({} bytes, generation {})",
                self.label,
                self.staging.count(),
                self.staging.byte_len(),
                self.staging.generation(),
            );
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&self.label),
                size: self.staging.byte_len(),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }

        if let Some(buffer) = self.buffer.as_ref() {
            queue.write_buffer(buffer, 0, self.staging.bytes());
        }
        Ok(outcome)
    }

    pub fn slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        self.buffer.as_ref().map(|b| b.slice(..))
    }

    pub fn byte_len(&self) -> u64 {
        self.staging.byte_len()
    }
}

impl InstanceSource for InstanceBuffer {
    fn count(&self) -> u32 {
        self.staging.count()
    }

    fn generation(&self) -> u64 {
        self.staging.generation()
    }
}
