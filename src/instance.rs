//! # Instance Buffer
//!
//! Per-instance data lives in its own vertex buffer, bound to the second input slot of the
//! pipeline with a step mode of [`wgpu::VertexStepMode::Instance`]: the vertex shader reads the
//! next transform only when it starts on the next cube.
//!
//! [`InstanceBuffer`] reserves storage for a fixed number of transforms once, at start-up, and
//! only its contents change afterwards. Every repopulation uploads the whole instance array.

use crate::backend::{BufferAllocator, BufferBinding, BufferRequest, BufferUsage};
use crate::error::RenderError;

/// Debug label of the instance buffer.
pub const INSTANCE_BUFFER_LABEL: &str = "Instance Data Buffer";

/// The per-instance record as stored on the GPU: one column-major world transform.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: nalgebra_glm::Mat4,
}

impl InstanceRaw {
    /// Layout of the instance stream. A `mat4x4` takes four vertex slots, one per column.
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<nalgebra_glm::Mat4> for InstanceRaw {
    fn from(model: nalgebra_glm::Mat4) -> Self {
        Self { model }
    }
}

/// Fixed-capacity GPU buffer holding the current instance array.
pub struct InstanceBuffer<B> {
    buffer: B,
    capacity: usize,
    len: usize,
}

impl<B> InstanceBuffer<B> {
    /// Reserves room for `max_instances` transforms.
    pub fn new<R>(device: &R, max_instances: usize) -> Result<Self, RenderError>
    where
        R: BufferAllocator<Buffer = B> + ?Sized,
    {
        let size = max_instances
            .checked_mul(std::mem::size_of::<InstanceRaw>())
            .and_then(|size| u64::try_from(size).ok())
            .ok_or(RenderError::InvalidBufferSize {
                label: INSTANCE_BUFFER_LABEL.to_owned(),
                size: u64::MAX,
                max: usize::MAX as u64,
            })?;
        let buffer = device.create_buffer(&BufferRequest::sized(
            INSTANCE_BUFFER_LABEL,
            BufferBinding::Vertex,
            BufferUsage::Default,
            size,
        ))?;
        log::debug!("Reserved instance buffer for {max_instances} instances ({size} bytes)");
        Ok(Self {
            buffer,
            capacity: max_instances,
            len: 0,
        })
    }

    /// Replaces the buffer's contents with `transforms`.
    ///
    /// Fails without touching the buffer when `transforms` does not fit.
    pub fn repopulate<R>(
        &mut self,
        device: &R,
        transforms: &[nalgebra_glm::Mat4],
    ) -> Result<(), RenderError>
    where
        R: BufferAllocator<Buffer = B> + ?Sized,
    {
        if transforms.len() > self.capacity {
            return Err(RenderError::InstanceCapacityExceeded {
                requested: transforms.len(),
                capacity: self.capacity,
            });
        }
        let instances: Vec<InstanceRaw> =
            transforms.iter().copied().map(InstanceRaw::from).collect();
        if !instances.is_empty() {
            device.update_buffer(&self.buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.len = instances.len();
        Ok(())
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Number of instances written by the last successful repopulation.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingDevice;

    fn transforms(count: usize) -> Vec<nalgebra_glm::Mat4> {
        (0..count)
            .map(|i| nalgebra_glm::translation(&nalgebra_glm::vec3(i as f32, 0.5, -1.25)))
            .collect()
    }

    #[test]
    fn reserves_capacity_for_max_instances() {
        let device = RecordingDevice::default();
        let instances = InstanceBuffer::new(&device, 8).unwrap();
        assert_eq!(instances.capacity(), 8);
        assert!(instances.is_empty());

        let buffer = device.buffer(*instances.buffer());
        assert_eq!(buffer.bytes.len(), 8 * 64);
        assert_eq!(buffer.binding, BufferBinding::Vertex);
        assert_eq!(buffer.usage, BufferUsage::Default);
    }

    #[test]
    fn byte_size_overflow_is_rejected_before_allocation() {
        let device = RecordingDevice::default();
        let err = InstanceBuffer::new(&device, usize::MAX / 2).err().unwrap();
        assert!(matches!(
            err,
            RenderError::InvalidBufferSize { ref label, .. } if label == INSTANCE_BUFFER_LABEL
        ));
        assert_eq!(device.buffer_labelled(INSTANCE_BUFFER_LABEL), None);
    }

    #[test]
    fn exactly_full_buffer_is_accepted() {
        let device = RecordingDevice::default();
        let mut instances = InstanceBuffer::new(&device, 4).unwrap();
        instances.repopulate(&device, &transforms(4)).unwrap();
        assert_eq!(instances.len(), 4);
    }

    #[test]
    fn overflowing_buffer_is_rejected_and_leaves_contents_alone() {
        let device = RecordingDevice::default();
        let mut instances = InstanceBuffer::new(&device, 4).unwrap();
        instances.repopulate(&device, &transforms(2)).unwrap();
        let before = device.buffer(*instances.buffer()).bytes.clone();
        let uploads = device.upload_count();

        let err = instances.repopulate(&device, &transforms(5)).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InstanceCapacityExceeded {
                requested: 5,
                capacity: 4
            }
        ));
        assert_eq!(instances.len(), 2);
        assert_eq!(device.upload_count(), uploads);
        assert_eq!(device.buffer(*instances.buffer()).bytes, before);
    }

    #[test]
    fn upload_is_bit_exact() {
        let device = RecordingDevice::default();
        let mut instances = InstanceBuffer::new(&device, 4).unwrap();
        let mut source = transforms(3);
        source[1] = crate::layout::mobile_layout(0.123_456_7)[13];
        instances.repopulate(&device, &source).unwrap();

        let bytes = &device.buffer(*instances.buffer()).bytes[..3 * 64];
        let read_back: Vec<InstanceRaw> = bytes
            .chunks_exact(std::mem::size_of::<InstanceRaw>())
            .map(bytemuck::pod_read_unaligned)
            .collect();
        for (uploaded, original) in read_back.iter().zip(&source) {
            let uploaded: Vec<u32> = uploaded.model.iter().map(|f| f.to_bits()).collect();
            let original: Vec<u32> = original.iter().map(|f| f.to_bits()).collect();
            assert_eq!(uploaded, original);
        }
    }

    #[test]
    fn whole_array_is_written_at_offset_zero() {
        let device = RecordingDevice::default();
        let mut instances = InstanceBuffer::new(&device, 16).unwrap();
        instances.repopulate(&device, &transforms(3)).unwrap();
        let upload = device.last_upload().unwrap();
        assert_eq!(upload.offset, 0);
        assert_eq!(upload.len, 3 * 64);
    }

    #[test]
    fn empty_array_clears_the_count_without_uploading() {
        let device = RecordingDevice::default();
        let mut instances = InstanceBuffer::new(&device, 4).unwrap();
        instances.repopulate(&device, &transforms(2)).unwrap();
        instances.repopulate(&device, &[]).unwrap();
        assert!(instances.is_empty());
        assert_eq!(device.upload_count(), 1);
    }

    #[test]
    fn instance_layout_steps_per_instance() {
        let layout = InstanceRaw::layout();
        assert_eq!(layout.array_stride, 64);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, [2, 3, 4, 5]);
    }
}
