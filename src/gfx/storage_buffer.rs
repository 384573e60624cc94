//! A device buffer carved up by an [`OffsetAllocator`].

use super::device::GraphicsDevice;
use super::offset_allocator::{Allocation, OffsetAllocator};
use super::release::{GpuObject, ReleaseQueue};
use super::types::{BufferDesc, BufferHandle};
use crate::errors::{EmberError, Result};

/// Alignment of every sub-allocation; matches the strictest uniform layout rule.
pub const STORAGE_ALIGNMENT: u64 = 16;

#[derive(Debug)]
pub struct StorageBuffer {
    buffer: BufferHandle,
    base_address: u64,
    allocator: OffsetAllocator,
    release: ReleaseQueue,
}

impl StorageBuffer {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        release: ReleaseQueue,
        size: u64,
        label: &str,
    ) -> Result<Self> {
        let buffer = device.create_buffer(&BufferDesc {
            label,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            size,
            contents: None,
        })?;
        Ok(Self {
            buffer,
            base_address: device.gpu_address(buffer, 0),
            allocator: OffsetAllocator::new(size),
            release,
        })
    }

    #[must_use]
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.allocator.capacity()
    }

    #[must_use]
    pub fn used(&self) -> u64 {
        self.allocator.used()
    }

    pub fn allocate(&mut self, size: u64) -> Result<Allocation> {
        self.allocator
            .allocate(size, STORAGE_ALIGNMENT)
            .ok_or(EmberError::OutOfMemory {
                requested: size,
                capacity: self.allocator.capacity(),
            })
    }

    pub fn free(&mut self, allocation: Allocation) {
        self.allocator.free(allocation);
    }

    #[must_use]
    pub fn gpu_address(&self, allocation: &Allocation) -> u64 {
        self.base_address + allocation.offset
    }

    /// Writes `data` at `offset` bytes into `allocation`.
    pub fn upload(
        &self,
        device: &mut dyn GraphicsDevice,
        allocation: &Allocation,
        offset: u64,
        data: &[u8],
    ) -> Result<()> {
        if offset + data.len() as u64 > allocation.size {
            return Err(EmberError::UploadOutOfBounds {
                offset,
                size: data.len() as u64,
                capacity: allocation.size,
            });
        }
        device.upload(self.buffer, data, allocation.offset + offset)
    }
}

impl Drop for StorageBuffer {
    fn drop(&mut self) {
        self.release.push(GpuObject::Buffer(self.buffer));
    }
}
