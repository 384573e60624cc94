//! Buffer Ring
//!
//! Per-frame transient memory. The backing buffer is split into
//! `page_num` pages, one per frame in flight; allocations bump a head
//! inside the current page and [`BufferRing::advance`] moves to the next
//! page, recycling whatever the oldest frame wrote there.

use bytemuck::Pod;

use super::device::GraphicsDevice;
use super::release::{GpuObject, ReleaseQueue};
use super::types::{BufferDesc, BufferHandle};
use crate::errors::{EmberError, Result};

pub const RING_ALIGNMENT: u64 = 16;

#[derive(Debug)]
pub struct BufferRing {
    buffer: BufferHandle,
    base_address: u64,
    page_size: u64,
    page_num: u64,
    page: u64,
    head: u64,
    release: ReleaseQueue,
}

impl BufferRing {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        release: ReleaseQueue,
        page_size: u64,
        page_num: u32,
        label: &str,
    ) -> Result<Self> {
        if page_num == 0 || page_size == 0 {
            return Err(EmberError::InvalidDescriptor(format!(
                "ring '{label}' needs at least one non-empty page"
            )));
        }
        let page_size = page_size.next_multiple_of(RING_ALIGNMENT);
        let buffer = device.create_buffer(&BufferDesc {
            label,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            size: page_size * u64::from(page_num),
            contents: None,
        })?;
        Ok(Self {
            buffer,
            base_address: device.gpu_address(buffer, 0),
            page_size,
            page_num: u64::from(page_num),
            page: 0,
            head: 0,
            release,
        })
    }

    #[must_use]
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Bytes left in the current page.
    #[must_use]
    pub fn available(&self) -> u64 {
        self.page_size - self.head
    }

    /// Moves to the next page and rewinds the head.
    pub fn advance(&mut self) {
        self.page = (self.page + 1) % self.page_num;
        self.head = 0;
    }

    /// Copies `data` into the current page and returns its device address.
    ///
    /// The address stays valid until this page comes around again.
    pub fn alloc(&mut self, device: &mut dyn GraphicsDevice, data: &[u8]) -> Result<u64> {
        let size = data.len() as u64;
        let start = self.head.next_multiple_of(RING_ALIGNMENT);
        if start + size > self.page_size {
            return Err(EmberError::RingOverflow {
                requested: size,
                available: self.page_size.saturating_sub(start),
            });
        }

        let offset = self.page * self.page_size + start;
        device.upload(self.buffer, data, offset)?;
        self.head = start + size;

        Ok(self.base_address + offset)
    }

    pub fn alloc_pod<T: Pod>(&mut self, device: &mut dyn GraphicsDevice, value: &T) -> Result<u64> {
        self.alloc(device, bytemuck::bytes_of(value))
    }

    pub fn alloc_slice<T: Pod>(
        &mut self,
        device: &mut dyn GraphicsDevice,
        values: &[T],
    ) -> Result<u64> {
        self.alloc(device, bytemuck::cast_slice(values))
    }
}

impl Drop for BufferRing {
    fn drop(&mut self) {
        self.release.push(GpuObject::Buffer(self.buffer));
    }
}
