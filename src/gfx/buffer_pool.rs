//! Buffer Pool
//!
//! Long-lived GPU data (material constants, per-object blocks) lives in one
//! shared [`StorageBuffer`]. Every allocation is a [`BufferSlice`] that
//! gives its range back when dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bytemuck::Pod;

use super::device::GraphicsDevice;
use super::offset_allocator::Allocation;
use super::release::ReleaseQueue;
use super::storage_buffer::StorageBuffer;
use super::types::BufferHandle;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct BufferPool {
    storage: Rc<RefCell<StorageBuffer>>,
}

impl BufferPool {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        release: ReleaseQueue,
        size: u64,
        label: &str,
    ) -> Result<Self> {
        log::debug!("Creating buffer pool '{label}' ({size} bytes)");
        Ok(Self {
            storage: Rc::new(RefCell::new(StorageBuffer::new(device, release, size, label)?)),
        })
    }

    /// Copies `data` into a fresh slice.
    pub fn alloc(&self, device: &mut dyn GraphicsDevice, data: &[u8]) -> Result<BufferSlice> {
        let mut storage = self.storage.borrow_mut();
        let allocation = storage.allocate(data.len() as u64)?;
        if let Err(err) = storage.upload(device, &allocation, 0, data) {
            storage.free(allocation);
            return Err(err);
        }

        Ok(BufferSlice {
            buffer: storage.buffer(),
            gpu_address: storage.gpu_address(&allocation),
            offset: allocation.offset,
            size: data.len() as u64,
            allocation: Some(allocation),
            storage: Rc::downgrade(&self.storage),
        })
    }

    pub fn alloc_pod<T: Pod>(&self, device: &mut dyn GraphicsDevice, value: &T) -> Result<BufferSlice> {
        self.alloc(device, bytemuck::bytes_of(value))
    }

    #[must_use]
    pub fn buffer(&self) -> BufferHandle {
        self.storage.borrow().buffer()
    }

    #[must_use]
    pub fn used(&self) -> u64 {
        self.storage.borrow().used()
    }

    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.storage.borrow().capacity()
    }
}

/// A range of a [`BufferPool`], freed on drop.
#[derive(Debug)]
pub struct BufferSlice {
    buffer: BufferHandle,
    gpu_address: u64,
    offset: u64,
    size: u64,
    allocation: Option<Allocation>,
    storage: Weak<RefCell<StorageBuffer>>,
}

impl BufferSlice {
    #[must_use]
    pub fn gpu_address(&self) -> u64 {
        self.gpu_address
    }

    #[must_use]
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Overwrites the slice contents from its start.
    pub fn update(&self, device: &mut dyn GraphicsDevice, data: &[u8]) -> Result<()> {
        match (self.storage.upgrade(), &self.allocation) {
            (Some(storage), Some(allocation)) => storage.borrow().upload(device, allocation, 0, data),
            _ => Err(crate::errors::EmberError::UnknownResource("buffer slice")),
        }
    }

    pub fn update_pod<T: Pod>(&self, device: &mut dyn GraphicsDevice, value: &T) -> Result<()> {
        self.update(device, bytemuck::bytes_of(value))
    }

    /// Returns the range to the pool now instead of on drop.
    pub fn release(&mut self) {
        if let Some(allocation) = self.allocation.take()
            && let Some(storage) = self.storage.upgrade()
        {
            storage.borrow_mut().free(allocation);
        }
    }
}

impl Drop for BufferSlice {
    fn drop(&mut self) {
        self.release();
    }
}
