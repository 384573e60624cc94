//! Deferred destruction of device objects.
//!
//! Resources shared through `Rc` have no device at hand when their last
//! owner drops, so they queue their handles here and the device drains the
//! queue once per frame.

use std::cell::RefCell;
use std::rc::Rc;

use super::device::GraphicsDevice;
use super::types::{BufferHandle, SamplerHandle, TextureHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuObject {
    Buffer(BufferHandle),
    Texture(TextureHandle),
    Sampler(SamplerHandle),
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseQueue {
    pending: Rc<RefCell<Vec<GpuObject>>>,
}

impl ReleaseQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, object: GpuObject) {
        self.pending.borrow_mut().push(object);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Destroys everything queued so far. Returns how many objects were released.
    pub fn drain(&self, device: &mut dyn GraphicsDevice) -> usize {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        let count = pending.len();
        for object in pending {
            match object {
                GpuObject::Buffer(handle) => device.destroy_buffer(handle),
                GpuObject::Texture(handle) => device.destroy_texture(handle),
                GpuObject::Sampler(handle) => device.destroy_sampler(handle),
            }
        }
        if count > 0 {
            log::debug!("Released {count} device object(s)");
        }
        count
    }
}
