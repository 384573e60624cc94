//! Render Device
//!
//! The device context handed to everything that creates GPU resources. It
//! owns the backend, the defaults every material falls back to, the shared
//! material pool and the release queue for reference-counted resources.

use std::rc::Rc;

use super::buffer_pool::{BufferPool, BufferSlice};
use super::device::GraphicsDevice;
use super::release::ReleaseQueue;
use super::types::{BufferDesc, BufferHandle, SamplerDesc, TextureDesc, TextureHandle};
use crate::errors::Result;
use crate::resources::{Sampler, Texture};

#[derive(Debug, Clone, Copy)]
pub struct DeviceSettings {
    /// Capacity of the pool holding material uniform blocks.
    pub material_buffer_size: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            material_buffer_size: 12 * 1024 * 1024,
        }
    }
}

pub struct RenderDevice {
    gfx: Box<dyn GraphicsDevice>,
    release: ReleaseQueue,
    white_texture: Rc<Texture>,
    linear_sampler: Rc<Sampler>,
    material_pool: BufferPool,
}

impl RenderDevice {
    pub fn new(mut gfx: Box<dyn GraphicsDevice>, settings: DeviceSettings) -> Result<Self> {
        let release = ReleaseQueue::new();

        let white_texture = Texture::from_rgba8(
            gfx.as_mut(),
            release.clone(),
            "White Texture",
            1,
            1,
            &[255, 255, 255, 255],
        )?;
        let linear_sampler = Sampler::new(gfx.as_mut(), release.clone(), &SamplerDesc::LINEAR)?;
        let material_pool = BufferPool::new(
            gfx.as_mut(),
            release.clone(),
            settings.material_buffer_size,
            "Material Pool",
        )?;

        log::info!(
            "Render device ready (material pool: {} KiB)",
            settings.material_buffer_size / 1024
        );

        Ok(Self {
            gfx,
            release,
            white_texture: Rc::new(white_texture),
            linear_sampler: Rc::new(linear_sampler),
            material_pool,
        })
    }

    #[must_use]
    pub fn gfx(&self) -> &dyn GraphicsDevice {
        self.gfx.as_ref()
    }

    pub fn gfx_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.gfx.as_mut()
    }

    /// Concrete backend, when it is a `D`.
    #[must_use]
    pub fn downcast_gfx<D: GraphicsDevice>(&self) -> Option<&D> {
        self.gfx.as_any().downcast_ref::<D>()
    }

    #[must_use]
    pub fn release_queue(&self) -> &ReleaseQueue {
        &self.release
    }

    #[must_use]
    pub fn white_texture(&self) -> &Rc<Texture> {
        &self.white_texture
    }

    #[must_use]
    pub fn linear_sampler(&self) -> &Rc<Sampler> {
        &self.linear_sampler
    }

    #[must_use]
    pub fn material_pool(&self) -> &BufferPool {
        &self.material_pool
    }

    #[must_use]
    pub fn swapchain_texture(&self) -> TextureHandle {
        self.gfx.swapchain_texture()
    }

    // ========================================================================
    // Resource creation
    // ========================================================================

    pub fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<Texture> {
        Texture::new(self.gfx.as_mut(), self.release.clone(), desc)
    }

    pub fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<Sampler> {
        Sampler::new(self.gfx.as_mut(), self.release.clone(), desc)
    }

    /// Creates a buffer holding `contents`. The caller owns the handle.
    pub fn create_buffer_init(
        &mut self,
        label: &str,
        usage: wgpu::BufferUsages,
        contents: &[u8],
    ) -> Result<BufferHandle> {
        self.gfx.create_buffer(&BufferDesc {
            label,
            usage,
            size: contents.len() as u64,
            contents: Some(contents),
        })
    }

    /// Copies `data` into the material pool.
    pub fn alloc_material_block(&mut self, data: &[u8]) -> Result<BufferSlice> {
        self.material_pool.alloc(self.gfx.as_mut(), data)
    }

    /// Destroys every resource whose last owner has dropped.
    pub fn collect_garbage(&mut self) -> usize {
        self.release.drain(self.gfx.as_mut())
    }
}

impl std::fmt::Debug for RenderDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderDevice")
            .field("pending_release", &self.release.len())
            .field("material_pool_used", &self.material_pool.used())
            .finish_non_exhaustive()
    }
}
