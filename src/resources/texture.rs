use crate::core::HandleExt;
use crate::errors::Result;
use crate::gfx::{
    GpuObject, GraphicsDevice, ReleaseQueue, SamplerDesc, SamplerHandle, TextureDesc, TextureHandle,
};

/// A device texture shared through `Rc`; destroyed once the last holder drops
/// and the device collects garbage.
#[derive(Debug)]
pub struct Texture {
    handle: TextureHandle,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    release: ReleaseQueue,
}

impl Texture {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        release: ReleaseQueue,
        desc: &TextureDesc<'_>,
    ) -> Result<Self> {
        let handle = device.create_texture(desc)?;
        Ok(Self {
            handle,
            width: desc.width,
            height: desc.height,
            format: desc.format,
            release,
        })
    }

    /// Uploads tightly packed RGBA8 texels.
    pub fn from_rgba8(
        device: &mut dyn GraphicsDevice,
        release: ReleaseQueue,
        label: &str,
        width: u32,
        height: u32,
        texels: &[u8],
    ) -> Result<Self> {
        Self::new(
            device,
            release,
            &TextureDesc {
                label,
                width,
                height,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                data: Some(texels),
            },
        )
    }

    #[must_use]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    #[must_use]
    pub fn bindless_index(&self) -> u32 {
        self.handle.index()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.release.push(GpuObject::Texture(self.handle));
    }
}

#[derive(Debug)]
pub struct Sampler {
    handle: SamplerHandle,
    desc: SamplerDesc,
    release: ReleaseQueue,
}

impl Sampler {
    pub fn new(device: &mut dyn GraphicsDevice, release: ReleaseQueue, desc: &SamplerDesc) -> Result<Self> {
        Ok(Self {
            handle: device.create_sampler(desc)?,
            desc: *desc,
            release,
        })
    }

    #[must_use]
    pub fn handle(&self) -> SamplerHandle {
        self.handle
    }

    #[must_use]
    pub fn desc(&self) -> &SamplerDesc {
        &self.desc
    }

    #[must_use]
    pub fn bindless_index(&self) -> u32 {
        self.handle.index()
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.release.push(GpuObject::Sampler(self.handle));
    }
}
