//! Headless Device
//!
//! A CPU-side [`GraphicsDevice`]. Buffers are byte vectors placed at
//! synthetic, never-reused GPU addresses; submitted command buffers are
//! validated and kept for inspection. Used by tests, tools and servers that
//! need the whole frame pipeline without a GPU.

use std::any::Any;

use super::command::{Command, CommandBuffer};
use super::device::GraphicsDevice;
use super::types::{
    BufferDesc, BufferHandle, RenderPipelineDesc, RenderPipelineHandle, SamplerDesc, SamplerHandle,
    ShaderModuleDesc, ShaderModuleHandle, TextureDesc, TextureHandle,
};
use crate::core::ObjectStore;
use crate::errors::{EmberError, Result};

const ADDRESS_BASE: u64 = 0x0001_0000_0000;
const ADDRESS_ALIGNMENT: u64 = 256;

#[derive(Debug)]
struct HeadlessBuffer {
    label: String,
    usage: wgpu::BufferUsages,
    address: u64,
    data: Vec<u8>,
}

/// What the device remembers about a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
}

#[derive(Debug)]
struct HeadlessShaderModule {
    stage: wgpu::ShaderStages,
}

/// One successful [`GraphicsDevice::submit`].
#[derive(Debug, Clone)]
pub struct Submission {
    pub commands: Vec<Command>,
    pub present: Option<TextureHandle>,
}

impl Submission {
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawIndexed { .. }))
            .count()
    }
}

pub struct HeadlessDevice {
    buffers: ObjectStore<BufferHandle, HeadlessBuffer>,
    textures: ObjectStore<TextureHandle, TextureInfo>,
    samplers: ObjectStore<SamplerHandle, SamplerDesc>,
    shader_modules: ObjectStore<ShaderModuleHandle, HeadlessShaderModule>,
    pipelines: ObjectStore<RenderPipelineHandle, RenderPipelineDesc>,

    next_address: u64,
    swapchain: TextureHandle,
    swapchain_format: wgpu::TextureFormat,
    submissions: Vec<Submission>,
}

impl HeadlessDevice {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut device = Self {
            buffers: ObjectStore::new(),
            textures: ObjectStore::new(),
            samplers: ObjectStore::new(),
            shader_modules: ObjectStore::new(),
            pipelines: ObjectStore::new(),
            next_address: ADDRESS_BASE,
            swapchain: TextureHandle::default(),
            swapchain_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            submissions: Vec::new(),
        };
        device.swapchain = device.create_swapchain(width, height)?;
        log::info!("Headless device created ({width}x{height})");
        Ok(device)
    }

    fn create_swapchain(&mut self, width: u32, height: u32) -> Result<TextureHandle> {
        self.create_texture(&TextureDesc {
            label: "Swapchain",
            width,
            height,
            format: self.swapchain_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            data: None,
        })
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    #[must_use]
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    #[must_use]
    pub fn last_submission(&self) -> Option<&Submission> {
        self.submissions.last()
    }

    pub fn clear_submissions(&mut self) {
        self.submissions.clear();
    }

    #[must_use]
    pub fn read_buffer(&self, buffer: BufferHandle, offset: u64, len: usize) -> Option<&[u8]> {
        let buffer = self.buffers.get(buffer)?;
        let start = usize::try_from(offset).ok()?;
        buffer.data.get(start..start.checked_add(len)?)
    }

    /// Reads `len` bytes at a device address.
    #[must_use]
    pub fn read_gpu_address(&self, address: u64, len: usize) -> Option<&[u8]> {
        self.buffers.iter().find_map(|(_, buffer)| {
            let size = buffer.data.len() as u64;
            if address >= buffer.address && address < buffer.address + size {
                let start = usize::try_from(address - buffer.address).ok()?;
                buffer.data.get(start..start.checked_add(len)?)
            } else {
                None
            }
        })
    }

    #[must_use]
    pub fn texture_info(&self, texture: TextureHandle) -> Option<&TextureInfo> {
        self.textures.get(texture)
    }

    #[must_use]
    pub fn pipeline_desc(&self, pipeline: RenderPipelineHandle) -> Option<&RenderPipelineDesc> {
        self.pipelines.get(pipeline)
    }

    #[must_use]
    pub fn buffer_label(&self, buffer: BufferHandle) -> Option<&str> {
        self.buffers.get(buffer).map(|b| b.label.as_str())
    }

    #[must_use]
    pub fn buffer_usage(&self, buffer: BufferHandle) -> Option<wgpu::BufferUsages> {
        self.buffers.get(buffer).map(|b| b.usage)
    }

    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn live_samplers(&self) -> usize {
        self.samplers.len()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn validate(&self, commands: &[Command]) -> Result<()> {
        let fail = |msg: String| Err(EmberError::CommandValidation(msg));

        let mut in_pass = false;
        let mut pipeline: Option<&RenderPipelineDesc> = None;
        let mut index_buffer: Option<(BufferHandle, wgpu::IndexFormat)> = None;
        let mut labels = 0usize;

        for (i, command) in commands.iter().enumerate() {
            match command {
                Command::BeginRendering(pass) => {
                    if in_pass {
                        return fail(format!("#{i}: nested render pass '{}'", pass.label));
                    }
                    let color = pass.color.map(|c| c.texture);
                    let depth = pass.depth.map(|d| d.texture);
                    for texture in color.into_iter().chain(depth) {
                        if !self.textures.is_valid(texture) {
                            return fail(format!("#{i}: pass '{}' targets a stale texture", pass.label));
                        }
                    }
                    in_pass = true;
                    pipeline = None;
                    index_buffer = None;
                }
                Command::EndRendering => {
                    if !in_pass {
                        return fail(format!("#{i}: end of rendering without a pass"));
                    }
                    in_pass = false;
                }
                Command::BindRenderPipeline(handle) => {
                    if !in_pass {
                        return fail(format!("#{i}: pipeline bound outside a render pass"));
                    }
                    pipeline = Some(
                        self.pipelines
                            .get(*handle)
                            .ok_or(EmberError::UnknownResource("render pipeline"))?,
                    );
                }
                Command::BindDepthState(_) | Command::BindViewport(_) => {
                    if !in_pass {
                        return fail(format!("#{i}: dynamic state set outside a render pass"));
                    }
                }
                Command::BindVertexBuffer { buffer, .. } => {
                    if !self.buffers.is_valid(*buffer) {
                        return fail(format!("#{i}: stale vertex buffer"));
                    }
                }
                Command::BindIndexBuffer { buffer, format } => {
                    if !self.buffers.is_valid(*buffer) {
                        return fail(format!("#{i}: stale index buffer"));
                    }
                    index_buffer = Some((*buffer, *format));
                }
                Command::PushConstants(bytes) => {
                    let Some(desc) = pipeline else {
                        return fail(format!("#{i}: push constants without a pipeline"));
                    };
                    if bytes.len() > desc.push_constant_size as usize {
                        return fail(format!(
                            "#{i}: {} bytes of push constants exceed {} of '{}'",
                            bytes.len(),
                            desc.push_constant_size,
                            desc.label
                        ));
                    }
                }
                Command::DrawIndexed {
                    index_count,
                    first_index,
                    ..
                } => {
                    if !in_pass || pipeline.is_none() {
                        return fail(format!("#{i}: draw without a pass and pipeline"));
                    }
                    let Some((buffer, format)) = index_buffer else {
                        return fail(format!("#{i}: indexed draw without an index buffer"));
                    };
                    let index_size = match format {
                        wgpu::IndexFormat::Uint16 => 2,
                        wgpu::IndexFormat::Uint32 => 4,
                    };
                    let available = self
                        .buffers
                        .get(buffer)
                        .map_or(0, |b| b.data.len() as u64 / index_size);
                    let end = u64::from(*first_index) + u64::from(*index_count);
                    if end > available {
                        return fail(format!(
                            "#{i}: draw reads indices {first_index}..{end} of {available}"
                        ));
                    }
                }
                Command::TransitionToShaderReadOnly(texture) => {
                    if in_pass {
                        return fail(format!("#{i}: layout transition inside a render pass"));
                    }
                    if !self.textures.is_valid(*texture) {
                        return fail(format!("#{i}: transition of a stale texture"));
                    }
                }
                Command::PushDebugLabel(_) => labels += 1,
                Command::PopDebugLabel => {
                    if labels == 0 {
                        return fail(format!("#{i}: unbalanced debug label pop"));
                    }
                    labels -= 1;
                }
            }
        }

        if in_pass {
            return fail("command buffer ends inside a render pass".to_string());
        }
        if labels != 0 {
            return fail(format!("{labels} debug label(s) left open"));
        }
        Ok(())
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<BufferHandle> {
        if desc.size == 0 {
            return Err(EmberError::InvalidDescriptor(format!(
                "buffer '{}' has zero size",
                desc.label
            )));
        }
        let size = usize::try_from(desc.size)
            .map_err(|_| EmberError::InvalidDescriptor(format!("buffer '{}' is too large", desc.label)))?;

        let mut data = vec![0u8; size];
        if let Some(contents) = desc.contents {
            if contents.len() > size {
                return Err(EmberError::UploadOutOfBounds {
                    offset: 0,
                    size: contents.len() as u64,
                    capacity: desc.size,
                });
            }
            data[..contents.len()].copy_from_slice(contents);
        }

        let address = self.next_address;
        self.next_address += desc.size.div_ceil(ADDRESS_ALIGNMENT) * ADDRESS_ALIGNMENT + ADDRESS_ALIGNMENT;

        log::trace!("Buffer '{}' ({} bytes) at {address:#x}", desc.label, desc.size);
        Ok(self.buffers.emplace(HeadlessBuffer {
            label: desc.label.to_string(),
            usage: desc.usage,
            address,
            data,
        }))
    }

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(EmberError::InvalidDescriptor(format!(
                "texture '{}' has zero extent",
                desc.label
            )));
        }
        if let (Some(data), Some(texel_size)) = (desc.data, desc.format.block_copy_size(None)) {
            let expected = u64::from(desc.width) * u64::from(desc.height) * u64::from(texel_size);
            if data.len() as u64 != expected {
                return Err(EmberError::InvalidDescriptor(format!(
                    "texture '{}' expects {expected} bytes, got {}",
                    desc.label,
                    data.len()
                )));
            }
        }
        Ok(self.textures.emplace(TextureInfo {
            label: desc.label.to_string(),
            width: desc.width,
            height: desc.height,
            format: desc.format,
            usage: desc.usage,
        }))
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle> {
        Ok(self.samplers.emplace(*desc))
    }

    fn create_shader_module(&mut self, desc: &ShaderModuleDesc<'_>) -> Result<ShaderModuleHandle> {
        if desc.source.trim().is_empty() {
            return Err(EmberError::ShaderCompilation {
                name: desc.label.to_string(),
                reason: "empty source".to_string(),
            });
        }
        Ok(self.shader_modules.emplace(HeadlessShaderModule { stage: desc.stage }))
    }

    fn create_render_pipeline(&mut self, desc: &RenderPipelineDesc) -> Result<RenderPipelineHandle> {
        let error = |reason: &str| EmberError::PipelineCreation {
            name: desc.label.clone(),
            reason: reason.to_string(),
        };
        let vertex = self
            .shader_modules
            .get(desc.vertex_shader)
            .ok_or_else(|| error("unknown vertex shader module"))?;
        if vertex.stage != wgpu::ShaderStages::VERTEX {
            return Err(error("vertex shader module is not a vertex stage"));
        }
        let fragment = self
            .shader_modules
            .get(desc.fragment_shader)
            .ok_or_else(|| error("unknown fragment shader module"))?;
        if fragment.stage != wgpu::ShaderStages::FRAGMENT {
            return Err(error("fragment shader module is not a fragment stage"));
        }
        if desc.color.is_none() && desc.depth_format.is_none() {
            return Err(error("pipeline has no attachments"));
        }
        Ok(self.pipelines.emplace(desc.clone()))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.erase(buffer);
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.erase(texture);
    }

    fn destroy_sampler(&mut self, sampler: SamplerHandle) {
        self.samplers.erase(sampler);
    }

    fn gpu_address(&self, buffer: BufferHandle, offset: u64) -> u64 {
        self.buffers.get(buffer).map_or(0, |b| b.address + offset)
    }

    fn upload(&mut self, buffer: BufferHandle, data: &[u8], offset: u64) -> Result<()> {
        let target = self
            .buffers
            .get_mut(buffer)
            .ok_or(EmberError::UnknownResource("buffer"))?;
        let capacity = target.data.len() as u64;
        let end = offset.checked_add(data.len() as u64);
        match end {
            Some(end) if end <= capacity => {
                let start = offset as usize;
                target.data[start..start + data.len()].copy_from_slice(data);
                Ok(())
            }
            _ => Err(EmberError::UploadOutOfBounds {
                offset,
                size: data.len() as u64,
                capacity,
            }),
        }
    }

    fn acquire_command_buffer(&mut self) -> CommandBuffer {
        CommandBuffer::new()
    }

    fn submit(&mut self, cmd: CommandBuffer, present: Option<TextureHandle>) -> Result<()> {
        self.validate(cmd.commands())?;
        if let Some(texture) = present
            && !self.textures.is_valid(texture)
        {
            return Err(EmberError::CommandValidation("present of a stale texture".to_string()));
        }
        self.submissions.push(Submission {
            commands: cmd.into_commands(),
            present,
        });
        Ok(())
    }

    fn swapchain_texture(&self) -> TextureHandle {
        self.swapchain
    }

    fn swapchain_format(&self) -> wgpu::TextureFormat {
        self.swapchain_format
    }

    fn resize_swapchain(&mut self, width: u32, height: u32) -> Result<()> {
        let swapchain = self.create_swapchain(width, height)?;
        self.textures.erase(self.swapchain);
        self.swapchain = swapchain;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
