use std::any::Any;

use super::command::CommandBuffer;
use super::types::{
    BufferDesc, BufferHandle, RenderPipelineDesc, RenderPipelineHandle, SamplerDesc, SamplerHandle,
    ShaderModuleDesc, ShaderModuleHandle, TextureDesc, TextureHandle,
};
use crate::errors::Result;

/// The fixed set of verbs the engine needs from a graphics backend.
///
/// Buffers are addressed by 64-bit GPU addresses so shaders can reach them
/// through push constants; textures and samplers are addressed by their
/// bindless index (the slot index of their handle).
pub trait GraphicsDevice: Any {
    // === Resource creation ===
    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<BufferHandle>;
    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureHandle>;
    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle>;
    fn create_shader_module(&mut self, desc: &ShaderModuleDesc<'_>) -> Result<ShaderModuleHandle>;
    fn create_render_pipeline(&mut self, desc: &RenderPipelineDesc) -> Result<RenderPipelineHandle>;

    // === Resource destruction (stale handles are ignored) ===
    fn destroy_buffer(&mut self, buffer: BufferHandle);
    fn destroy_texture(&mut self, texture: TextureHandle);
    fn destroy_sampler(&mut self, sampler: SamplerHandle);

    // === Memory ===
    /// Device address of `buffer` + `offset`, or 0 for a stale handle.
    fn gpu_address(&self, buffer: BufferHandle, offset: u64) -> u64;
    fn upload(&mut self, buffer: BufferHandle, data: &[u8], offset: u64) -> Result<()>;

    // === Commands ===
    fn acquire_command_buffer(&mut self) -> CommandBuffer;
    /// Executes `cmd`, then presents `present` if given.
    fn submit(&mut self, cmd: CommandBuffer, present: Option<TextureHandle>) -> Result<()>;

    // === Swapchain ===
    fn swapchain_texture(&self) -> TextureHandle;
    fn swapchain_format(&self) -> wgpu::TextureFormat;
    fn resize_swapchain(&mut self, width: u32, height: u32) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}
