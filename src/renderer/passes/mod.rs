//! Render passes
//!
//! Each pass records into the frame's single [`CommandBuffer`]:
//!
//! ```text
//! FrameData ─▶ ShadowPass (depth from the main light) ─▶ ForwardPass (color + depth) ─▶ present
//! ```

mod forward;
mod shadow;

pub use forward::ForwardPass;
pub use shadow::ShadowPass;

use glam::Mat4;

use super::collect::FrameData;
use super::render_object::RenderList;
use super::settings::ShaderType;
use super::shader::ShaderLoader;
use crate::errors::Result;
use crate::gfx::{
    CommandBuffer, GraphicsDevice, RenderPipelineDesc, RenderPipelineHandle, ShaderModuleDesc,
    ShaderModuleHandle, TextureHandle, TrackedRenderPass,
};

/// A node of the frame: records its commands from shared, read-only state.
pub trait RenderNode {
    fn name(&self) -> &str;

    /// Records the pass and returns the number of draws issued.
    fn run(&self, ctx: &PassContext<'_>, cmd: &mut CommandBuffer) -> u32;
}

/// A sorted list plus the ring address of its packed world matrices.
#[derive(Debug, Clone, Copy)]
pub struct DrawBatch<'a> {
    pub list: &'a RenderList,
    pub transforms: u64,
}

impl DrawBatch<'_> {
    /// Address of the `index`-th object's world matrix.
    #[inline]
    #[must_use]
    pub fn object_address(&self, index: usize) -> u64 {
        self.transforms + (index * size_of::<Mat4>()) as u64
    }
}

/// Everything a pass reads while recording one frame.
#[derive(Debug)]
pub struct PassContext<'a> {
    pub frame: &'a FrameData,
    pub opaque: DrawBatch<'a>,
    pub transparent: DrawBatch<'a>,
    pub shader_type: ShaderType,

    /// Ring address of the `GlobalUniforms` block.
    pub global_uniforms: u64,
    /// Ring address of the `ShadowPassUniforms` block; 0 without a main light.
    pub shadow_uniforms: u64,

    pub color_target: TextureHandle,
    pub depth_target: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub clear_color: wgpu::Color,
}

pub(crate) fn compile_shader(
    device: &mut dyn GraphicsDevice,
    loader: &dyn ShaderLoader,
    name: &str,
    stage: wgpu::ShaderStages,
) -> Result<ShaderModuleHandle> {
    let source = loader.load(name)?;
    device.create_shader_module(&ShaderModuleDesc {
        label: name,
        stage,
        source: &source,
    })
}

pub(crate) fn create_pipeline(
    device: &mut dyn GraphicsDevice,
    desc: &RenderPipelineDesc,
) -> Result<RenderPipelineHandle> {
    let pipeline = device.create_render_pipeline(desc)?;
    log::debug!("Created pipeline '{}'", desc.label);
    Ok(pipeline)
}

/// Binds buffers only when they change, then issues one indexed draw per object.
pub(crate) fn draw_batch(
    pass: &mut TrackedRenderPass<'_>,
    batch: &DrawBatch<'_>,
    mut push: impl FnMut(&mut TrackedRenderPass<'_>, usize, &super::RenderObject),
) -> u32 {
    let mut draws = 0;
    for (i, object) in batch.list.iter().enumerate() {
        pass.set_vertex_buffer(object.vertex_buffer);
        pass.set_index_buffer(object.index_buffer);
        push(pass, i, object);
        pass.draw_indexed(object.index_count, object.index_offset);
        draws += 1;
    }
    draws
}
