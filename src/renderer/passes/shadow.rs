//! Shadow Pass
//!
//! Renders scene depth from the main directional light into a square
//! depth-only map, then transitions the map for sampling by the forward pass.
//! Only positions and world matrices are read; materials are ignored.

use super::{DrawBatch, PassContext, RenderNode, compile_shader, create_pipeline, draw_batch};
use crate::errors::Result;
use crate::gfx::{
    CommandBuffer, DepthAttachment, DepthState, LoadOp, RenderDevice, RenderPass, RenderPipelineDesc,
    RenderPipelineHandle, TextureDesc, TrackedRenderPass, Viewport,
};
use crate::renderer::settings::RendererSettings;
use crate::renderer::shader::ShaderLoader;
use crate::renderer::uniforms::ShadowPushConstants;
use crate::resources::{Texture, Vertex};

pub struct ShadowPass {
    pipeline: RenderPipelineHandle,
    shadow_map: Texture,
}

impl ShadowPass {
    pub fn new(device: &mut RenderDevice, loader: &dyn ShaderLoader, settings: &RendererSettings) -> Result<Self> {
        let shadow_map = device.create_texture(&TextureDesc {
            label: "Shadow Map",
            width: settings.shadow_map_size,
            height: settings.shadow_map_size,
            format: settings.shadow_map_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            data: None,
        })?;

        let gfx = device.gfx_mut();
        let vertex_shader = compile_shader(gfx, loader, "shadow.vert", wgpu::ShaderStages::VERTEX)?;
        let fragment_shader = compile_shader(gfx, loader, "shadow.frag", wgpu::ShaderStages::FRAGMENT)?;

        // Position only; the rest of the vertex is skipped by the stride.
        let mut vertex_layout = Vertex::layout();
        vertex_layout.attributes.truncate(1);

        let pipeline = create_pipeline(
            gfx,
            &RenderPipelineDesc {
                label: "Shadow".to_string(),
                vertex_layout,
                vertex_shader,
                fragment_shader,
                color: None,
                depth_format: Some(settings.shadow_map_format),
                cull_mode: None,
                front_face: wgpu::FrontFace::Ccw,
                push_constant_size: size_of::<ShadowPushConstants>() as u32,
            },
        )?;

        Ok(Self { pipeline, shadow_map })
    }

    #[must_use]
    pub fn shadow_map(&self) -> &Texture {
        &self.shadow_map
    }

    fn draw(pass: &mut TrackedRenderPass<'_>, batch: &DrawBatch<'_>, per_frame: u64) -> u32 {
        draw_batch(pass, batch, |pass, i, _| {
            pass.push_constants(&ShadowPushConstants {
                per_frame,
                per_object: batch.object_address(i),
            });
        })
    }
}

impl RenderNode for ShadowPass {
    fn name(&self) -> &str {
        "Shadow Pass"
    }

    fn run(&self, ctx: &PassContext<'_>, cmd: &mut CommandBuffer) -> u32 {
        cmd.cmd_push_debug_group_label(self.name());
        cmd.cmd_begin_rendering(RenderPass {
            label: self.name().to_string(),
            color: None,
            depth: Some(DepthAttachment {
                texture: self.shadow_map.handle(),
                load: LoadOp::Clear(1.0),
            }),
        });

        let mut draws = 0;
        {
            let mut pass = TrackedRenderPass::new(cmd);
            pass.set_viewport(Viewport::from_size(self.shadow_map.width(), self.shadow_map.height()));
            pass.set_pipeline(self.pipeline);

            pass.set_depth_state(DepthState::WRITE);
            draws += Self::draw(&mut pass, &ctx.opaque, ctx.shadow_uniforms);

            pass.set_depth_state(DepthState::READ_ONLY);
            draws += Self::draw(&mut pass, &ctx.transparent, ctx.shadow_uniforms);
        }

        cmd.cmd_end_rendering();
        cmd.transition_to_shader_read_only(self.shadow_map.handle());
        cmd.cmd_pop_debug_group_label();
        draws
    }
}
