//! Forward Pass
//!
//! Clears color and depth, then draws the opaque list (depth writes on)
//! followed by the back-to-front transparent list (depth read-only, alpha
//! blended). Every draw pushes four device addresses: global uniforms,
//! object matrix, material block and vertex buffer.

use rustc_hash::FxHashMap;

use super::{DrawBatch, PassContext, RenderNode, compile_shader, create_pipeline, draw_batch};
use crate::errors::Result;
use crate::gfx::{
    ColorAttachment, ColorTarget, CommandBuffer, DepthAttachment, DepthState, LoadOp, RenderDevice,
    RenderPass, RenderPipelineDesc, RenderPipelineHandle, ShaderModuleHandle, TrackedRenderPass,
    Viewport,
};
use crate::renderer::settings::{RendererSettings, ShaderType};
use crate::renderer::shader::ShaderLoader;
use crate::renderer::uniforms::ForwardPushConstants;
use crate::resources::Vertex;

#[derive(Debug, Clone, Copy)]
struct PipelinePair {
    opaque: RenderPipelineHandle,
    transparent: RenderPipelineHandle,
}

pub struct ForwardPass {
    unlit: PipelinePair,
    simple_lit: PipelinePair,
}

impl ForwardPass {
    pub fn new(device: &mut RenderDevice, loader: &dyn ShaderLoader, settings: &RendererSettings) -> Result<Self> {
        let gfx = device.gfx_mut();
        let color_format = gfx.swapchain_format();

        let mut modules: FxHashMap<&str, ShaderModuleHandle> = FxHashMap::default();
        for (name, stage) in [
            ("forward.vert", wgpu::ShaderStages::VERTEX),
            ("unlit.frag", wgpu::ShaderStages::FRAGMENT),
            ("simple_lit.frag", wgpu::ShaderStages::FRAGMENT),
        ] {
            modules.insert(name, compile_shader(gfx, loader, name, stage)?);
        }
        let module = |name: &str| modules.get(name).copied().unwrap_or_default();

        let mut build = |label: &str, fragment: &str, transparent: bool| {
            create_pipeline(
                gfx,
                &RenderPipelineDesc {
                    label: label.to_string(),
                    vertex_layout: Vertex::layout(),
                    vertex_shader: module("forward.vert"),
                    fragment_shader: module(fragment),
                    color: Some(ColorTarget {
                        format: color_format,
                        blend: transparent.then_some(wgpu::BlendState::ALPHA_BLENDING),
                    }),
                    depth_format: Some(settings.depth_format),
                    cull_mode: if transparent { None } else { Some(wgpu::Face::Back) },
                    front_face: wgpu::FrontFace::Cw,
                    push_constant_size: size_of::<ForwardPushConstants>() as u32,
                },
            )
        };

        let unlit = PipelinePair {
            opaque: build("Unlit Opaque", "unlit.frag", false)?,
            transparent: build("Unlit Transparent", "unlit.frag", true)?,
        };
        let simple_lit = PipelinePair {
            opaque: build("SimpleLit Opaque", "simple_lit.frag", false)?,
            transparent: build("SimpleLit Transparent", "simple_lit.frag", true)?,
        };

        Ok(Self { unlit, simple_lit })
    }

    fn pipelines(&self, shader_type: ShaderType) -> PipelinePair {
        match shader_type {
            ShaderType::Unlit => self.unlit,
            ShaderType::SimpleLit => self.simple_lit,
        }
    }

    /// Pipeline used for `shader_type`, opaque or transparent.
    #[must_use]
    pub fn pipeline(&self, shader_type: ShaderType, transparent: bool) -> RenderPipelineHandle {
        let pair = self.pipelines(shader_type);
        if transparent { pair.transparent } else { pair.opaque }
    }

    fn draw(pass: &mut TrackedRenderPass<'_>, batch: &DrawBatch<'_>, per_frame: u64) -> u32 {
        draw_batch(pass, batch, |pass, i, object| {
            pass.push_constants(&ForwardPushConstants {
                per_frame,
                per_object: batch.object_address(i),
                material: object.material_gpu_address,
                vertex_buffer: object.vertex_buffer_address,
            });
        })
    }
}

impl RenderNode for ForwardPass {
    fn name(&self) -> &str {
        "Forward Pass"
    }

    fn run(&self, ctx: &PassContext<'_>, cmd: &mut CommandBuffer) -> u32 {
        let pipelines = self.pipelines(ctx.shader_type);

        cmd.cmd_push_debug_group_label(self.name());
        cmd.cmd_begin_rendering(RenderPass {
            label: self.name().to_string(),
            color: Some(ColorAttachment {
                texture: ctx.color_target,
                load: LoadOp::Clear(ctx.clear_color),
            }),
            depth: Some(DepthAttachment {
                texture: ctx.depth_target,
                load: LoadOp::Clear(1.0),
            }),
        });

        let mut draws = 0;
        {
            let mut pass = TrackedRenderPass::new(cmd);
            pass.set_viewport(Viewport::from_size(ctx.width, ctx.height));

            if !ctx.opaque.list.is_empty() {
                pass.push_debug_group("Opaque");
                pass.set_pipeline(pipelines.opaque);
                pass.set_depth_state(DepthState::WRITE);
                draws += Self::draw(&mut pass, &ctx.opaque, ctx.global_uniforms);
                pass.pop_debug_group();
            }

            if !ctx.transparent.list.is_empty() {
                pass.push_debug_group("Transparent");
                pass.set_pipeline(pipelines.transparent);
                pass.set_depth_state(DepthState::READ_ONLY);
                draws += Self::draw(&mut pass, &ctx.transparent, ctx.global_uniforms);
                pass.pop_debug_group();
            }
        }

        cmd.cmd_end_rendering();
        cmd.cmd_pop_debug_group_label();
        draws
    }
}
