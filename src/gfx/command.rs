//! Command recording.
//!
//! A [`CommandBuffer`] is plain data: every `cmd_*` call appends a
//! [`Command`] that the device interprets on [`submit`](super::GraphicsDevice::submit).

use bytemuck::Pod;
use smallvec::SmallVec;

use super::types::{BufferHandle, RenderPipelineHandle, TextureHandle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOp<T> {
    Clear(T),
    Load,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAttachment {
    pub texture: TextureHandle,
    pub load: LoadOp<wgpu::Color>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthAttachment {
    pub texture: TextureHandle,
    pub load: LoadOp<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    pub label: String,
    pub color: Option<ColorAttachment>,
    pub depth: Option<DepthAttachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthState {
    pub compare: wgpu::CompareFunction,
    pub write_enabled: bool,
}

impl DepthState {
    pub const WRITE: Self = Self {
        compare: wgpu::CompareFunction::Less,
        write_enabled: true,
    };

    pub const READ_ONLY: Self = Self {
        compare: wgpu::CompareFunction::Less,
        write_enabled: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginRendering(RenderPass),
    EndRendering,
    BindRenderPipeline(RenderPipelineHandle),
    BindDepthState(DepthState),
    BindViewport(Viewport),
    BindVertexBuffer {
        slot: u32,
        buffer: BufferHandle,
        offset: u64,
    },
    BindIndexBuffer {
        buffer: BufferHandle,
        format: wgpu::IndexFormat,
    },
    PushConstants(SmallVec<[u8; 32]>),
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
    },
    TransitionToShaderReadOnly(TextureHandle),
    PushDebugLabel(String),
    PopDebugLabel,
}

#[derive(Debug, Default, Clone)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[must_use]
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawIndexed { .. }))
            .count()
    }

    pub fn cmd_begin_rendering(&mut self, pass: RenderPass) {
        self.commands.push(Command::BeginRendering(pass));
    }

    pub fn cmd_end_rendering(&mut self) {
        self.commands.push(Command::EndRendering);
    }

    pub fn cmd_bind_render_pipeline(&mut self, pipeline: RenderPipelineHandle) {
        self.commands.push(Command::BindRenderPipeline(pipeline));
    }

    pub fn cmd_bind_depth_state(&mut self, state: DepthState) {
        self.commands.push(Command::BindDepthState(state));
    }

    pub fn cmd_bind_viewport(&mut self, viewport: Viewport) {
        self.commands.push(Command::BindViewport(viewport));
    }

    pub fn cmd_bind_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, offset: u64) {
        self.commands.push(Command::BindVertexBuffer { slot, buffer, offset });
    }

    pub fn cmd_bind_index_buffer(&mut self, buffer: BufferHandle, format: wgpu::IndexFormat) {
        self.commands.push(Command::BindIndexBuffer { buffer, format });
    }

    pub fn cmd_push_constants<T: Pod>(&mut self, data: &T) {
        self.commands
            .push(Command::PushConstants(SmallVec::from_slice(bytemuck::bytes_of(data))));
    }

    pub fn cmd_draw_indexed(&mut self, index_count: u32, instance_count: u32, first_index: u32) {
        self.commands.push(Command::DrawIndexed {
            index_count,
            instance_count,
            first_index,
        });
    }

    pub fn transition_to_shader_read_only(&mut self, texture: TextureHandle) {
        self.commands.push(Command::TransitionToShaderReadOnly(texture));
    }

    pub fn cmd_push_debug_group_label(&mut self, label: impl Into<String>) {
        self.commands.push(Command::PushDebugLabel(label.into()));
    }

    pub fn cmd_pop_debug_group_label(&mut self) {
        self.commands.push(Command::PopDebugLabel);
    }
}

/// Records into a [`CommandBuffer`] while skipping redundant state changes.
pub struct TrackedRenderPass<'a> {
    cmd: &'a mut CommandBuffer,
    current_pipeline: Option<RenderPipelineHandle>,
    current_depth_state: Option<DepthState>,
    current_vertex_buffer: Option<BufferHandle>,
    current_index_buffer: Option<BufferHandle>,
}

impl<'a> TrackedRenderPass<'a> {
    #[must_use]
    pub fn new(cmd: &'a mut CommandBuffer) -> Self {
        Self {
            cmd,
            current_pipeline: None,
            current_depth_state: None,
            current_vertex_buffer: None,
            current_index_buffer: None,
        }
    }

    pub fn set_pipeline(&mut self, pipeline: RenderPipelineHandle) {
        if self.current_pipeline != Some(pipeline) {
            self.cmd.cmd_bind_render_pipeline(pipeline);
            self.current_pipeline = Some(pipeline);
        }
    }

    pub fn set_depth_state(&mut self, state: DepthState) {
        if self.current_depth_state != Some(state) {
            self.cmd.cmd_bind_depth_state(state);
            self.current_depth_state = Some(state);
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.cmd.cmd_bind_viewport(viewport);
    }

    pub fn set_vertex_buffer(&mut self, buffer: BufferHandle) {
        if self.current_vertex_buffer != Some(buffer) {
            self.cmd.cmd_bind_vertex_buffer(0, buffer, 0);
            self.current_vertex_buffer = Some(buffer);
        }
    }

    pub fn set_index_buffer(&mut self, buffer: BufferHandle) {
        if self.current_index_buffer != Some(buffer) {
            self.cmd.cmd_bind_index_buffer(buffer, wgpu::IndexFormat::Uint32);
            self.current_index_buffer = Some(buffer);
        }
    }

    pub fn push_constants<T: Pod>(&mut self, data: &T) {
        self.cmd.cmd_push_constants(data);
    }

    pub fn draw_indexed(&mut self, index_count: u32, first_index: u32) {
        self.cmd.cmd_draw_indexed(index_count, 1, first_index);
    }

    pub fn push_debug_group(&mut self, label: &str) {
        self.cmd.cmd_push_debug_group_label(label);
    }

    pub fn pop_debug_group(&mut self) {
        self.cmd.cmd_pop_debug_group_label();
    }
}
