//! Handles and resource descriptors understood by every [`GraphicsDevice`](super::GraphicsDevice).
//!
//! Enumerations (formats, usages, compare functions, blend states) reuse the
//! `wgpu` vocabulary so descriptors read the same regardless of backend.

use slotmap::new_key_type;

new_key_type! {
    pub struct BufferHandle;
    pub struct TextureHandle;
    pub struct SamplerHandle;
    pub struct ShaderModuleHandle;
    pub struct RenderPipelineHandle;
}

#[derive(Debug, Clone, Copy)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub usage: wgpu::BufferUsages,
    pub size: u64,
    /// Initial contents; must not exceed `size`.
    pub contents: Option<&'a [u8]>,
}

#[derive(Debug, Clone, Copy)]
pub struct TextureDesc<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    /// Tightly packed texels of mip 0.
    pub data: Option<&'a [u8]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc {
    pub min_filter: wgpu::FilterMode,
    pub mag_filter: wgpu::FilterMode,
    pub address_mode_u: wgpu::AddressMode,
    pub address_mode_v: wgpu::AddressMode,
    /// Depth comparison for shadow sampling.
    pub compare: Option<wgpu::CompareFunction>,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self::LINEAR
    }
}

impl SamplerDesc {
    pub const LINEAR: Self = Self {
        min_filter: wgpu::FilterMode::Linear,
        mag_filter: wgpu::FilterMode::Linear,
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        compare: None,
    };

    pub const SHADOW: Self = Self {
        min_filter: wgpu::FilterMode::Linear,
        mag_filter: wgpu::FilterMode::Linear,
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        compare: Some(wgpu::CompareFunction::LessEqual),
    };
}

#[derive(Debug, Clone, Copy)]
pub struct ShaderModuleDesc<'a> {
    pub label: &'a str,
    pub stage: wgpu::ShaderStages,
    pub source: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: wgpu::VertexFormat,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorTarget {
    pub format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPipelineDesc {
    pub label: String,
    pub vertex_layout: VertexLayout,
    pub vertex_shader: ShaderModuleHandle,
    pub fragment_shader: ShaderModuleHandle,
    pub color: Option<ColorTarget>,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub cull_mode: Option<wgpu::Face>,
    pub front_face: wgpu::FrontFace,
    /// Bytes of push constants the pipeline accepts.
    pub push_constant_size: u32,
}
