//! Renderer Settings
//!
//! Configuration handed to [`ForwardRenderer::new`](super::ForwardRenderer::new).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ember::renderer::{RendererSettings, ShaderType};
//!
//! let settings = RendererSettings {
//!     width: 1920,
//!     height: 1080,
//!     shader_type: ShaderType::Unlit,
//!     ..Default::default()
//! };
//! ```

use glam::Vec3;

/// Shading model for the forward pass.
///
/// The choice applies to the whole frame; each variant owns an opaque and a
/// transparent pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderType {
    /// Base color only.
    Unlit,
    /// Lambert diffuse from the light list plus directional shadows.
    #[default]
    SimpleLit,
}

#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub width: u32,
    pub height: u32,

    /// Bytes per page of the per-frame ring (global uniforms and object matrices).
    pub temp_buffer_size: u64,
    /// Ring pages; a page is reused after this many frames.
    pub frames_in_flight: u32,
    /// Edge length of the square shadow map.
    pub shadow_map_size: u32,

    pub shader_type: ShaderType,
    pub clear_color: wgpu::Color,
    pub ambient_light: Vec3,

    pub depth_format: wgpu::TextureFormat,
    pub shadow_map_format: wgpu::TextureFormat,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            temp_buffer_size: 1024 * 1024,
            frames_in_flight: 3,
            shadow_map_size: 4096,
            shader_type: ShaderType::SimpleLit,
            clear_color: wgpu::Color::BLACK,
            ambient_light: Vec3::splat(0.05),
            depth_format: wgpu::TextureFormat::Depth32Float,
            shadow_map_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}

impl RendererSettings {
    #[inline]
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
