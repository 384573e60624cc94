//! Rendering
//!
//! - [`collect`]: per-frame world traversal into render lists and lights
//! - [`RenderList`]: opaque and transparent sort policies
//! - [`passes`]: shadow and forward passes
//! - [`ForwardRenderer`]: the frame driver
//! - [`uniforms`]: binary layouts shared with the shaders

pub mod collect;
pub mod forward_renderer;
pub mod passes;
pub mod render_object;
pub mod settings;
pub mod shader;
pub mod uniforms;

pub use collect::{FrameData, MainLight, collect_frame};
pub use forward_renderer::{ForwardRenderer, FrameStats};
pub use render_object::{RenderList, RenderObject};
pub use settings::{RendererSettings, ShaderType};
pub use shader::{DirectoryShaderLoader, EmbeddedShaderLoader, ShaderLoader};
pub use uniforms::{
    ForwardPushConstants, GlobalUniforms, GpuLight, GpuMaterial, MAX_LIGHTS, ObjectUniforms,
    ShadowPassUniforms, ShadowPushConstants,
};
