//! Graphics device layer
//!
//! - [`GraphicsDevice`]: the verbs the engine needs from a backend
//! - [`HeadlessDevice`]: CPU backend that validates and records submissions
//! - [`CommandBuffer`] / [`TrackedRenderPass`]: command recording
//! - [`BufferPool`] / [`BufferRing`]: persistent and per-frame GPU memory
//! - [`RenderDevice`]: the device context passed to resource owners

pub mod buffer_pool;
pub mod buffer_ring;
pub mod command;
pub mod device;
pub mod headless;
pub mod offset_allocator;
pub mod release;
pub mod render_device;
pub mod storage_buffer;
pub mod types;

pub use buffer_pool::{BufferPool, BufferSlice};
pub use buffer_ring::BufferRing;
pub use command::{
    ColorAttachment, Command, CommandBuffer, DepthAttachment, DepthState, LoadOp, RenderPass,
    TrackedRenderPass, Viewport,
};
pub use device::GraphicsDevice;
pub use headless::{HeadlessDevice, Submission, TextureInfo};
pub use offset_allocator::{Allocation, OffsetAllocator};
pub use release::{GpuObject, ReleaseQueue};
pub use render_device::{DeviceSettings, RenderDevice};
pub use storage_buffer::StorageBuffer;
pub use types::{
    BufferDesc, BufferHandle, ColorTarget, RenderPipelineDesc, RenderPipelineHandle, SamplerDesc,
    SamplerHandle, ShaderModuleDesc, ShaderModuleHandle, TextureDesc, TextureHandle, VertexAttribute,
    VertexLayout,
};
