//! GPU-backed resources shared by reference count
//!
//! - [`Texture`] / [`Sampler`]: bindless-indexed device objects
//! - [`Material`]: surface parameters plus their uniform block
//! - [`Mesh`]: vertex/index buffers split into material sub-meshes

pub mod material;
pub mod mesh;
pub mod texture;

pub use material::{AlphaMode, Material, MaterialDesc};
pub use mesh::{Mesh, SubMesh, Vertex};
pub use texture::{Sampler, Texture};
