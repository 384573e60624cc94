//! Asset import
//!
//! - [`load_gltf`] / [`load_gltf_from_slice`]: glTF 2.0 scenes into a
//!   [`World`](crate::scene::World) plus shared resources

pub mod gltf_loader;

pub use gltf_loader::{GltfModel, load_gltf, load_gltf_from_slice};
