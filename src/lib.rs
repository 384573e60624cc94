#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Ember: a small real-time 3D engine.
//!
//! - [`scene`]: game objects, transforms and components in a [`World`]
//! - [`gfx`]: the graphics device seam, GPU allocators and the headless backend
//! - [`resources`]: reference-counted meshes, materials and textures
//! - [`renderer`]: render collection, shadow and forward passes
//! - [`assets`]: glTF import

pub mod app;
pub mod assets;
pub mod core;
pub mod errors;
pub mod gfx;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

pub use app::Input;
pub use assets::{GltfModel, load_gltf, load_gltf_from_slice};
pub use errors::{EmberError, Result};
pub use gfx::{DeviceSettings, GraphicsDevice, HeadlessDevice, RenderDevice};
pub use renderer::{EmbeddedShaderLoader, ForwardRenderer, FrameStats, RendererSettings, ShaderType};
pub use resources::{AlphaMode, Material, MaterialDesc, Mesh, SubMesh, Texture, Vertex};
pub use scene::{
    CameraComponent, Component, ComponentContext, FlyCameraController, GameObjectHandle, Light,
    LightComponent, MeshComponent, OrbitCameraController, World,
};
pub use utils::FpsCounter;
