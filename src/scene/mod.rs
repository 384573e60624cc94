//! Scene graph
//!
//! - [`World`]: owns game objects and mutates the hierarchy
//! - [`GameObject`]: hierarchy links, components and transform of one node
//! - [`Transform`]: local TRS with cached local/world matrices
//! - [`Component`]: behaviour attachments with lifecycle hooks
//! - `transform_system`: the eager world-matrix cascade

pub mod component;
pub mod components;
pub mod game_object;
pub mod transform;
pub mod transform_system;
pub mod world;

pub use component::{Component, ComponentContext};
pub use components::{
    CameraComponent, FlyCameraController, Light, LightComponent, LightKind, MeshComponent,
    OrbitCameraController,
};
pub use game_object::GameObject;
pub use transform::Transform;
pub use world::World;

use slotmap::new_key_type;

new_key_type! {
    /// Weak, generation-checked reference to a [`GameObject`].
    pub struct GameObjectHandle;
}
