//! Built-in components.

pub mod camera;
pub mod camera_controller;
pub mod light;
pub mod mesh;

pub use camera::CameraComponent;
pub use camera_controller::{FlyCameraController, OrbitCameraController};
pub use light::{DirectionalLight, Light, LightComponent, LightKind, PointLight, SpotLight};
pub use mesh::MeshComponent;
