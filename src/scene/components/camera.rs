use glam::Mat4;

use crate::scene::component::Component;

/// Perspective camera. The view is the inverse of the owner's world matrix.
#[derive(Debug, Clone)]
pub struct CameraComponent {
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            fov: std::f32::consts::FRAC_PI_2,
            aspect_ratio: 1.0,
            near: 0.1,
            far: 512.0,
        }
    }
}

impl CameraComponent {
    #[must_use]
    pub fn new(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Left-handed perspective projection with a `[0, 1]` depth range.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    #[must_use]
    pub fn view_matrix(&self, owner_world: &Mat4) -> Mat4 {
        owner_world.inverse()
    }
}

impl Component for CameraComponent {}
