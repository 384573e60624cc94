use glam::{Mat4, Vec3};

use crate::core::math;
use crate::renderer::uniforms::GpuLight;
use crate::scene::component::Component;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub shadow_near: f32,
    pub shadow_far: f32,
    /// Half-size of the orthographic shadow volume
    pub shadow_extent: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            shadow_near: 0.1,
            shadow_far: 100.0,
            shadow_extent: 25.0,
        }
    }
}

impl DirectionalLight {
    /// `ortho(near, far) * inverse(light_world)`.
    #[must_use]
    pub fn view_projection(&self, light_world: &Mat4) -> Mat4 {
        let e = self.shadow_extent;
        let projection = Mat4::orthographic_lh(-e, e, -e, e, self.shadow_near, self.shadow_far);
        projection * light_world.inverse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointLight {
    pub range: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpotLight {
    pub range: f32,
    pub inner_cone_angle: f32,
    pub outer_cone_angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl LightKind {
    /// Type code shared with the shaders.
    #[must_use]
    pub fn gpu_type(&self) -> u32 {
        match self {
            LightKind::Directional(_) => GpuLight::DIRECTIONAL,
            LightKind::Point(_) => GpuLight::POINT,
            LightKind::Spot(_) => GpuLight::SPOT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional(DirectionalLight::default()),
        }
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point(PointLight { range }),
        }
    }

    #[must_use]
    pub fn new_spot(color: Vec3, intensity: f32, range: f32, inner_cone_angle: f32, outer_cone_angle: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Spot(SpotLight {
                range,
                inner_cone_angle,
                outer_cone_angle,
            }),
        }
    }

    /// GPU record for a light placed by `world`.
    ///
    /// Position is the translation column, direction is the world forward axis.
    #[must_use]
    pub fn to_gpu(&self, world: &Mat4) -> GpuLight {
        let (range, inner_cone_angle, outer_cone_angle) = match self.kind {
            LightKind::Directional(_) => (0.0, 0.0, 0.0),
            LightKind::Point(point) => (point.range, 0.0, 0.0),
            LightKind::Spot(spot) => (spot.range, spot.inner_cone_angle, spot.outer_cone_angle),
        };
        let direction = (math::decompose_rotation(world) * math::FORWARD).normalize_or_zero();
        GpuLight {
            position: math::decompose_translation(world),
            light_type: self.kind.gpu_type(),
            color: self.color,
            intensity: self.intensity,
            direction,
            range,
            inner_cone_angle,
            outer_cone_angle,
            _pad: [0.0; 2],
        }
    }
}

/// Attaches a [`Light`] to a game object.
#[derive(Debug, Clone)]
pub struct LightComponent {
    pub light: Light,
}

impl LightComponent {
    #[must_use]
    pub fn new(light: Light) -> Self {
        Self { light }
    }
}

impl Component for LightComponent {}
