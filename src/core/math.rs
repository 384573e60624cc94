//! Transform math shared by the scene graph, the renderer and the importer.
//!
//! The engine is left-handed: `+Z` is forward, `+X` right, `+Y` up.

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::errors::{EmberError, Result};

pub const FORWARD: Vec3 = Vec3::Z;
pub const RIGHT: Vec3 = Vec3::X;
pub const UP: Vec3 = Vec3::Y;

/// Builds `T * R * S`.
#[inline]
#[must_use]
pub fn compose(scale: Vec3, rotation: Quat, translation: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Component-wise reciprocal where zero stays zero.
#[inline]
#[must_use]
pub fn reciprocal(v: Vec3) -> Vec3 {
    let r = |x: f32| if x == 0.0 { 0.0 } else { 1.0 / x };
    Vec3::new(r(v.x), r(v.y), r(v.z))
}

/// Extracts scale (column lengths), rotation and translation.
///
/// Assumes no shear. Zero-length columns yield zero scale on that axis and,
/// when any column collapses, an identity rotation.
#[must_use]
pub fn decompose(m: &Mat4) -> (Vec3, Quat, Vec3) {
    let scale = decompose_scale(m);
    let translation = m.w_axis.truncate();
    if scale.x == 0.0 || scale.y == 0.0 || scale.z == 0.0 {
        return (scale, Quat::IDENTITY, translation);
    }
    (scale, rotation_from_scaled(m, scale), translation)
}

/// Like [`decompose`], but rejects zero-length columns.
pub fn try_decompose(m: &Mat4) -> Result<(Vec3, Quat, Vec3)> {
    let scale = decompose_scale(m);
    for (column, s) in scale.to_array().into_iter().enumerate() {
        if s <= f32::EPSILON || !s.is_finite() {
            return Err(EmberError::DegenerateMatrix { column });
        }
    }
    Ok((scale, rotation_from_scaled(m, scale), m.w_axis.truncate()))
}

#[inline]
#[must_use]
pub fn decompose_translation(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}

#[inline]
#[must_use]
pub fn decompose_scale(m: &Mat4) -> Vec3 {
    Vec3::new(
        m.x_axis.truncate().length(),
        m.y_axis.truncate().length(),
        m.z_axis.truncate().length(),
    )
}

#[must_use]
pub fn decompose_rotation(m: &Mat4) -> Quat {
    decompose(m).1
}

fn rotation_from_scaled(m: &Mat4, scale: Vec3) -> Quat {
    let basis = Mat3::from_cols(
        m.x_axis.truncate() / scale.x,
        m.y_axis.truncate() / scale.y,
        m.z_axis.truncate() / scale.z,
    );
    Quat::from_mat3(&basis).normalize()
}

/// Axis-aligned bounds with a bounding sphere around the same origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub origin: Vec3,
    pub extents: Vec3,
    pub sphere_radius: f32,
}

impl Bounds {
    #[must_use]
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        let origin = (min + max) * 0.5;
        let extents = (max - min) * 0.5;
        Self {
            origin,
            extents,
            sphere_radius: extents.length(),
        }
    }

    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.origin - self.extents
    }

    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.origin + self.extents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reciprocal_keeps_zero() {
        assert_eq!(reciprocal(Vec3::new(2.0, 0.0, -4.0)), Vec3::new(0.5, 0.0, -0.25));
    }

    #[test]
    fn try_decompose_rejects_zero_column() {
        let m = compose(Vec3::new(1.0, 0.0, 1.0), Quat::IDENTITY, Vec3::ZERO);
        assert!(matches!(
            try_decompose(&m),
            Err(EmberError::DegenerateMatrix { column: 1 })
        ));
        let (scale, rotation, _) = decompose(&m);
        assert_eq!(scale.y, 0.0);
        assert_eq!(rotation, Quat::IDENTITY);
    }

    #[test]
    fn bounds_from_min_max() {
        let b = Bounds::from_min_max(Vec3::splat(-1.0), Vec3::new(1.0, 3.0, 1.0));
        assert_eq!(b.origin, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(b.extents, Vec3::new(1.0, 2.0, 1.0));
        assert!((b.sphere_radius - 6.0f32.sqrt()).abs() < 1e-6);
    }
}
