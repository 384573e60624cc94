use glam::{Mat4, Quat, Vec3};

use crate::core::math;

/// Local TRS of a game object plus its cached local and world matrices.
///
/// The local matrix is either composed from location/rotation/scale, or
/// assigned directly (glTF nodes, physics sync). In the latter case the TRS
/// components are derived from the matrix on demand.
#[derive(Debug, Clone)]
pub struct Transform {
    location: Vec3,
    rotation: Quat,
    scale: Vec3,

    pub(crate) local_matrix: Mat4,
    pub(crate) world_matrix: Mat4,

    // True when `local_matrix` was assigned directly and TRS fields are stale.
    matrix_authored: bool,
}

impl Transform {
    #[must_use]
    pub fn new(location: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let local_matrix = math::compose(scale, rotation, location);
        Self {
            location,
            rotation,
            scale,
            local_matrix,
            world_matrix: local_matrix,
            matrix_authored: false,
        }
    }

    // ========================================================================
    // Local TRS
    // ========================================================================

    /// Local (scale, rotation, location).
    #[must_use]
    pub fn trs(&self) -> (Vec3, Quat, Vec3) {
        if self.matrix_authored {
            math::decompose(&self.local_matrix)
        } else {
            (self.scale, self.rotation, self.location)
        }
    }

    #[must_use]
    pub fn location(&self) -> Vec3 {
        if self.matrix_authored {
            math::decompose_translation(&self.local_matrix)
        } else {
            self.location
        }
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.trs().1
    }

    #[must_use]
    pub fn scale(&self) -> Vec3 {
        if self.matrix_authored {
            math::decompose_scale(&self.local_matrix)
        } else {
            self.scale
        }
    }

    /// Returns `true` when the local matrix changed.
    pub fn set_location(&mut self, location: Vec3) -> bool {
        if !self.matrix_authored && self.location == location {
            return false;
        }
        self.materialize_trs();
        self.location = location;
        self.rebuild_local_matrix();
        true
    }

    /// Returns `true` when the local matrix changed.
    pub fn set_rotation(&mut self, rotation: Quat) -> bool {
        if !self.matrix_authored && self.rotation == rotation {
            return false;
        }
        self.materialize_trs();
        self.rotation = rotation;
        self.rebuild_local_matrix();
        true
    }

    /// Returns `true` when the local matrix changed.
    pub fn set_scale(&mut self, scale: Vec3) -> bool {
        if !self.matrix_authored && self.scale == scale {
            return false;
        }
        self.materialize_trs();
        self.scale = scale;
        self.rebuild_local_matrix();
        true
    }

    /// Stores `matrix` as is. TRS is derived lazily; shear is lost on the next TRS edit.
    pub fn set_local_matrix(&mut self, matrix: Mat4) {
        self.local_matrix = matrix;
        self.matrix_authored = true;
    }

    fn materialize_trs(&mut self) {
        if self.matrix_authored {
            let (scale, rotation, location) = math::decompose(&self.local_matrix);
            self.scale = scale;
            self.rotation = rotation;
            self.location = location;
            self.matrix_authored = false;
        }
    }

    fn rebuild_local_matrix(&mut self) {
        self.local_matrix = math::compose(self.scale, self.rotation, self.location);
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Mat4 {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Recomputes the world matrix from the parent's world matrix.
    pub(crate) fn update_world_matrix(&mut self, parent_world: Option<&Mat4>) {
        self.world_matrix = match parent_world {
            Some(parent) => *parent * self.local_matrix,
            None => self.local_matrix,
        };
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_value_reports_no_change() {
        let mut t = Transform::default();
        assert!(!t.set_location(Vec3::ZERO));
        assert!(t.set_location(Vec3::X));
        assert!(!t.set_location(Vec3::X));
    }

    #[test]
    fn authored_matrix_is_decomposed_on_demand() {
        let mut t = Transform::default();
        let m = math::compose(Vec3::splat(2.0), Quat::from_rotation_y(0.5), Vec3::new(1.0, 2.0, 3.0));
        t.set_local_matrix(m);
        assert_eq!(*t.local_matrix(), m);
        assert!((t.location() - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
        assert!((t.scale() - Vec3::splat(2.0)).length() < 1e-5);

        // Editing one component keeps the other two derived from the matrix.
        assert!(t.set_location(Vec3::ZERO));
        assert!((t.scale() - Vec3::splat(2.0)).length() < 1e-5);
        assert!(t.rotation().angle_between(Quat::from_rotation_y(0.5)) < 1e-4);
    }
}
