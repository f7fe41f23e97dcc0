//! A perspective camera with double-precision state.
//!
//! Position and orientation are kept in `f64` so view matrices stay stable
//! far from the origin; results are truncated to `f32` only at the matrix
//! boundary, which is what the GPU consumes.

use glam::{DMat4, DQuat, DVec3, Mat4};

/// A movable perspective camera.
///
/// Both matrix accessors are pure functions of the current fields and are
/// recomputed on every call. There is no cached state to invalidate.
#[derive(Clone, Copy, Debug)]
pub struct PerspectiveCamera {
    /// World-space position.
    pub position: DVec3,
    /// Orientation as a unit quaternion. Identity looks down -Z.
    pub orientation: DQuat,
    /// Vertical field of view in radians.
    pub fov_y: f64,
    /// Near clip plane distance.
    pub near: f64,
    /// Far clip plane distance.
    pub far: f64,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            fov_y: 60f64.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the camera position.
    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = DVec3::new(x, y, z);
        self
    }

    /// Orients the camera to face a target point.
    pub fn looking_at(mut self, target: DVec3) -> Self {
        let forward = (target - self.position).normalize_or_zero();
        if forward != DVec3::ZERO {
            self.orientation = DQuat::from_rotation_arc(DVec3::NEG_Z, forward);
        }
        self
    }

    /// Sets the vertical field of view in degrees.
    pub fn with_fov_degrees(mut self, fov_degrees: f64) -> Self {
        self.fov_y = fov_degrees.to_radians();
        self
    }

    /// The camera's rigid world transform: rotation then translation, no scale.
    pub fn transform(&self) -> Mat4 {
        DMat4::from_rotation_translation(self.orientation, self.position).as_mat4()
    }

    /// The world-to-camera matrix.
    ///
    /// Inverted in closed form: a rotation+translation is always invertible,
    /// so there is no failure path here.
    pub fn view_matrix(&self) -> Mat4 {
        let inv_rotation = self.orientation.inverse();
        let inv_translation = inv_rotation * -self.position;
        DMat4::from_rotation_translation(inv_rotation, inv_translation).as_mat4()
    }

    /// A right-handed perspective projection for the given aspect ratio
    /// (width / height).
    pub fn projection_matrix(&self, aspect_ratio: f64) -> Mat4 {
        DMat4::perspective_rh(self.fov_y, aspect_ratio, self.near, self.far).as_mat4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_identity(m: Mat4) {
        let i = Mat4::IDENTITY;
        for col in 0..4 {
            for row in 0..4 {
                assert_relative_eq!(m.col(col)[row], i.col(col)[row], epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn view_matrix_inverts_transform() {
        let camera = PerspectiveCamera {
            position: DVec3::new(3.0, -2.0, 7.5),
            orientation: DQuat::from_rotation_y(0.8) * DQuat::from_rotation_x(-0.4),
            ..Default::default()
        };
        assert_identity(camera.view_matrix() * camera.transform());
    }

    #[test]
    fn view_matrix_of_default_camera_is_identity() {
        assert_identity(PerspectiveCamera::default().view_matrix());
    }

    #[test]
    fn looking_at_faces_the_target() {
        let camera = PerspectiveCamera::new()
            .at(0.0, 0.0, 3.0)
            .looking_at(DVec3::ZERO);
        let forward = camera.orientation * DVec3::NEG_Z;
        assert_relative_eq!(forward.z, -1.0, epsilon = 1e-9);
        assert_relative_eq!(forward.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn projection_is_right_handed() {
        let camera = PerspectiveCamera::default();
        let proj = camera.projection_matrix(16.0 / 9.0);
        // A point in front of a RH camera (negative view-space Z) lands at
        // positive clip-space W.
        let clip = proj * glam::Vec4::new(0.0, 0.0, -1.0, 1.0);
        assert!(clip.w > 0.0);
    }
}
