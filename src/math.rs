//! Matrix helpers for transform and normal math.
//!
//! The one non-obvious piece here is [`normal_matrix`]: transforming surface
//! normals by the model matrix itself is wrong under non-uniform scale. The
//! correct transform is the inverse-transpose of the upper-left 3×3 block,
//! which we compute without an explicit inverse via the adjugate (the
//! transpose of the cofactor matrix). The adjugate differs from the true
//! inverse-transpose only by a scalar factor of `det`, which washes out when
//! the shader normalizes.

use glam::{Mat3, Mat4};

/// Extracts the upper-left 3×3 block of a 4×4 matrix.
pub fn upper_left_3x3(m: Mat4) -> Mat3 {
    Mat3::from_mat4(m)
}

/// Computes the adjugate of a 3×3 matrix.
///
/// The rows of the adjugate are the cross products of the input's column
/// pairs, so no division (and no invertibility requirement) is involved.
pub fn adjugate(m: Mat3) -> Mat3 {
    // Rows of adj(M) are c1×c2, c2×c0, c0×c1.
    Mat3::from_cols(
        m.y_axis.cross(m.z_axis),
        m.z_axis.cross(m.x_axis),
        m.x_axis.cross(m.y_axis),
    )
    .transpose()
}

/// Derives the normal matrix for a world transform.
///
/// Equivalent to `transpose(inverse(upper3x3(m)))` up to a scalar factor,
/// but stays finite for any input and never divides by the determinant.
pub fn normal_matrix(m: Mat4) -> Mat3 {
    adjugate(upper_left_3x3(m)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Quat, Vec3};

    fn assert_parallel(a: Vec3, b: Vec3) {
        let a = a.normalize();
        let b = b.normalize();
        assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn adjugate_times_matrix_is_det_times_identity() {
        let m = Mat3::from_cols(
            Vec3::new(2.0, 1.0, 0.5),
            Vec3::new(-1.0, 3.0, 0.0),
            Vec3::new(0.0, 0.25, 4.0),
        );
        let product = adjugate(m) * m;
        let det = m.determinant();
        let expected = Mat3::from_diagonal(Vec3::splat(det));
        for col in 0..3 {
            assert_relative_eq!(
                product.col(col).x,
                expected.col(col).x,
                epsilon = 1e-4
            );
            assert_relative_eq!(
                product.col(col).y,
                expected.col(col).y,
                epsilon = 1e-4
            );
            assert_relative_eq!(
                product.col(col).z,
                expected.col(col).z,
                epsilon = 1e-4
            );
        }
    }

    #[test]
    fn normal_matrix_matches_inverse_transpose_under_nonuniform_scale() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 0.5, 3.0),
            Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3),
            Vec3::new(5.0, -1.0, 2.0),
        );
        let reference = upper_left_3x3(m).inverse().transpose();
        let derived = normal_matrix(m);

        // Same direction for every transformed normal; magnitudes differ by det.
        for n in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(1.0, 2.0, -0.5)] {
            assert_parallel(derived * n, reference * n);
        }
    }

    #[test]
    fn normal_matrix_preserves_normals_under_rotation_and_uniform_scale() {
        let rotation = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 1.2);
        let m = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.5),
            rotation,
            Vec3::new(0.0, 3.0, 0.0),
        );
        let n = Vec3::new(0.0, 1.0, 0.0);
        // For rotation + uniform scale the normal transforms like a direction.
        assert_parallel(normal_matrix(m) * n, rotation * n);
    }
}
