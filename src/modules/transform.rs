use glam::{Mat3, Mat4, Vec3};

/// Fixed distance the model sits from the camera along -Z.
const CAMERA_DISTANCE: f32 = 4.0;

/// Right-handed perspective projection in wgpu clip space (z in [0, 1]).
pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_degrees.to_radians(), aspect, near, far)
}

/// Yaw about Y composed with pitch about X, with the camera offset baked in.
pub fn rotation_yx(pitch_degrees: f32, yaw_degrees: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -CAMERA_DISTANCE))
        * Mat4::from_rotation_x(pitch_degrees.to_radians())
        * Mat4::from_rotation_y(yaw_degrees.to_radians())
}

/// Uniform scale.
pub fn scale(factor: f32) -> Mat4 {
    Mat4::from_scale(Vec3::splat(factor))
}

/// Upper-left 3x3 of the model matrix. Exact while the model transform stays
/// rotation plus uniform scale; revisit if non-uniform scale ever appears.
pub fn normal_matrix(model: Mat4) -> Mat3 {
    Mat3::from_mat4(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_law() {
        let m = rotation_yx(-15.0, 30.0);
        assert!((Mat4::IDENTITY * m).abs_diff_eq(m, 1e-6));
        assert!((m * Mat4::IDENTITY).abs_diff_eq(m, 1e-6));
    }

    #[test]
    fn perspective_is_finite_and_symmetric_at_square_aspect() {
        let p = perspective(35.0, 1.0, 0.1, 100.0);
        assert!(p.to_cols_array().iter().all(|v| v.is_finite()));
        assert!((p.x_axis.x - p.y_axis.y).abs() < 1e-6);
    }

    #[test]
    fn rotation_bakes_camera_offset() {
        let m = rotation_yx(20.0, 135.0);
        assert!((m.w_axis.x).abs() < 1e-6);
        assert!((m.w_axis.y).abs() < 1e-6);
        assert!((m.w_axis.z + 4.0).abs() < 1e-6);
        assert!((m.w_axis.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn scale_is_uniform() {
        let s = scale(1.6);
        assert!((s.x_axis.x - 1.6).abs() < 1e-6);
        assert!((s.y_axis.y - 1.6).abs() < 1e-6);
        assert!((s.z_axis.z - 1.6).abs() < 1e-6);
        assert!((s.w_axis.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normal_matrix_of_rigid_model_is_orthonormal() {
        let n = normal_matrix(rotation_yx(-15.0, 30.0));
        assert!((n.determinant() - 1.0).abs() < 1e-5);
        assert!((n * n.transpose()).abs_diff_eq(Mat3::IDENTITY, 1e-5));
    }
}
