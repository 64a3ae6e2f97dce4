//! Math utilities and types
//!
//! Provides the f32 math aliases used by the scene graph together with the
//! TRS composition helpers that turn a node's local pose into a matrix and
//! back.
//!
//! ## Conventions
//!
//! - Right-handed, Y-up.
//! - Euler angles are in radians and compose as `R = Rz(z) * Ry(y) * Rx(x)`,
//!   so X is applied first. This is the convention of
//!   [`nalgebra::Rotation3::from_euler_angles`].
//! - Poses compose in `T * R * S` order.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Rotation3,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rotation matrix from Euler angles (radians, X applied first).
pub fn rotation_from_euler(euler: &Vec3) -> Mat4 {
    Rotation3::from_euler_angles(euler.x, euler.y, euler.z).to_homogeneous()
}

/// Compose a `T * R * S` matrix from a position, Euler rotation and scale.
pub fn compose_trs(position: &Vec3, euler: &Vec3, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * rotation_from_euler(euler)
        * Mat4::new_nonuniform_scaling(scale)
}

/// Translation column of an affine matrix.
pub fn translation_of(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
}

/// Basis column `index` (0 = X, 1 = Y, 2 = Z) of an affine matrix.
pub fn basis_column(matrix: &Mat4, index: usize) -> Vec3 {
    Vec3::new(matrix[(0, index)], matrix[(1, index)], matrix[(2, index)])
}

/// Normalize `v`, returning zero for degenerate (zero-length) input.
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
}

/// Invert `matrix` unless its determinant is within `epsilon` of zero.
pub fn try_inverse(matrix: &Mat4, epsilon: f32) -> Option<Mat4> {
    if matrix.determinant().abs() <= epsilon {
        return None;
    }
    matrix.try_inverse()
}

/// Decompose an affine matrix into position, Euler rotation and scale.
///
/// Shear cannot be represented, so a matrix produced by a rotated parent with
/// non-uniform scale decomposes to the closest TRS pose. A negative
/// determinant is folded into the X scale.
pub fn decompose_trs(matrix: &Mat4) -> (Vec3, Vec3, Vec3) {
    let position = translation_of(matrix);

    let x_axis = basis_column(matrix, 0);
    let y_axis = basis_column(matrix, 1);
    let z_axis = basis_column(matrix, 2);

    let mut scale = Vec3::new(x_axis.magnitude(), y_axis.magnitude(), z_axis.magnitude());
    if x_axis.cross(&y_axis).dot(&z_axis) < 0.0 {
        scale.x = -scale.x;
    }

    let safe = |s: f32| if s.abs() > f32::EPSILON { s } else { 1.0 };
    let rotation_matrix = Mat3::from_columns(&[
        x_axis / safe(scale.x),
        y_axis / safe(scale.y),
        z_axis / safe(scale.z),
    ]);
    let (roll, pitch, yaw) = Rotation3::from_matrix(&rotation_matrix).euler_angles();

    (position, Vec3::new(roll, pitch, yaw), scale)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compose_identity() {
        let m = compose_trs(&Vec3::zeros(), &Vec3::zeros(), &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(m, Mat4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_euler_order_applies_x_first() {
        // Rotate +Y by 90deg about X -> +Z, then 90deg about Z leaves +Z unchanged.
        let euler = Vec3::new(constants::HALF_PI, 0.0, constants::HALF_PI);
        let m = rotation_from_euler(&euler);
        let rotated = m.transform_vector(&Vec3::y());
        assert_relative_eq!(rotated, Vec3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_decompose_roundtrip() {
        let position = Vec3::new(1.0, -2.0, 3.5);
        let euler = Vec3::new(0.3, -0.4, 1.1);
        let scale = Vec3::new(2.0, 0.5, 1.5);

        let (p, r, s) = decompose_trs(&compose_trs(&position, &euler, &scale));

        assert_relative_eq!(p, position, epsilon = 1e-5);
        assert_relative_eq!(r, euler, epsilon = 1e-4);
        assert_relative_eq!(s, scale, epsilon = 1e-5);
    }

    #[test]
    fn test_singular_inverse_is_rejected() {
        let degenerate = compose_trs(&Vec3::zeros(), &Vec3::zeros(), &Vec3::new(0.0, 1.0, 1.0));
        assert!(try_inverse(&degenerate, 1e-6).is_none());
        assert!(try_inverse(&Mat4::identity(), 1e-6).is_some());
    }

    #[test]
    fn test_normalize_or_zero() {
        assert_eq!(normalize_or_zero(Vec3::zeros()), Vec3::zeros());
        assert_relative_eq!(normalize_or_zero(Vec3::new(0.0, 3.0, 0.0)), Vec3::y(), epsilon = 1e-6);
    }
}
